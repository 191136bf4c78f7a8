use anchor_lang::prelude::*;
use anchor_spl::token;
use anchor_spl::token_2022::spl_token_2022::extension::{
    transfer_hook, BaseStateWithExtensions, ExtensionType, StateWithExtensions,
};
use anchor_spl::token_2022::spl_token_2022::state::{Account, Mint};
use anchor_spl::token_2022;

use crate::types::TokenTransferAccounts;

/// Why a token would refuse to leave the vault.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferError {
    UnknownTokenProgram,
    InvalidMint,
    InvalidSource,
    UninitializedDestination,
    DestinationMismatch,
    Frozen,
    NonTransferable,
    TransferHook,
}

pub type TransferResult = std::result::Result<u64, TransferError>;

/// Outgoing transfer of a whole token balance whose failure is a value, not an abort.
///
/// A failed token CPI aborts the whole transaction, so [`TokenTransfer::check_transfer`]
/// establishes up front that the token program will accept the transfer, and
/// [`TokenTransfer::transfer_all`] only invokes the token program once it does.
pub trait TokenTransfer<'info> {
    /// Balance that a transfer to an account owned by `recipient` would move.
    fn check_transfer(&self, recipient: &Pubkey) -> TransferResult;

    /// Moves the whole balance, signed by `authority`, or reports why it cannot.
    /// `Err` is reserved for failures of the token program after a passing check.
    fn transfer_all(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        recipient: &Pubkey,
    ) -> Result<TransferResult>;
}

impl<'info> TokenTransfer<'info> for TokenTransferAccounts<'info> {
    fn check_transfer(&self, recipient: &Pubkey) -> TransferResult {
        let token_program_id = *self.token_program_id();
        if token_program_id != token::ID && token_program_id != token_2022::ID {
            return Err(TransferError::UnknownTokenProgram);
        }

        let mint_data = self
            .mint
            .try_borrow_data()
            .map_err(|_| TransferError::InvalidMint)?;
        let mint = StateWithExtensions::<Mint>::unpack(&mint_data)
            .map_err(|_| TransferError::InvalidMint)?;
        let extensions = mint
            .get_extension_types()
            .map_err(|_| TransferError::InvalidMint)?;

        if extensions.contains(&ExtensionType::NonTransferable) {
            return Err(TransferError::NonTransferable);
        }
        if transfer_hook::get_program_id(&mint).is_some() {
            return Err(TransferError::TransferHook);
        }

        let from_data = self
            .from
            .try_borrow_data()
            .map_err(|_| TransferError::InvalidSource)?;
        let from = StateWithExtensions::<Account>::unpack(&from_data)
            .map_err(|_| TransferError::InvalidSource)?
            .base;
        if from.mint != self.mint.key() {
            return Err(TransferError::InvalidSource);
        }

        if self.to.data_is_empty() {
            return Err(TransferError::UninitializedDestination);
        }
        let to_data = self
            .to
            .try_borrow_data()
            .map_err(|_| TransferError::UninitializedDestination)?;
        let to = StateWithExtensions::<Account>::unpack(&to_data)
            .map_err(|_| TransferError::UninitializedDestination)?
            .base;
        if to.mint != self.mint.key() || to.owner != *recipient {
            return Err(TransferError::DestinationMismatch);
        }

        if from.is_frozen() || to.is_frozen() {
            return Err(TransferError::Frozen);
        }

        Ok(from.amount)
    }

    fn transfer_all(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        recipient: &Pubkey,
    ) -> Result<TransferResult> {
        match self.check_transfer(recipient) {
            Ok(amount) => self
                .transfer_with_signer(token_program, authority, signer_seeds, amount)
                .map(|_| Ok(amount)),
            Err(err) => Ok(Err(err)),
        }
    }
}
