use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::associated_token::{self, get_associated_token_address_with_program_id};
use anchor_spl::{token, token_2022};
use eco_svm_std::Bytes32;

use crate::events::RewardTransferFailed;
use crate::instructions::PortalError;
use crate::token::TokenTransfer;
use crate::types::{Reward, TokenTransferAccounts, VecTokenTransferAccounts};

/// Token legs `[vault ata, recipient ata, mint]` of every reward token, each mint once.
pub fn reward_token_accounts<'info>(
    vault: &Pubkey,
    accounts: &[AccountInfo<'info>],
    reward_token_amounts: &BTreeMap<Pubkey, u64>,
) -> Result<Vec<TokenTransferAccounts<'info>>> {
    let accounts = VecTokenTransferAccounts::try_from(accounts)?.into_inner();
    let mints = accounts
        .iter()
        .map(|accounts| accounts.mint.key())
        .collect::<BTreeSet<_>>();

    require!(
        mints.len() == accounts.len() && mints.iter().eq(reward_token_amounts.keys()),
        PortalError::InvalidMint
    );
    accounts.iter().try_for_each(|accounts| {
        let vault_ata = get_associated_token_address_with_program_id(
            vault,
            accounts.mint.key,
            accounts.token_program_id(),
        );
        require_keys_eq!(accounts.from.key(), vault_ata, PortalError::InvalidAta);

        Ok(())
    })?;

    Ok(accounts)
}

/// Whether the vault's observed balances cover the whole reward.
pub fn is_intent_funded(
    vault: &AccountInfo<'_>,
    reward: &Reward,
    accounts: &[TokenTransferAccounts<'_>],
) -> Result<bool> {
    if vault.lamports() < reward.native_amount {
        return Ok(false);
    }

    let reward_token_amounts = reward.token_amounts()?;
    accounts.iter().try_fold(true, |funded, accounts| {
        let balance = accounts.from_balance()?;

        Ok(funded
            && reward_token_amounts
                .get(accounts.mint.key)
                .is_some_and(|amount| balance >= *amount))
    })
}

/// Empties a vault into `recipient`.
pub struct Payout<'a, 'info> {
    pub payer: AccountInfo<'info>,
    pub vault: AccountInfo<'info>,
    pub recipient: AccountInfo<'info>,
    pub token_program: &'a Program<'info, token::Token>,
    pub token_2022_program: &'a Program<'info, token_2022::Token2022>,
    pub associated_token_program: &'a Program<'info, associated_token::AssociatedToken>,
    pub system_program: &'a Program<'info, System>,
}

impl<'info> Payout<'_, 'info> {
    pub fn native(&self, vault_seeds: &[&[u8]]) -> Result<()> {
        match self.vault.lamports() {
            0 => Ok(()),
            amount => system_program::transfer(
                CpiContext::new_with_signer(
                    self.system_program.to_account_info(),
                    system_program::Transfer {
                        from: self.vault.to_account_info(),
                        to: self.recipient.to_account_info(),
                    },
                    &[vault_seeds],
                ),
                amount,
            ),
        }
    }

    /// Moves every token balance on its own. A token that refuses the transfer keeps its
    /// balance in the vault and is reported with [`RewardTransferFailed`].
    pub fn tokens(
        &self,
        intent_hash: &Bytes32,
        accounts: Vec<TokenTransferAccounts<'info>>,
        vault_seeds: &[&[u8]],
    ) -> Result<()> {
        accounts
            .into_iter()
            .try_for_each(|accounts| self.token(intent_hash, accounts, vault_seeds))
    }

    fn token(
        &self,
        intent_hash: &Bytes32,
        accounts: TokenTransferAccounts<'info>,
        vault_seeds: &[&[u8]],
    ) -> Result<()> {
        if accounts.from_balance()? == 0 {
            return Ok(());
        }

        let token_program = accounts.token_program(self.token_program, self.token_2022_program)?;
        accounts.init_to_ata(
            &self.payer,
            &self.recipient,
            &token_program,
            self.associated_token_program,
            self.system_program,
        )?;

        if let Err(reason) =
            accounts.transfer_all(&token_program, &self.vault, &[vault_seeds], self.recipient.key)?
        {
            emit!(RewardTransferFailed::new(
                *intent_hash,
                accounts.mint.key(),
                self.recipient.key(),
                reason,
            ));
        }

        Ok(())
    }
}
