use anchor_lang::prelude::*;

mod challenge;
mod escrow;
mod flash_fulfill;
mod proof_type;
mod prove;

pub use challenge::*;
pub use escrow::*;
pub use flash_fulfill::*;
pub use proof_type::*;
pub use prove::*;

#[error_code(offset = 6100)]
pub enum LocalProverError {
    InvalidPortalDispatcher,
    InvalidSourceChain,
    InvalidProofAccounts,
    InvalidDestination,
    InvalidProver,
    InvalidClaimant,
    IntentAlreadyProven,
    InvalidFlashVault,
    InvalidTokenTransferAccounts,
    InvalidEscrow,
    InvalidEscrowState,
    TooManyEscrowTokens,
    InvalidSecondaryProver,
    InvalidSecondaryProof,
    EscrowAlreadyResolved,
    SecondaryIntentNotProven,
    SecondaryIntentNotExpired,
    SecondaryIntentProven,
    InvalidVault,
}

pub(crate) fn now() -> Result<u64> {
    Ok(u64::try_from(Clock::get()?.unix_timestamp).unwrap_or_default())
}
