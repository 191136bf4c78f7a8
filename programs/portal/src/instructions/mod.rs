use anchor_lang::prelude::*;

pub mod fulfill;
pub mod fund;
pub mod fund_context;
pub mod payout;
pub mod prove;
pub mod publish;
pub mod recover_token;
pub mod refund;
pub mod withdraw;

pub use fulfill::*;
pub use fund::*;
pub use prove::*;
pub use publish::*;
pub use recover_token::*;
pub use refund::*;
pub use withdraw::*;

#[error_code]
pub enum PortalError {
    InvalidSourceChain,
    InvalidIntentCreator,
    InvalidProver,
    TokenAmountOverflow,
    InsufficientFunds,
    IntentAlreadyFunded,
    IntentNotFunded,
    IntentAlreadyWithdrawn,
    IntentAlreadyRefunded,
    IntentNotProven,
    InvalidProofDestination,
    IntentAlreadyProven,
    RewardNotExpired,
    InvalidRecoverToken,
    ZeroRecoverTokenBalance,
    RecoverTokenRejected,
    InvalidPortal,
    InvalidClaimant,
    InvalidIntentHash,
    IntentExpired,
    IntentAlreadyFulfilled,
    IntentNotFulfilled,
    CallToProver,
    CallToAccountWithoutCode,
    InvalidCallValue,
    EmptyBatch,
    InvalidVault,
    InvalidVaultState,
    InvalidAta,
    InvalidMint,
    InvalidTokenProgram,
    InvalidTokenTransferAccounts,
    InvalidCalldata,
    InvalidExecutor,
    InvalidDispatcher,
    InvalidFulfillMarker,
    InvalidFulfillTarget,
    InvalidProof,
    InvalidCreator,
    InvalidFunderToken,
}

/// Current unix time; clocks before the epoch count as zero.
pub(crate) fn now() -> Result<u64> {
    Ok(u64::try_from(Clock::get()?.unix_timestamp).unwrap_or_default())
}
