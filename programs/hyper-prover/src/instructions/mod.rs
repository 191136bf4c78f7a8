use anchor_lang::prelude::*;

mod challenge;
mod handle;
mod handle_account_metas;
mod init;
mod ism;
mod ism_account_metas;
mod proof_type;
mod prove;

pub use challenge::*;
pub use handle::*;
pub use handle_account_metas::*;
pub use init::*;
pub use ism::*;
pub use ism_account_metas::*;
pub use proof_type::*;
pub use prove::*;

#[error_code(offset = 6200)]
pub enum HyperProverError {
    InvalidPortalDispatcher,
    InvalidDispatcher,
    InvalidData,
    InvalidMailbox,
    InvalidChainId,
    InvalidProcessAuthority,
    InvalidConfig,
    ConfigAlreadyInitialized,
    TooManyWhitelistedSenders,
    InvalidSender,
    InvalidOrigin,
    InvalidPdaPayer,
    InvalidProofAccounts,
    InvalidMailboxResponse,
}
