use anchor_lang::prelude::*;

mod challenge;
mod init;
mod post_state_root;
mod proof_type;
mod prove;
mod prove_storage;

pub use challenge::*;
pub use init::*;
pub use post_state_root::*;
pub use proof_type::*;
pub use prove::*;
pub use prove_storage::*;

#[error_code(offset = 6300)]
pub enum StorageProverError {
    InvalidPortalDispatcher,
    InvalidConfig,
    ConfigAlreadyInitialized,
    InvalidRootOracle,
    InvalidStateRoot,
    StateRootAlreadyPosted,
    UnknownStateRoot,
    InvalidStorageProof,
    InvalidClaimant,
}
