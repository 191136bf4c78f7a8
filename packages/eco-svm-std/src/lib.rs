use anchor_lang::prelude::*;
use derive_more::Deref;
use tiny_keccak::{Hasher, Keccak};

pub mod account;
pub mod merkle;
pub mod prover;

pub use prover::{is_prover, Proof};

#[cfg(feature = "mainnet")]
pub const CHAIN_ID: u64 = 1399811149;
#[cfg(not(feature = "mainnet"))]
pub const CHAIN_ID: u64 = 1399811150;

pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

#[derive(
    AnchorSerialize,
    AnchorDeserialize,
    InitSpace,
    Deref,
    Clone,
    Copy,
    Default,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub struct Bytes32([u8; 32]);

impl Bytes32 {
    pub const ZERO: Self = Bytes32([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }
}

impl From<Bytes32> for [u8; 32] {
    fn from(bytes: Bytes32) -> Self {
        bytes.0
    }
}

impl From<Pubkey> for Bytes32 {
    fn from(pubkey: Pubkey) -> Self {
        Bytes32(pubkey.to_bytes())
    }
}

impl From<Bytes32> for Pubkey {
    fn from(bytes: Bytes32) -> Self {
        Pubkey::new_from_array(bytes.0)
    }
}

impl PartialEq<Pubkey> for Bytes32 {
    fn eq(&self, pubkey: &Pubkey) -> bool {
        self.0 == pubkey.to_bytes()
    }
}

impl IntoIterator for Bytes32 {
    type Item = u8;
    type IntoIter = std::array::IntoIter<u8, 32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Keccak-256 over the concatenation of `chunks`.
pub fn keccak<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Bytes32 {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];

    chunks.into_iter().for_each(|chunk| hasher.update(chunk));
    hasher.finalize(&mut hash);

    hash.into()
}

/// Canonical intent identifier, the join key between the source chain vault and the
/// destination chain fulfillment.
pub fn intent_hash(destination: u64, route_hash: &Bytes32, reward_hash: &Bytes32) -> Bytes32 {
    keccak([
        destination.to_be_bytes().as_slice(),
        route_hash.as_ref(),
        reward_hash.as_ref(),
    ])
}

/// Authority anchor's `#[event_cpi]` signs self-invoked event instructions with.
pub fn event_authority_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[EVENT_AUTHORITY_SEED], program_id)
}

/// Serializable version of Solana's `AccountMeta`.
///
/// `AccountMeta` does not implement the borsh traits, so instructions that describe the
/// accounts another program needs (such as the Hyperlane account metas queries) return
/// this type through return data instead.
#[derive(AnchorDeserialize, AnchorSerialize, Clone, Debug, PartialEq, Eq)]
pub struct SerializableAccountMeta {
    /// The account's public key
    pub pubkey: Pubkey,
    /// Whether this account must sign the transaction
    pub is_signer: bool,
    /// Whether this account's data may be modified
    pub is_writable: bool,
}

impl From<AccountInfo<'_>> for SerializableAccountMeta {
    fn from(account_info: AccountInfo<'_>) -> Self {
        Self {
            pubkey: account_info.key(),
            is_signer: account_info.is_signer,
            is_writable: account_info.is_writable,
        }
    }
}

impl From<AccountMeta> for SerializableAccountMeta {
    fn from(account_meta: AccountMeta) -> Self {
        Self {
            pubkey: account_meta.pubkey,
            is_signer: account_meta.is_signer,
            is_writable: account_meta.is_writable,
        }
    }
}

impl From<SerializableAccountMeta> for AccountMeta {
    fn from(meta: SerializableAccountMeta) -> Self {
        Self {
            pubkey: meta.pubkey,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        }
    }
}
