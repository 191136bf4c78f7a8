use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::account::AccountExt;
use eco_svm_std::prover::Proof;
use eco_svm_std::Bytes32;

pub const FLASH_VAULT_SEED: &[u8] = b"flash_vault";
pub const ESCROW_SEED: &[u8] = b"escrow";
pub const ESCROW_STATE_SEED: &[u8] = b"escrow_state";
pub const MAX_ESCROW_TOKENS: usize = 16;

#[account]
#[derive(InitSpace, Debug)]
pub struct ProofAccount(pub Proof);

impl AccountExt for ProofAccount {}

impl From<Proof> for ProofAccount {
    fn from(proof: Proof) -> Self {
        Self(proof)
    }
}

/// Claimant the prover records for itself while it spends a reward on the route.
pub fn flash_vault_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FLASH_VAULT_SEED], &crate::ID)
}

/// Holds the lamports and token accounts of a flash fulfillment's leftover reward.
pub fn escrow_pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ESCROW_SEED, intent_hash.as_ref()], &crate::ID)
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EscrowStatus {
    #[default]
    Pending,
    Released,
    Returned,
}

/// Terms of an escrow: who gets it once the secondary intent is proven, and until when.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq, new)]
pub struct FlashEscrow {
    pub status: EscrowStatus,
    pub claimant: Pubkey,
    pub secondary_intent_hash: Bytes32,
    pub secondary_destination: u64,
    pub secondary_prover: Pubkey,
    pub deadline: u64,
    #[max_len(MAX_ESCROW_TOKENS)]
    pub tokens: Vec<Pubkey>,
}

impl AccountExt for FlashEscrow {}

impl FlashEscrow {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[ESCROW_STATE_SEED, intent_hash.as_ref()], &crate::ID)
    }
}
