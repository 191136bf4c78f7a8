use anchor_lang::prelude::*;
use eco_svm_std::account::AccountExt;
use eco_svm_std::prover::Proof;
use eco_svm_std::Bytes32;

use crate::instructions::HyperProverError;

pub const DISPATCHER_SEED: &[u8] = b"dispatcher";
pub const CONFIG_SEED: &[u8] = b"config";
pub const PDA_PAYER_SEED: &[u8] = b"pda_payer";
const MAX_WHITELIST_LEN: usize = 20;

#[account]
#[derive(InitSpace, Debug)]
pub struct ProofAccount(pub Proof);

impl AccountExt for ProofAccount {}

impl From<Proof> for ProofAccount {
    fn from(proof: Proof) -> Self {
        Self(proof)
    }
}

/// Sender of the messages this prover dispatches.
pub fn dispatcher_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISPATCHER_SEED], &crate::ID)
}

/// Pays the rent of proofs recorded from relayed messages and takes it back when a proof
/// is challenged.
pub fn pda_payer_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PDA_PAYER_SEED], &crate::ID)
}

/// Provers on other chains allowed to deliver proofs here.
#[account]
#[derive(InitSpace, Debug)]
pub struct Config {
    #[max_len(MAX_WHITELIST_LEN)]
    pub whitelisted_senders: Vec<Bytes32>,
}

impl Config {
    pub fn new(whitelisted_senders: Vec<Bytes32>) -> Result<Self> {
        if whitelisted_senders.len() > MAX_WHITELIST_LEN {
            return Err(HyperProverError::TooManyWhitelistedSenders.into());
        }

        Ok(Self {
            whitelisted_senders,
        })
    }

    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
    }

    pub fn is_whitelisted(&self, sender: &Bytes32) -> bool {
        self.whitelisted_senders.contains(sender)
    }
}

impl AccountExt for Config {}
