use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::account::AccountExt;
use eco_svm_std::prover::Proof;
use eco_svm_std::Bytes32;

pub const CONFIG_SEED: &[u8] = b"config";
pub const STATE_ROOT_SEED: &[u8] = b"state_root";

#[account]
#[derive(InitSpace, Debug)]
pub struct ProofAccount(pub Proof);

impl AccountExt for ProofAccount {}

impl From<Proof> for ProofAccount {
    fn from(proof: Proof) -> Self {
        Self(proof)
    }
}

#[account]
#[derive(InitSpace, Debug, new)]
pub struct Config {
    /// Only signer allowed to post state roots.
    pub root_oracle: Pubkey,
}

impl AccountExt for Config {}

impl Config {
    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
    }
}

/// State root of `destination` at `block`, as attested by the root oracle.
#[account]
#[derive(InitSpace, Debug, new, PartialEq, Eq)]
pub struct StateRoot {
    pub destination: u64,
    pub block: u64,
    pub root: Bytes32,
}

impl AccountExt for StateRoot {}

impl StateRoot {
    pub fn pda(destination: u64, block: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                STATE_ROOT_SEED,
                &destination.to_be_bytes(),
                &block.to_be_bytes(),
            ],
            &crate::ID,
        )
    }
}
