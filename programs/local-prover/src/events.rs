use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::Bytes32;

#[event]
#[derive(new)]
pub struct FlashFulfilled {
    intent_hash: Bytes32,
    claimant: Bytes32,
    escrowed: bool,
}

#[event]
#[derive(new)]
pub struct EscrowReleased {
    intent_hash: Bytes32,
    claimant: Pubkey,
}

#[event]
#[derive(new)]
pub struct EscrowReturned {
    intent_hash: Bytes32,
    vault: Pubkey,
}
