use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::Bytes32;

use crate::token::TransferError;
use crate::types::{Reward, Route};

#[event]
#[derive(new)]
pub struct IntentPublished {
    intent_hash: Bytes32,
    destination: u64,
    route: Route,
    reward: Reward,
}

#[event]
#[derive(new)]
pub struct IntentFunded {
    intent_hash: Bytes32,
    funder: Pubkey,
    complete: bool,
}

#[event]
#[derive(new)]
pub struct IntentRefunded {
    intent_hash: Bytes32,
    refundee: Pubkey,
}

#[event]
#[derive(new)]
pub struct IntentWithdrawn {
    intent_hash: Bytes32,
    claimant: Pubkey,
}

#[event]
#[derive(new)]
pub struct IntentTokenRecovered {
    intent_hash: Bytes32,
    refundee: Pubkey,
    token: Pubkey,
}

/// A reward token refused to leave the vault; its balance stays there.
#[event]
#[derive(new)]
pub struct RewardTransferFailed {
    intent_hash: Bytes32,
    token: Pubkey,
    recipient: Pubkey,
    reason: TransferError,
}

#[event]
#[derive(new)]
pub struct IntentFulfilled {
    intent_hash: Bytes32,
    claimant: Bytes32,
}

#[event]
#[derive(new)]
pub struct ProofRequested {
    prover: Pubkey,
    source: u64,
    intent_hashes: Vec<Bytes32>,
}
