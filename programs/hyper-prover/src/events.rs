use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::Bytes32;

#[event]
#[derive(new)]
pub struct ProofsDispatched {
    message_id: Bytes32,
    source: u64,
    intent_hashes: Vec<Bytes32>,
}
