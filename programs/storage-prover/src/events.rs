use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::Bytes32;

#[event]
#[derive(new)]
pub struct StateRootPosted {
    destination: u64,
    block: u64,
    root: Bytes32,
}
