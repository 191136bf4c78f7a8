use anchor_lang::prelude::*;
use eco_svm_std::account::AccountExt;
use eco_svm_std::merkle::MerkleProof;
use eco_svm_std::prover::{self, IntentAlreadyProven, IntentProven, Proof};
use eco_svm_std::{keccak, Bytes32};
use portal::state::FulfillMarker;

use crate::instructions::StorageProverError;
use crate::state::{ProofAccount, StateRoot};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct ProveStorageArgs {
    pub destination: u64,
    pub block: u64,
    pub intent_hash: Bytes32,
    pub claimant: Bytes32,
    /// Siblings from the fulfill marker leaf up to the posted root.
    pub merkle_proof: MerkleProof,
}

#[event_cpi]
#[derive(Accounts)]
#[instruction(args: ProveStorageArgs)]
pub struct ProveStorage<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(
        address = StateRoot::pda(args.destination, args.block).0 @ StorageProverError::InvalidStateRoot,
    )]
    pub state_root: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub proof: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

/// Leaf committing to the destination portal's fulfill marker of `intent_hash`: the
/// marker address, its owner and its account data.
pub fn fulfill_marker_leaf(intent_hash: &Bytes32, claimant: Bytes32) -> Result<Bytes32> {
    let (marker, bump) = FulfillMarker::pda(intent_hash);
    let mut data = Vec::with_capacity(8 + FulfillMarker::INIT_SPACE);
    FulfillMarker::new(claimant, bump).try_serialize(&mut data)?;

    Ok(keccak([
        marker.as_ref(),
        portal::ID.as_ref(),
        data.as_slice(),
    ]))
}

/// Records the proof of an intent whose fulfill marker is under a posted root.
/// Anyone can call it; proving an intent twice is a no-op.
pub fn prove_storage<'info>(
    ctx: Context<'_, '_, '_, 'info, ProveStorage<'info>>,
    args: ProveStorageArgs,
) -> Result<()> {
    let ProveStorageArgs {
        destination,
        intent_hash,
        claimant,
        merkle_proof,
        ..
    } = args;
    require!(!claimant.is_zero(), StorageProverError::InvalidClaimant);

    let state_root = StateRoot::load(&ctx.accounts.state_root)?
        .ok_or(StorageProverError::UnknownStateRoot)?;
    let leaf = fulfill_marker_leaf(&intent_hash, claimant)?;
    require!(
        merkle_proof.verify(&state_root.root, &leaf),
        StorageProverError::InvalidStorageProof
    );

    let claimant = claimant.into();
    let recorded = prover::record_proof::<ProofAccount>(
        &ctx.accounts.proof,
        &ctx.accounts.payer,
        None,
        &ctx.accounts.system_program,
        &intent_hash,
        Proof::new(destination, claimant),
    )?;

    if recorded {
        emit_cpi!(IntentProven::new(intent_hash, claimant, destination));
    } else {
        emit_cpi!(IntentAlreadyProven::new(intent_hash));
    }

    Ok(())
}
