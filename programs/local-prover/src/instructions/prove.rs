use anchor_lang::prelude::*;
use eco_svm_std::prover::{
    self, IntentAlreadyProven, IntentHashClaimant, IntentProven, Proof, ProveArgs,
};
use eco_svm_std::CHAIN_ID;

use crate::instructions::LocalProverError;
use crate::state::ProofAccount;

/// The proof accounts of the intents follow as remaining accounts, in order.
#[event_cpi]
#[derive(Accounts)]
pub struct Prove<'info> {
    #[account(address = portal::state::dispatcher_pda().0 @ LocalProverError::InvalidPortalDispatcher)]
    pub portal_dispatcher: Signer<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Records proofs for intents fulfilled on this chain. Fulfillment and settlement share
/// the chain, so the claimants read from the fulfill markers are final.
pub fn prove_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
    args: ProveArgs,
) -> Result<()> {
    let ProveArgs {
        source,
        intent_hashes_claimants,
        ..
    } = args;

    require!(source == CHAIN_ID, LocalProverError::InvalidSourceChain);
    require!(
        ctx.remaining_accounts.len() == intent_hashes_claimants.len(),
        LocalProverError::InvalidProofAccounts
    );

    ctx.remaining_accounts
        .iter()
        .zip(intent_hashes_claimants)
        .try_for_each(|(proof, intent_hash_claimant)| {
            mark_intent_hash_proven(&ctx, proof, intent_hash_claimant)
        })
}

fn mark_intent_hash_proven<'info>(
    ctx: &Context<'_, '_, '_, 'info, Prove<'info>>,
    proof: &AccountInfo<'info>,
    intent_hash_claimant: IntentHashClaimant,
) -> Result<()> {
    let IntentHashClaimant {
        intent_hash,
        claimant,
    } = intent_hash_claimant;
    let claimant = claimant.into();

    let recorded = prover::record_proof::<ProofAccount>(
        proof,
        &ctx.accounts.payer,
        None,
        &ctx.accounts.system_program,
        &intent_hash,
        Proof::new(CHAIN_ID, claimant),
    )?;

    if recorded {
        emit_cpi!(IntentProven::new(intent_hash, claimant, CHAIN_ID));
    } else {
        emit_cpi!(IntentAlreadyProven::new(intent_hash));
    }

    Ok(())
}
