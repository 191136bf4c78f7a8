use anchor_lang::prelude::*;
use eco_svm_std::prover::{self, ChallengeArgs, IntentProofChallenged};

use crate::instructions::HyperProverError;
use crate::state::{pda_payer_pda, ProofAccount};

#[derive(Accounts)]
pub struct Challenge<'info> {
    /// CHECK: address is validated
    #[account(mut)]
    pub proof: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut, address = pda_payer_pda().0 @ HyperProverError::InvalidPdaPayer)]
    pub pda_payer: UncheckedAccount<'info>,
}

/// Removes a proof recorded for another destination than the intent's. The rent goes back
/// to the pda payer that funded it.
pub fn challenge_intent_proof(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
    let challenged = prover::challenge_proof::<ProofAccount>(
        &ctx.accounts.proof,
        &ctx.accounts.pda_payer,
        &args,
    )?;

    if challenged {
        emit!(IntentProofChallenged::new(args.intent_hash()));
    }

    Ok(())
}
