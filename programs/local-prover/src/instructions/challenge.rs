use anchor_lang::prelude::*;
use eco_svm_std::prover::{self, ChallengeArgs, IntentProofChallenged};

use crate::state::ProofAccount;

#[derive(Accounts)]
pub struct Challenge<'info> {
    /// CHECK: address is validated
    #[account(mut)]
    pub proof: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
}

/// Removes a proof recorded for another destination than the intent's. The challenger
/// keeps the rent.
pub fn challenge_intent_proof(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
    let challenged = prover::challenge_proof::<ProofAccount>(
        &ctx.accounts.proof,
        &ctx.accounts.payer,
        &args,
    )?;

    if challenged {
        emit!(IntentProofChallenged::new(args.intent_hash()));
    }

    Ok(())
}
