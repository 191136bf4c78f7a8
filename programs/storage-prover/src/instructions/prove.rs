use anchor_lang::prelude::*;
use eco_svm_std::prover::ProveArgs;

use crate::instructions::StorageProverError;

#[derive(Accounts)]
pub struct Prove<'info> {
    #[account(address = portal::state::dispatcher_pda().0 @ StorageProverError::InvalidPortalDispatcher)]
    pub portal_dispatcher: Signer<'info>,
}

/// Nothing to send: the fulfill markers this call announces are proven later with
/// `prove_storage`, once the root of a block containing them is posted.
pub fn prove_intent(_ctx: Context<Prove>, _args: ProveArgs) -> Result<()> {
    Ok(())
}
