//! # Local-Prover Program
//!
//! Proves intents whose destination is the chain they were published on. Fulfillment
//! and settlement share one ledger, so the portal hands the claimants of its fulfill
//! markers to `prove` through its dispatcher and the prover records them directly,
//! without any messaging layer.
//!
//! ## Flash fulfillment
//!
//! `flash_fulfill` lets a solver fulfill a same chain intent without fronting the route's
//! funds: the prover proves the intent to its own flash vault, withdraws the reward
//! there and spends it on the route in the same transaction. The leftover reward goes
//! to the solver, or, when the fulfillment depends on a secondary intent, into an
//! escrow that is released once that intent is proven and returned to the intent's
//! vault once it expires unproven.

use anchor_lang::prelude::*;
use eco_svm_std::prover::{self, ChallengeArgs};

declare_id!("34pNy1Kn6VzTrEK8fg1z24fknE8r1EYncASV7wQh1x6j");

pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod local_prover {
    use super::*;

    /// Records proofs for intents fulfilled on this chain.
    ///
    /// # Errors
    /// - `InvalidPortalDispatcher`: the portal dispatcher did not sign
    /// - `InvalidSourceChain`: the intents were not published on this chain
    pub fn prove<'info>(
        ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
        args: prover::ProveArgs,
    ) -> Result<()> {
        prove_intent(ctx, args)
    }

    pub fn challenge(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
        challenge_intent_proof(ctx, args)
    }

    pub fn proof_type(ctx: Context<GetProofType>) -> Result<()> {
        instructions::proof_type(ctx)
    }

    pub fn flash_fulfill<'info>(
        ctx: Context<'_, '_, '_, 'info, FlashFulfill<'info>>,
        args: FlashFulfillArgs,
    ) -> Result<()> {
        flash_fulfill_intent(ctx, args)
    }

    pub fn release_escrow<'info>(
        ctx: Context<'_, '_, '_, 'info, ReleaseEscrow<'info>>,
        args: EscrowArgs,
    ) -> Result<()> {
        instructions::release_escrow(ctx, args)
    }

    pub fn reclaim_escrow<'info>(
        ctx: Context<'_, '_, '_, 'info, ReclaimEscrow<'info>>,
        args: EscrowArgs,
    ) -> Result<()> {
        instructions::reclaim_escrow(ctx, args)
    }
}
