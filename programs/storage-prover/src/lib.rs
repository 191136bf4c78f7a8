//! # Storage-Prover Program
//!
//! Proves fulfillments from the destination chain's state instead of a message. A root
//! oracle, fixed once at `init`, posts state roots of destination chains; anyone can
//! then prove an intent by showing the destination portal's fulfill marker under one of
//! those roots with a Merkle path.

use anchor_lang::prelude::*;
use eco_svm_std::prover::{self, ChallengeArgs};

declare_id!("2GNnsZMw9rR2Hv6X2kG26GcnwvC71GoJkhJEf51Vziox");

pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod storage_prover {
    use super::*;

    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    /// Only the root oracle can sign.
    pub fn post_state_root(ctx: Context<PostStateRoot>, args: PostStateRootArgs) -> Result<()> {
        instructions::post_state_root(ctx, args)
    }

    pub fn prove_storage<'info>(
        ctx: Context<'_, '_, '_, 'info, ProveStorage<'info>>,
        args: ProveStorageArgs,
    ) -> Result<()> {
        instructions::prove_storage(ctx, args)
    }

    pub fn prove(ctx: Context<Prove>, args: prover::ProveArgs) -> Result<()> {
        prove_intent(ctx, args)
    }

    pub fn challenge(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
        challenge_intent_proof(ctx, args)
    }

    pub fn proof_type(ctx: Context<GetProofType>) -> Result<()> {
        instructions::proof_type(ctx)
    }
}
