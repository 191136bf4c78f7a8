//! # Hyper-Prover Program
//!
//! Carries fulfillments between chains over Hyperlane.
//!
//! On the destination chain the portal hands fulfilled intents to `prove`, signed by the
//! portal dispatcher. The prover dispatches them through the mailbox to the hyper prover
//! on the source chain, the payer covering the mailbox fee.
//!
//! On the source chain the mailbox delivers the message to `handle`. It is accepted only
//! from whitelisted provers and only when the proofs name the chain the message came
//! from. Recording is idempotent, so a relayed batch containing an intent that is already
//! proven still lands.
//!
//! Configuration is a sender whitelist of at most 20 entries, set once through `init`.
//! The `*_account_metas` and `ism` instructions implement the Hyperlane recipient
//! interface relayers query before delivery.

use anchor_lang::prelude::*;
use eco_svm_std::prover::{self, ChallengeArgs};

declare_id!("B4pMQaAGPZ7Mza9XnDxJfXZ1cUa4aa67zrNkv8zYAjx4");

pub mod events;
pub mod hyperlane;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod hyper_prover {
    use super::*;

    /// Stores the whitelist of provers on other chains allowed to deliver proofs.
    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    /// Dispatches fulfillments to the source chain. Only the portal dispatcher can sign.
    pub fn prove(ctx: Context<Prove>, args: prover::ProveArgs) -> Result<()> {
        prove_intent(ctx, args)
    }

    /// Entry point of the Hyperlane mailbox.
    #[instruction(discriminator = &hyperlane::HANDLE_DISCRIMINATOR)]
    pub fn handle<'info>(
        ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::handle(ctx, origin, sender, payload)
    }

    pub fn challenge(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
        challenge_intent_proof(ctx, args)
    }

    pub fn proof_type(ctx: Context<GetProofType>) -> Result<()> {
        instructions::proof_type(ctx)
    }

    #[instruction(discriminator = &hyperlane::HANDLE_ACCOUNT_METAS_DISCRIMINATOR)]
    pub fn handle_account_metas(
        ctx: Context<HandleAccountMetas>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::handle_account_metas(ctx, origin, sender, payload)
    }

    #[instruction(discriminator = &hyperlane::INTERCHAIN_SECURITY_MODULE_DISCRIMINATOR)]
    pub fn ism(ctx: Context<Ism>) -> Result<()> {
        instructions::ism(ctx)
    }

    #[instruction(discriminator = &hyperlane::INTERCHAIN_SECURITY_MODULE_ACCOUNT_METAS_DISCRIMINATOR)]
    pub fn ism_account_metas(ctx: Context<IsmAccountMetas>) -> Result<()> {
        instructions::ism_account_metas(ctx)
    }
}
