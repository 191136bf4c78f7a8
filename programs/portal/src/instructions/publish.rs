use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use eco_svm_std::{Bytes32, CHAIN_ID};

use crate::events::IntentPublished;
use crate::instructions::PortalError;
use crate::types::Intent;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct PublishArgs {
    pub intent: Intent,
}

#[derive(Accounts)]
#[instruction(args: PublishArgs)]
pub struct Publish {}

pub fn publish_intent(_: Context<Publish>, args: PublishArgs) -> Result<()> {
    let PublishArgs { intent } = args;
    let intent_hash = validate_and_emit(intent)?;

    set_return_data(intent_hash.as_ref());

    Ok(())
}

/// Announces `intent` with the full route and reward so indexers can rebuild it.
pub fn validate_and_emit(intent: Intent) -> Result<Bytes32> {
    require!(intent.source == CHAIN_ID, PortalError::InvalidSourceChain);
    require!(
        intent.reward.creator != Pubkey::default(),
        PortalError::InvalidIntentCreator
    );
    require!(
        intent.reward.prover != Pubkey::default(),
        PortalError::InvalidProver
    );
    intent.reward.token_amounts()?;

    let intent_hash = intent.hash();
    let Intent {
        destination,
        route,
        reward,
        ..
    } = intent;
    emit!(IntentPublished::new(intent_hash, destination, route, reward));

    Ok(intent_hash)
}
