use anchor_lang::prelude::*;
use eco_svm_std::prover::{ProofData, ProveArgs};
use eco_svm_std::{Bytes32, CHAIN_ID};

use crate::events::ProofsDispatched;
use crate::hyperlane;
use crate::instructions::HyperProverError;
use crate::state::{dispatcher_pda, DISPATCHER_SEED};

#[derive(Accounts)]
pub struct Prove<'info> {
    #[account(address = portal::state::dispatcher_pda().0 @ HyperProverError::InvalidPortalDispatcher)]
    pub portal_dispatcher: Signer<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ HyperProverError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: Checked in CPI
    #[account(mut)]
    pub outbox_pda: UncheckedAccount<'info>,
    /// CHECK: Checked in CPI
    pub spl_noop_program: UncheckedAccount<'info>,
    pub unique_message: Signer<'info>,
    /// CHECK: Checked in CPI
    #[account(mut)]
    pub dispatched_message_pda: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
    /// CHECK: address is validated
    #[account(executable, address = hyperlane::MAILBOX_ID @ HyperProverError::InvalidMailbox)]
    pub mailbox_program: UncheckedAccount<'info>,
}

/// Sends the fulfillments to the prover named by `data` on chain `source`. The payer
/// covers the mailbox fee.
pub fn prove_intent(ctx: Context<Prove>, args: ProveArgs) -> Result<()> {
    let ProveArgs {
        source,
        intent_hashes_claimants,
        data,
    } = args;

    let source_prover: Bytes32 = <[u8; 32]>::try_from(data)
        .map_err(|_| HyperProverError::InvalidData)?
        .into();
    let (_, bump) = dispatcher_pda();
    let signer_seeds = [DISPATCHER_SEED, &[bump]];
    let intent_hashes = intent_hashes_claimants
        .iter()
        .map(|pair| pair.intent_hash)
        .collect();

    let message_id = hyperlane::dispatch_msg(
        &ctx,
        chain_to_domain(source)?,
        source_prover,
        ProofData::new(CHAIN_ID, intent_hashes_claimants).to_bytes(),
        &signer_seeds,
    )?;

    emit!(ProofsDispatched::new(message_id, source, intent_hashes));

    Ok(())
}

// Hyperlane domain ids are used as chain ids directly.
pub fn chain_to_domain(chain: u64) -> Result<u32> {
    chain
        .try_into()
        .map_err(|_| HyperProverError::InvalidChainId.into())
}

pub fn domain_to_chain(domain: u32) -> u64 {
    domain.into()
}
