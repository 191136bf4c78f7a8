use std::iter;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use eco_svm_std::account::AccountExt;
use eco_svm_std::prover::{self, IntentHashClaimant, PROVE_DISCRIMINATOR};
use eco_svm_std::Bytes32;

use crate::events::ProofRequested;
use crate::instructions::PortalError;
use crate::state::{dispatcher_pda, FulfillMarker, DISPATCHER_SEED};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct ProveArgs {
    pub prover: Pubkey,
    pub source: u64,
    pub intent_hashes: Vec<Bytes32>,
    pub data: Vec<u8>,
}

/// The fulfill markers of `args.intent_hashes` come first in the remaining accounts, in the
/// same order; the accounts after them go to the prover.
#[derive(Accounts)]
#[instruction(args: ProveArgs)]
pub struct Prove<'info> {
    /// CHECK: address is validated
    #[account(executable, address = args.prover @ PortalError::InvalidProver)]
    pub prover: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ PortalError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
}

pub struct ProveAccounts<'a, 'info> {
    pub prover: &'a AccountInfo<'info>,
    pub dispatcher: &'a AccountInfo<'info>,
    pub prover_accounts: &'a [AccountInfo<'info>],
}

pub fn prove_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
    args: ProveArgs,
) -> Result<()> {
    let ProveArgs {
        prover,
        source,
        intent_hashes,
        data,
    } = args;
    require!(
        intent_hashes.len() <= ctx.remaining_accounts.len(),
        PortalError::InvalidFulfillMarker
    );
    let (fulfill_markers, prover_accounts) = ctx.remaining_accounts.split_at(intent_hashes.len());

    let intent_hashes_claimants = intent_hashes
        .into_iter()
        .zip(fulfill_markers)
        .map(|(intent_hash, fulfill_marker)| {
            require_keys_eq!(
                fulfill_marker.key(),
                FulfillMarker::pda(&intent_hash).0,
                PortalError::InvalidFulfillMarker
            );
            let fulfill_marker =
                FulfillMarker::load(fulfill_marker)?.ok_or(PortalError::IntentNotFulfilled)?;

            Ok(IntentHashClaimant::new(intent_hash, fulfill_marker.claimant))
        })
        .collect::<Result<Vec<_>>>()?;

    dispatch_proofs(
        &ProveAccounts {
            prover: &ctx.accounts.prover,
            dispatcher: &ctx.accounts.dispatcher,
            prover_accounts,
        },
        prover,
        source,
        intent_hashes_claimants,
        data,
    )
}

/// Calls the prover's `prove` with the portal dispatcher as signer, which is how provers
/// tell fulfillments recorded by this portal apart from anyone else's.
pub fn dispatch_proofs(
    accounts: &ProveAccounts,
    prover: Pubkey,
    source: u64,
    intent_hashes_claimants: Vec<IntentHashClaimant>,
    data: Vec<u8>,
) -> Result<()> {
    let intent_hashes = intent_hashes_claimants
        .iter()
        .map(|pair| pair.intent_hash)
        .collect();
    let args = prover::ProveArgs::new(source, intent_hashes_claimants, data);
    let ix_data: Vec<_> = PROVE_DISCRIMINATOR
        .into_iter()
        .chain(args.try_to_vec()?)
        .collect();

    let (_, bump) = dispatcher_pda();
    let signer_seeds = [DISPATCHER_SEED, &[bump]];

    let remaining_account_metas = accounts.prover_accounts.iter().map(|account| AccountMeta {
        pubkey: account.key(),
        is_signer: account.is_signer,
        is_writable: account.is_writable,
    });
    let remaining_account_infos = accounts
        .prover_accounts
        .iter()
        .map(ToAccountInfo::to_account_info);

    let ix = Instruction::new_with_bytes(
        prover,
        &ix_data,
        iter::once(AccountMeta::new_readonly(accounts.dispatcher.key(), true))
            .chain(remaining_account_metas)
            .collect(),
    );

    invoke_signed(
        &ix,
        iter::once(accounts.dispatcher.to_account_info())
            .chain(remaining_account_infos)
            .chain(iter::once(accounts.prover.to_account_info()))
            .collect::<Vec<_>>()
            .as_slice(),
        &[&signer_seeds],
    )?;

    emit!(ProofRequested::new(prover, source, intent_hashes));

    Ok(())
}
