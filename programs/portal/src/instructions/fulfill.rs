use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::system_program;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::account::AccountExt;
use eco_svm_std::prover::IntentHashClaimant;
use eco_svm_std::{is_prover, Bytes32, CHAIN_ID};

use crate::events::IntentFulfilled;
use crate::instructions::fund_context::FundTokenContext;
use crate::instructions::prove::{dispatch_proofs, ProveAccounts};
use crate::instructions::{now, PortalError};
use crate::state::{
    dispatcher_pda, executor_pda, FulfillMarker, EXECUTOR_SEED, FULFILL_MARKER_SEED,
};
use crate::types::{
    self, Calldata, CalldataWithAccounts, Route, VecTokenTransferAccounts,
    VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE,
};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct FulfillArgs {
    /// Hash the solver expects; the route and reward hash must reproduce it on this chain.
    pub intent_hash: Bytes32,
    pub route: Route,
    pub reward_hash: Bytes32,
    pub claimant: Bytes32,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct FulfillAndProveArgs {
    pub fulfill: FulfillArgs,
    pub prover: Pubkey,
    pub source: u64,
    pub data: Vec<u8>,
}

#[derive(Accounts)]
pub struct Fulfill<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut)]
    pub solver: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = executor_pda().0 @ PortalError::InvalidExecutor)]
    pub executor: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub fulfill_marker: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(args: FulfillAndProveArgs)]
pub struct FulfillAndProve<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut)]
    pub solver: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = executor_pda().0 @ PortalError::InvalidExecutor)]
    pub executor: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub fulfill_marker: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(executable, address = args.prover @ PortalError::InvalidProver)]
    pub prover: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ PortalError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// A route call ready to run: its target, value and the accounts it was hashed with.
struct RouteCall<'info> {
    target: Pubkey,
    value: u64,
    data: Vec<u8>,
    accounts: Vec<AccountInfo<'info>>,
}

struct FulfillAccounts<'a, 'info> {
    payer: &'a AccountInfo<'info>,
    executor: &'a AccountInfo<'info>,
    fulfill_marker: &'a AccountInfo<'info>,
    system_program: &'a Program<'info, System>,
}

pub fn fulfill_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Fulfill<'info>>,
    args: FulfillArgs,
) -> Result<()> {
    let accounts = FulfillAccounts {
        payer: &ctx.accounts.payer,
        executor: &ctx.accounts.executor,
        fulfill_marker: &ctx.accounts.fulfill_marker,
        system_program: &ctx.accounts.system_program,
    };

    fulfill(
        &accounts,
        FundTokenContext::from(&ctx),
        ctx.remaining_accounts,
        args,
    )
    .map(|_| ())
}

/// Fulfills the intent and hands the fulfillment to the prover in the same transaction.
/// Accounts past those of the route calls go to the prover.
pub fn fulfill_and_prove_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, FulfillAndProve<'info>>,
    args: FulfillAndProveArgs,
) -> Result<()> {
    let FulfillAndProveArgs {
        fulfill: fulfill_args,
        prover,
        source,
        data,
    } = args;
    let accounts = FulfillAccounts {
        payer: &ctx.accounts.payer,
        executor: &ctx.accounts.executor,
        fulfill_marker: &ctx.accounts.fulfill_marker,
        system_program: &ctx.accounts.system_program,
    };

    let (intent_hash_claimant, used_account_count) = fulfill(
        &accounts,
        FundTokenContext::from(&ctx),
        ctx.remaining_accounts,
        fulfill_args,
    )?;

    dispatch_proofs(
        &ProveAccounts {
            prover: &ctx.accounts.prover,
            dispatcher: &ctx.accounts.dispatcher,
            prover_accounts: &ctx.remaining_accounts[used_account_count..],
        },
        prover,
        source,
        vec![intent_hash_claimant],
        data,
    )
}

/// Returns the fulfilled intent and how many remaining accounts the route consumed.
fn fulfill<'info>(
    accounts: &FulfillAccounts<'_, 'info>,
    fund_context: FundTokenContext<'_, 'info>,
    remaining_accounts: &[AccountInfo<'info>],
    args: FulfillArgs,
) -> Result<(IntentHashClaimant, usize)> {
    let FulfillArgs {
        intent_hash: expected_hash,
        route,
        reward_hash,
        claimant,
    } = args;

    require!(route.portal == crate::ID, PortalError::InvalidPortal);
    require!(!claimant.is_zero(), PortalError::InvalidClaimant);

    let split_index = route.tokens.len() * VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
    require!(
        split_index <= remaining_accounts.len(),
        PortalError::InvalidTokenTransferAccounts
    );
    let (token_transfer_accounts, call_accounts) = remaining_accounts.split_at(split_index);
    let (hashed_route, calls) = route_calls(&route, call_accounts)?;
    let used_account_count = split_index
        + calls
            .iter()
            .map(|call| call.accounts.len())
            .sum::<usize>();

    let intent_hash = types::intent_hash(CHAIN_ID, &hashed_route.hash(), &reward_hash);
    require!(intent_hash == expected_hash, PortalError::InvalidIntentHash);
    require!(route.deadline >= now()?, PortalError::IntentExpired);

    mark_fulfilled(accounts, &intent_hash, &claimant)?;
    fund_executor(&fund_context, &route, token_transfer_accounts.try_into()?)?;
    calls
        .into_iter()
        .try_for_each(|call| execute_route_call(accounts, remaining_accounts, call))?;

    emit!(IntentFulfilled::new(intent_hash, claimant));

    Ok((
        IntentHashClaimant::new(intent_hash, claimant),
        used_account_count,
    ))
}

/// Pairs each call with the accounts that follow in order and rebuilds the route as it
/// was hashed on the source chain, with [`CalldataWithAccounts`] in place of the calldata.
fn route_calls<'info>(
    route: &Route,
    call_accounts: &[AccountInfo<'info>],
) -> Result<(Route, Vec<RouteCall<'info>>)> {
    let mut hashed_route = route.clone();
    let mut call_accounts = call_accounts.iter();

    let calls = hashed_route
        .calls
        .iter_mut()
        .map(|call| {
            let calldata = Calldata::try_from_slice(&call.data)
                .map_err(|_| PortalError::InvalidCalldata)?;
            let accounts: Vec<_> = call_accounts
                .by_ref()
                .take(calldata.account_count as usize)
                .map(ToAccountInfo::to_account_info)
                .collect();
            let data = calldata.data.clone();

            call.data = CalldataWithAccounts::new(calldata, accounts.clone())?.try_to_vec()?;

            Ok(RouteCall {
                target: call.target.into(),
                value: call.value,
                data,
                accounts,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((hashed_route, calls))
}

fn fund_executor<'info>(
    fund_context: &FundTokenContext<'_, 'info>,
    route: &Route,
    accounts: VecTokenTransferAccounts<'info>,
) -> Result<()> {
    let route_token_amounts = route.token_amounts()?;
    let funded_tokens = fund_context.fund_tokens(accounts, &route_token_amounts)?;

    require!(
        funded_tokens.iter().eq(route_token_amounts.keys()),
        PortalError::InvalidMint
    );
    require!(
        fund_context.fund_native(route.native_amount)?,
        PortalError::InsufficientFunds
    );

    Ok(())
}

fn execute_route_call<'info>(
    accounts: &FulfillAccounts<'_, 'info>,
    remaining_accounts: &[AccountInfo<'info>],
    call: RouteCall<'info>,
) -> Result<()> {
    require!(!is_prover(&call.target), PortalError::CallToProver);

    let target = remaining_accounts
        .iter()
        .find(|account| account.key() == call.target)
        .ok_or(PortalError::InvalidFulfillTarget)?;
    let (_, bump) = executor_pda();
    let signer_seeds = [EXECUTOR_SEED, &[bump]];

    if !target.executable {
        require!(call.data.is_empty(), PortalError::CallToAccountWithoutCode);

        return match call.value {
            0 => Ok(()),
            value => system_program::transfer(
                CpiContext::new_with_signer(
                    accounts.system_program.to_account_info(),
                    system_program::Transfer {
                        from: accounts.executor.to_account_info(),
                        to: target.to_account_info(),
                    },
                    &[&signer_seeds],
                ),
                value,
            ),
        };
    }

    require!(call.value == 0, PortalError::InvalidCallValue);

    let instruction = Instruction::new_with_bytes(
        call.target,
        &call.data,
        call.accounts
            .iter()
            .map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: account.is_signer || account.key() == accounts.executor.key(),
                is_writable: account.is_writable,
            })
            .collect(),
    );
    let account_infos: Vec<_> = call
        .accounts
        .into_iter()
        .chain([target.to_account_info()])
        .collect();

    invoke_signed(&instruction, &account_infos, &[&signer_seeds]).map_err(Into::into)
}

fn mark_fulfilled(
    accounts: &FulfillAccounts,
    intent_hash: &Bytes32,
    claimant: &Bytes32,
) -> Result<()> {
    let (fulfill_marker, bump) = FulfillMarker::pda(intent_hash);
    require_keys_eq!(
        accounts.fulfill_marker.key(),
        fulfill_marker,
        PortalError::InvalidFulfillMarker
    );
    let signer_seeds = [FULFILL_MARKER_SEED, intent_hash.as_ref(), &[bump]];

    FulfillMarker::new(*claimant, bump)
        .init(
            accounts.fulfill_marker,
            accounts.payer,
            accounts.system_program,
            &[&signer_seeds],
        )
        .map_err(|_| PortalError::IntentAlreadyFulfilled.into())
}
