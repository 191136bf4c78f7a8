use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::Bytes32;

use crate::events::IntentFunded;
use crate::instructions::fund_context::FundTokenContext;
use crate::instructions::publish::validate_and_emit;
use crate::instructions::PortalError;
use crate::state::{vault_pda, Vault, VaultStatus, VAULT_SEED};
use crate::types::{self, Intent, Reward};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct FundArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
    pub allow_partial: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct PublishAndFundArgs {
    pub intent: Intent,
    pub allow_partial: bool,
}

#[derive(Accounts)]
pub struct Fund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut)]
    pub funder: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault_state: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundFor<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: only the allowances it granted to the vault are spent
    pub funder: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault_state: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn fund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Fund<'info>>,
    args: FundArgs,
) -> Result<()> {
    let FundArgs {
        destination,
        route_hash,
        reward,
        allow_partial,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());

    fund_vault(
        FundTokenContext::from(&ctx),
        &ctx.accounts.vault_state,
        ctx.remaining_accounts,
        &intent_hash,
        &reward,
        allow_partial,
    )
}

pub fn fund_intent_for<'info>(
    ctx: Context<'_, '_, '_, 'info, FundFor<'info>>,
    args: FundArgs,
) -> Result<()> {
    let FundArgs {
        destination,
        route_hash,
        reward,
        allow_partial,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());
    let (_, bump) = vault_pda(&intent_hash);
    let bump = [bump];
    let vault_seeds = [VAULT_SEED, intent_hash.as_ref(), &bump];

    fund_vault(
        FundTokenContext::delegated(&ctx, &vault_seeds),
        &ctx.accounts.vault_state,
        ctx.remaining_accounts,
        &intent_hash,
        &reward,
        allow_partial,
    )
}

pub fn publish_and_fund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Fund<'info>>,
    args: PublishAndFundArgs,
) -> Result<()> {
    let PublishAndFundArgs {
        intent,
        allow_partial,
    } = args;
    let reward = intent.reward.clone();
    let intent_hash = validate_and_emit(intent)?;

    fund_vault(
        FundTokenContext::from(&ctx),
        &ctx.accounts.vault_state,
        ctx.remaining_accounts,
        &intent_hash,
        &reward,
        allow_partial,
    )
}

fn fund_vault<'info>(
    context: FundTokenContext<'_, 'info>,
    vault_state: &AccountInfo<'info>,
    token_accounts: &[AccountInfo<'info>],
    intent_hash: &Bytes32,
    reward: &Reward,
    allow_partial: bool,
) -> Result<()> {
    require_keys_eq!(
        context.fundee.key(),
        vault_pda(intent_hash).0,
        PortalError::InvalidVault
    );
    require_keys_eq!(
        vault_state.key(),
        Vault::pda(intent_hash).0,
        PortalError::InvalidVaultState
    );

    let mut vault = Vault::fetch(vault_state)?;
    match vault.status {
        VaultStatus::Funded => return Err(PortalError::IntentAlreadyFunded.into()),
        VaultStatus::Withdrawn => return Err(PortalError::IntentAlreadyWithdrawn.into()),
        VaultStatus::Refunded => return Err(PortalError::IntentAlreadyRefunded.into()),
        VaultStatus::Initial | VaultStatus::PartiallyFunded => {}
    }

    let native_funded = context.fund_native(reward.native_amount)?;
    let reward_token_amounts = reward.token_amounts()?;
    let funded_tokens = context.fund_tokens(token_accounts.try_into()?, &reward_token_amounts)?;
    let complete = native_funded && funded_tokens.iter().eq(reward_token_amounts.keys());

    require!(complete || allow_partial, PortalError::InsufficientFunds);

    vault.status = if complete {
        VaultStatus::Funded
    } else {
        VaultStatus::PartiallyFunded
    };
    vault.target = context.funder.key();
    vault.store(
        vault_state,
        &context.payer,
        context.system_program,
        intent_hash,
    )?;

    emit!(IntentFunded::new(*intent_hash, vault.target, complete));
    set_return_data(intent_hash.as_ref());

    Ok(())
}
