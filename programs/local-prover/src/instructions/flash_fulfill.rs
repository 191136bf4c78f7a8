use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::{invoke, invoke_signed};
use anchor_lang::InstructionData;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::account::AccountExt;
use eco_svm_std::prover::{self, IntentProven, Proof};
use eco_svm_std::{intent_hash, is_prover, Bytes32, CHAIN_ID};
use portal::instructions::payout::{reward_token_accounts, Payout};
use portal::instructions::{FulfillArgs, WithdrawArgs};
use portal::types::{Intent, Reward, VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE};

use crate::events::FlashFulfilled;
use crate::instructions::LocalProverError;
use crate::state::{
    escrow_pda, flash_vault_pda, EscrowStatus, FlashEscrow, ProofAccount, ESCROW_STATE_SEED,
    FLASH_VAULT_SEED, MAX_ESCROW_TOKENS,
};

/// Intent whose proof gates the release of a flash fulfillment's leftover reward.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SecondaryIntent {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

impl SecondaryIntent {
    pub fn hash(&self) -> Bytes32 {
        intent_hash(self.destination, &self.route_hash, &self.reward.hash())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct FlashFulfillArgs {
    pub intent: Intent,
    pub claimant: Bytes32,
    pub secondary: Option<SecondaryIntent>,
}

/// Remaining accounts, in order:
/// - `[vault ata, flash vault ata, mint]` per reward token, for the withdrawal
/// - `[flash vault ata, claimant or escrow ata, mint]` per reward token, for the leftover
/// - the accounts of the portal fulfillment
#[derive(Accounts)]
#[instruction(args: FlashFulfillArgs)]
pub struct FlashFulfill<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = Pubkey::from(args.claimant) @ LocalProverError::InvalidClaimant)]
    pub claimant: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut, address = flash_vault_pda().0 @ LocalProverError::InvalidFlashVault)]
    pub flash_vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub proof: UncheckedAccount<'info>,
    /// CHECK: validated by the portal
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: validated by the portal
    #[account(mut)]
    pub vault_state: UncheckedAccount<'info>,
    /// CHECK: validated by the portal
    #[account(mut)]
    pub executor: UncheckedAccount<'info>,
    /// CHECK: validated by the portal
    #[account(mut)]
    pub fulfill_marker: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub escrow: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub escrow_state: UncheckedAccount<'info>,
    pub portal_program: Program<'info, portal::program::Portal>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Fulfills a same chain intent with its own reward.
///
/// The prover proves the intent to its flash vault, withdraws the reward there and funds
/// the route from it. Whatever is left goes to `claimant` right away, or into an escrow
/// when a secondary intent must be proven first.
pub fn flash_fulfill_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, FlashFulfill<'info>>,
    args: FlashFulfillArgs,
) -> Result<()> {
    let FlashFulfillArgs {
        intent,
        claimant,
        secondary,
    } = args;

    require!(
        intent.destination == CHAIN_ID,
        LocalProverError::InvalidDestination
    );
    require_keys_eq!(
        intent.reward.prover,
        crate::ID,
        LocalProverError::InvalidProver
    );
    require!(!claimant.is_zero(), LocalProverError::InvalidClaimant);

    let intent_hash = intent.hash();
    let route_hash = intent.route.hash();
    let reward_hash = intent.reward.hash();
    let reward_token_amounts = intent.reward.token_amounts()?;
    let leg_count = reward_token_amounts.len() * VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
    require!(
        2 * leg_count <= ctx.remaining_accounts.len(),
        LocalProverError::InvalidTokenTransferAccounts
    );
    let (withdraw_accounts, rest) = ctx.remaining_accounts.split_at(leg_count);
    let (leftover_accounts, fulfill_accounts) = rest.split_at(leg_count);

    let (flash_vault, bump) = flash_vault_pda();
    let flash_vault_seeds = [FLASH_VAULT_SEED, &[bump]];

    let recorded = prover::record_proof::<ProofAccount>(
        &ctx.accounts.proof,
        &ctx.accounts.payer,
        None,
        &ctx.accounts.system_program,
        &intent_hash,
        Proof::new(CHAIN_ID, flash_vault),
    )?;
    require!(recorded, LocalProverError::IntentAlreadyProven);
    emit!(IntentProven::new(intent_hash, flash_vault, CHAIN_ID));

    withdraw_reward(
        &ctx,
        WithdrawArgs {
            destination: intent.destination,
            route_hash,
            reward: intent.reward.clone(),
        },
        withdraw_accounts,
    )?;
    fulfill_route(
        &ctx,
        FulfillArgs {
            intent_hash,
            route: intent.route.to_fulfill_route()?,
            reward_hash,
            claimant,
        },
        fulfill_accounts,
        &flash_vault_seeds,
    )?;

    let recipient = match &secondary {
        Some(secondary) => {
            open_escrow(&ctx, &intent_hash, claimant, secondary, &reward_token_amounts)?;
            ctx.accounts.escrow.to_account_info()
        }
        None => ctx.accounts.claimant.to_account_info(),
    };
    let payout = Payout {
        payer: ctx.accounts.payer.to_account_info(),
        vault: ctx.accounts.flash_vault.to_account_info(),
        recipient,
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
    };
    payout.native(&flash_vault_seeds)?;
    payout.tokens(
        &intent_hash,
        reward_token_accounts(&flash_vault, leftover_accounts, &reward_token_amounts)?,
        &flash_vault_seeds,
    )?;

    emit!(FlashFulfilled::new(
        intent_hash,
        claimant,
        secondary.is_some()
    ));

    Ok(())
}

fn withdraw_reward<'info>(
    ctx: &Context<'_, '_, '_, 'info, FlashFulfill<'info>>,
    args: WithdrawArgs,
    token_accounts: &[AccountInfo<'info>],
) -> Result<()> {
    let accounts = portal::accounts::Withdraw {
        payer: ctx.accounts.payer.key(),
        claimant: ctx.accounts.flash_vault.key(),
        vault: ctx.accounts.vault.key(),
        vault_state: ctx.accounts.vault_state.key(),
        proof: ctx.accounts.proof.key(),
        token_program: ctx.accounts.token_program.key(),
        token_2022_program: ctx.accounts.token_2022_program.key(),
        associated_token_program: ctx.accounts.associated_token_program.key(),
        system_program: ctx.accounts.system_program.key(),
    };
    let account_infos = [
        ctx.accounts.payer.to_account_info(),
        ctx.accounts.flash_vault.to_account_info(),
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.vault_state.to_account_info(),
        ctx.accounts.proof.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.token_2022_program.to_account_info(),
        ctx.accounts.associated_token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
    ];
    let ix = portal_instruction(
        accounts.to_account_metas(None),
        token_accounts,
        portal::instruction::Withdraw { args }.data(),
    );

    invoke(&ix, &[account_infos.as_slice(), token_accounts].concat()).map_err(Into::into)
}

fn fulfill_route<'info>(
    ctx: &Context<'_, '_, '_, 'info, FlashFulfill<'info>>,
    args: FulfillArgs,
    fulfill_accounts: &[AccountInfo<'info>],
    flash_vault_seeds: &[&[u8]],
) -> Result<()> {
    let accounts = portal::accounts::Fulfill {
        payer: ctx.accounts.payer.key(),
        solver: ctx.accounts.flash_vault.key(),
        executor: ctx.accounts.executor.key(),
        fulfill_marker: ctx.accounts.fulfill_marker.key(),
        token_program: ctx.accounts.token_program.key(),
        token_2022_program: ctx.accounts.token_2022_program.key(),
        associated_token_program: ctx.accounts.associated_token_program.key(),
        system_program: ctx.accounts.system_program.key(),
    };
    let account_infos = [
        ctx.accounts.payer.to_account_info(),
        ctx.accounts.flash_vault.to_account_info(),
        ctx.accounts.executor.to_account_info(),
        ctx.accounts.fulfill_marker.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.token_2022_program.to_account_info(),
        ctx.accounts.associated_token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
    ];
    let ix = portal_instruction(
        accounts.to_account_metas(None),
        fulfill_accounts,
        portal::instruction::Fulfill { args }.data(),
    );

    invoke_signed(
        &ix,
        &[account_infos.as_slice(), fulfill_accounts].concat(),
        &[flash_vault_seeds],
    )
    .map_err(Into::into)
}

fn portal_instruction(
    account_metas: Vec<AccountMeta>,
    remaining_accounts: &[AccountInfo<'_>],
    data: Vec<u8>,
) -> Instruction {
    let remaining_account_metas = remaining_accounts.iter().map(|account| AccountMeta {
        pubkey: account.key(),
        is_signer: account.is_signer,
        is_writable: account.is_writable,
    });

    Instruction {
        program_id: portal::ID,
        accounts: account_metas
            .into_iter()
            .chain(remaining_account_metas)
            .collect(),
        data,
    }
}

fn open_escrow<'info>(
    ctx: &Context<'_, '_, '_, 'info, FlashFulfill<'info>>,
    intent_hash: &Bytes32,
    claimant: Bytes32,
    secondary: &SecondaryIntent,
    reward_token_amounts: &BTreeMap<Pubkey, u64>,
) -> Result<()> {
    require!(
        is_prover(&secondary.reward.prover),
        LocalProverError::InvalidSecondaryProver
    );
    require!(
        reward_token_amounts.len() <= MAX_ESCROW_TOKENS,
        LocalProverError::TooManyEscrowTokens
    );
    require_keys_eq!(
        ctx.accounts.escrow.key(),
        escrow_pda(intent_hash).0,
        LocalProverError::InvalidEscrow
    );
    let (escrow_state, bump) = FlashEscrow::pda(intent_hash);
    require_keys_eq!(
        ctx.accounts.escrow_state.key(),
        escrow_state,
        LocalProverError::InvalidEscrowState
    );
    let signer_seeds = [ESCROW_STATE_SEED, intent_hash.as_ref(), &[bump]];

    FlashEscrow::new(
        EscrowStatus::Pending,
        claimant.into(),
        secondary.hash(),
        secondary.destination,
        secondary.reward.prover,
        secondary.reward.deadline,
        reward_token_amounts.keys().copied().collect(),
    )
    .init(
        &ctx.accounts.escrow_state,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &[&signer_seeds],
    )
}
