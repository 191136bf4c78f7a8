use anchor_lang::prelude::*;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::{Bytes32, Proof};

use crate::events::IntentRefunded;
use crate::instructions::payout::{reward_token_accounts, Payout};
use crate::instructions::{now, PortalError};
use crate::state::{self, Vault, VaultStatus, VAULT_SEED};
use crate::types::{self, Reward, TokenTransferAccounts};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RefundArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: RefundArgs)]
pub struct Refund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = args.reward.creator @ PortalError::InvalidCreator)]
    pub creator: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault_state: UncheckedAccount<'info>,
    /// CHECK: address is validated
    pub proof: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn refund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
    args: RefundArgs,
) -> Result<()> {
    let RefundArgs {
        destination,
        route_hash,
        reward,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());
    let (vault_pda, bump) = state::vault_pda(&intent_hash);
    let vault_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

    require_keys_eq!(ctx.accounts.vault.key(), vault_pda, PortalError::InvalidVault);
    require_keys_eq!(
        ctx.accounts.vault_state.key(),
        Vault::pda(&intent_hash).0,
        PortalError::InvalidVaultState
    );
    require_keys_eq!(
        ctx.accounts.proof.key(),
        Proof::pda(&intent_hash, &reward.prover).0,
        PortalError::InvalidProof
    );
    require!(reward.deadline <= now()?, PortalError::RewardNotExpired);
    validate_proof(&ctx.accounts.proof, &reward.prover, destination)?;

    let mut vault = Vault::fetch(&ctx.accounts.vault_state)?;
    let token_accounts = reward_token_accounts(
        &vault_pda,
        ctx.remaining_accounts,
        &reward.token_amounts()?,
    )?;
    match vault.status {
        VaultStatus::Withdrawn => return Err(PortalError::IntentAlreadyWithdrawn.into()),
        VaultStatus::Refunded => return Err(PortalError::IntentAlreadyRefunded.into()),
        VaultStatus::Funded | VaultStatus::PartiallyFunded => {}
        // funds that arrived without a fund call still count as partial funding
        VaultStatus::Initial => require!(
            holds_funds(&ctx.accounts.vault, &token_accounts)?,
            PortalError::IntentNotFunded
        ),
    }

    vault.status = VaultStatus::Refunded;
    vault.target = reward.creator;
    vault.store(
        &ctx.accounts.vault_state,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &intent_hash,
    )?;

    let payout = Payout {
        payer: ctx.accounts.payer.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        recipient: ctx.accounts.creator.to_account_info(),
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
    };
    payout.native(&vault_seeds)?;
    payout.tokens(&intent_hash, token_accounts, &vault_seeds)?;

    emit!(IntentRefunded::new(intent_hash, reward.creator));

    Ok(())
}

/// A proof for the intent's own destination entitles the solver, even after the deadline.
fn validate_proof(proof: &AccountInfo, prover: &Pubkey, destination: u64) -> Result<()> {
    match Proof::read(proof, prover)? {
        Some(proof) if proof.is_proven() && proof.destination == destination => {
            Err(PortalError::IntentAlreadyProven.into())
        }
        _ => Ok(()),
    }
}

fn holds_funds(vault: &AccountInfo, token_accounts: &[TokenTransferAccounts]) -> Result<bool> {
    if vault.lamports() > 0 {
        return Ok(true);
    }

    token_accounts
        .iter()
        .try_fold(false, |holds, accounts| Ok(holds || accounts.from_balance()? > 0))
}
