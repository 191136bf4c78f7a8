use anchor_lang::prelude::*;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::{Bytes32, Proof};

use crate::events::IntentWithdrawn;
use crate::instructions::payout::{is_intent_funded, reward_token_accounts, Payout};
use crate::instructions::PortalError;
use crate::state::{vault_pda, Vault, VaultStatus, VAULT_SEED};
use crate::types::{self, Reward};

/// Accounts of one intent in a batch: claimant, vault, vault state and proof, followed by
/// the token accounts of every reward token.
pub const BATCH_WITHDRAW_INTENT_ACCOUNTS: usize = 4;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct WithdrawArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct BatchWithdrawArgs {
    pub intents: Vec<WithdrawArgs>,
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: validated against the proof
    #[account(mut)]
    pub claimant: UncheckedAccount<'info>,
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

#[derive(Accounts)]
pub struct BatchWithdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

struct IntentAccounts<'a, 'info> {
    claimant: &'a AccountInfo<'info>,
    vault: &'a AccountInfo<'info>,
    vault_state: &'a AccountInfo<'info>,
    proof: &'a AccountInfo<'info>,
    token_accounts: &'a [AccountInfo<'info>],
}

struct Programs<'a, 'info> {
    payer: AccountInfo<'info>,
    token_program: &'a Program<'info, token::Token>,
    token_2022_program: &'a Program<'info, token_2022::Token2022>,
    associated_token_program: &'a Program<'info, associated_token::AssociatedToken>,
    system_program: &'a Program<'info, System>,
}

pub fn withdraw_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    args: WithdrawArgs,
) -> Result<()> {
    let programs = Programs {
        payer: ctx.accounts.payer.to_account_info(),
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
    };
    let accounts = IntentAccounts {
        claimant: &ctx.accounts.claimant,
        vault: &ctx.accounts.vault,
        vault_state: &ctx.accounts.vault_state,
        proof: &ctx.accounts.proof,
        token_accounts: ctx.remaining_accounts,
    };

    withdraw(&programs, accounts, args)
}

/// Withdraws every intent or none of them.
pub fn batch_withdraw_intents<'info>(
    ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
    args: BatchWithdrawArgs,
) -> Result<()> {
    let BatchWithdrawArgs { intents } = args;
    require!(!intents.is_empty(), PortalError::EmptyBatch);

    let programs = Programs {
        payer: ctx.accounts.payer.to_account_info(),
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
    };

    intents
        .into_iter()
        .try_fold(ctx.remaining_accounts, |remaining_accounts, args| {
            let token_account_count = args.reward.token_amounts()?.len()
                * types::VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
            let intent_account_count = BATCH_WITHDRAW_INTENT_ACCOUNTS + token_account_count;
            require!(
                intent_account_count <= remaining_accounts.len(),
                PortalError::InvalidTokenTransferAccounts
            );
            let (intent_accounts, rest) = remaining_accounts.split_at(intent_account_count);
            let (fixed, token_accounts) = intent_accounts.split_at(BATCH_WITHDRAW_INTENT_ACCOUNTS);
            let accounts = IntentAccounts {
                claimant: &fixed[0],
                vault: &fixed[1],
                vault_state: &fixed[2],
                proof: &fixed[3],
                token_accounts,
            };

            withdraw(&programs, accounts, args).map(|_| rest)
        })
        .map(|_| ())
}

fn withdraw<'info>(
    programs: &Programs<'_, 'info>,
    accounts: IntentAccounts<'_, 'info>,
    args: WithdrawArgs,
) -> Result<()> {
    let WithdrawArgs {
        destination,
        route_hash,
        reward,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());
    let (vault_pda, bump) = vault_pda(&intent_hash);
    let vault_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

    require_keys_eq!(accounts.vault.key(), vault_pda, PortalError::InvalidVault);
    require_keys_eq!(
        accounts.vault_state.key(),
        Vault::pda(&intent_hash).0,
        PortalError::InvalidVaultState
    );
    require_keys_eq!(
        accounts.proof.key(),
        Proof::pda(&intent_hash, &reward.prover).0,
        PortalError::InvalidProof
    );
    validate_proof(accounts.proof, accounts.claimant, &reward.prover, destination)?;

    let mut vault = Vault::fetch(accounts.vault_state)?;
    let token_accounts = reward_token_accounts(
        &vault_pda,
        accounts.token_accounts,
        &reward.token_amounts()?,
    )?;
    match vault.status {
        VaultStatus::Withdrawn => return Err(PortalError::IntentAlreadyWithdrawn.into()),
        VaultStatus::Refunded => return Err(PortalError::IntentAlreadyRefunded.into()),
        VaultStatus::Funded => {}
        VaultStatus::Initial | VaultStatus::PartiallyFunded => require!(
            is_intent_funded(accounts.vault, &reward, &token_accounts)?,
            PortalError::IntentNotFunded
        ),
    }

    // terminal before any funds move
    vault.status = VaultStatus::Withdrawn;
    vault.target = accounts.claimant.key();
    vault.store(
        accounts.vault_state,
        &programs.payer,
        programs.system_program,
        &intent_hash,
    )?;

    let payout = Payout {
        payer: programs.payer.clone(),
        vault: accounts.vault.clone(),
        recipient: accounts.claimant.clone(),
        token_program: programs.token_program,
        token_2022_program: programs.token_2022_program,
        associated_token_program: programs.associated_token_program,
        system_program: programs.system_program,
    };
    payout.native(&vault_seeds)?;
    payout.tokens(&intent_hash, token_accounts, &vault_seeds)?;

    emit!(IntentWithdrawn::new(intent_hash, accounts.claimant.key()));

    Ok(())
}

fn validate_proof(
    proof: &AccountInfo,
    claimant: &AccountInfo,
    prover: &Pubkey,
    destination: u64,
) -> Result<()> {
    match Proof::read(proof, prover)? {
        Some(proof) if !proof.is_proven() => Err(PortalError::IntentNotProven.into()),
        Some(proof) if proof.destination != destination => {
            Err(PortalError::InvalidProofDestination.into())
        }
        Some(proof) if proof.claimant != claimant.key() => {
            Err(PortalError::InvalidClaimant.into())
        }
        Some(_) => Ok(()),
        None => Err(PortalError::IntentNotProven.into()),
    }
}
