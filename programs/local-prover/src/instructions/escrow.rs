use anchor_lang::prelude::*;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::prover::Proof;
use eco_svm_std::Bytes32;
use portal::instructions::payout::{reward_token_accounts, Payout};

use crate::events::{EscrowReleased, EscrowReturned};
use crate::instructions::{now, LocalProverError};
use crate::state::{escrow_pda, EscrowStatus, FlashEscrow, ESCROW_SEED};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct EscrowArgs {
    /// Flash fulfilled intent the escrow belongs to.
    pub intent_hash: Bytes32,
}

/// `[escrow ata, claimant ata, mint]` per escrowed token follow as remaining accounts.
#[derive(Accounts)]
#[instruction(args: EscrowArgs)]
pub struct ReleaseEscrow<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: validated against the escrow
    #[account(mut)]
    pub claimant: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut, address = escrow_pda(&args.intent_hash).0 @ LocalProverError::InvalidEscrow)]
    pub escrow: UncheckedAccount<'info>,
    #[account(mut, address = FlashEscrow::pda(&args.intent_hash).0 @ LocalProverError::InvalidEscrowState)]
    pub escrow_state: Account<'info, FlashEscrow>,
    /// CHECK: validated against the escrow
    pub secondary_proof: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// `[escrow ata, vault ata, mint]` per escrowed token follow as remaining accounts.
#[derive(Accounts)]
#[instruction(args: EscrowArgs)]
pub struct ReclaimEscrow<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = portal::state::vault_pda(&args.intent_hash).0 @ LocalProverError::InvalidVault)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut, address = escrow_pda(&args.intent_hash).0 @ LocalProverError::InvalidEscrow)]
    pub escrow: UncheckedAccount<'info>,
    #[account(mut, address = FlashEscrow::pda(&args.intent_hash).0 @ LocalProverError::InvalidEscrowState)]
    pub escrow_state: Account<'info, FlashEscrow>,
    /// CHECK: validated against the escrow
    pub secondary_proof: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Pays the escrow to the flash claimant once the secondary intent is proven.
/// Permissionless.
pub fn release_escrow<'info>(
    ctx: Context<'_, '_, '_, 'info, ReleaseEscrow<'info>>,
    args: EscrowArgs,
) -> Result<()> {
    let EscrowArgs { intent_hash } = args;
    let escrow = &ctx.accounts.escrow_state;

    require!(
        escrow.status == EscrowStatus::Pending,
        LocalProverError::EscrowAlreadyResolved
    );
    require_keys_eq!(
        ctx.accounts.claimant.key(),
        escrow.claimant,
        LocalProverError::InvalidClaimant
    );
    require!(
        is_secondary_proven(escrow, &ctx.accounts.secondary_proof)?,
        LocalProverError::SecondaryIntentNotProven
    );

    let claimant = escrow.claimant;
    let token_accounts = escrow_token_accounts(
        escrow,
        &ctx.accounts.escrow.key(),
        ctx.remaining_accounts,
    )?;
    ctx.accounts.escrow_state.status = EscrowStatus::Released;

    let (_, bump) = escrow_pda(&intent_hash);
    let escrow_seeds = [ESCROW_SEED, intent_hash.as_ref(), &[bump]];
    let payout = Payout {
        payer: ctx.accounts.payer.to_account_info(),
        vault: ctx.accounts.escrow.to_account_info(),
        recipient: ctx.accounts.claimant.to_account_info(),
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
    };
    payout.native(&escrow_seeds)?;
    payout.tokens(&intent_hash, token_accounts, &escrow_seeds)?;

    emit!(EscrowReleased::new(intent_hash, claimant));

    Ok(())
}

/// Returns the escrow to the vault of the flash fulfilled intent once the secondary intent
/// expired unproven. Permissionless.
pub fn reclaim_escrow<'info>(
    ctx: Context<'_, '_, '_, 'info, ReclaimEscrow<'info>>,
    args: EscrowArgs,
) -> Result<()> {
    let EscrowArgs { intent_hash } = args;
    let escrow = &ctx.accounts.escrow_state;

    require!(
        escrow.status == EscrowStatus::Pending,
        LocalProverError::EscrowAlreadyResolved
    );
    require!(
        escrow.deadline <= now()?,
        LocalProverError::SecondaryIntentNotExpired
    );
    require!(
        !is_secondary_proven(escrow, &ctx.accounts.secondary_proof)?,
        LocalProverError::SecondaryIntentProven
    );

    let token_accounts = escrow_token_accounts(
        escrow,
        &ctx.accounts.escrow.key(),
        ctx.remaining_accounts,
    )?;
    ctx.accounts.escrow_state.status = EscrowStatus::Returned;

    let (_, bump) = escrow_pda(&intent_hash);
    let escrow_seeds = [ESCROW_SEED, intent_hash.as_ref(), &[bump]];
    let payout = Payout {
        payer: ctx.accounts.payer.to_account_info(),
        vault: ctx.accounts.escrow.to_account_info(),
        recipient: ctx.accounts.vault.to_account_info(),
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
    };
    payout.native(&escrow_seeds)?;
    payout.tokens(&intent_hash, token_accounts, &escrow_seeds)?;

    emit!(EscrowReturned::new(intent_hash, ctx.accounts.vault.key()));

    Ok(())
}

fn is_secondary_proven(escrow: &FlashEscrow, secondary_proof: &AccountInfo) -> Result<bool> {
    require_keys_eq!(
        secondary_proof.key(),
        Proof::pda(&escrow.secondary_intent_hash, &escrow.secondary_prover).0,
        LocalProverError::InvalidSecondaryProof
    );

    Ok(Proof::read(secondary_proof, &escrow.secondary_prover)?
        .is_some_and(|proof| {
            proof.is_proven() && proof.destination == escrow.secondary_destination
        }))
}

fn escrow_token_accounts<'info>(
    escrow: &FlashEscrow,
    escrow_key: &Pubkey,
    accounts: &[AccountInfo<'info>],
) -> Result<Vec<portal::types::TokenTransferAccounts<'info>>> {
    let tokens = escrow.tokens.iter().map(|mint| (*mint, 0)).collect();

    reward_token_accounts(escrow_key, accounts, &tokens)
}
