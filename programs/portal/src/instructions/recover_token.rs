use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::{associated_token, token, token_2022};
use eco_svm_std::Bytes32;

use crate::events::IntentTokenRecovered;
use crate::instructions::PortalError;
use crate::state::{self, VAULT_SEED};
use crate::token::TokenTransfer;
use crate::types::{self, Reward, TokenTransferAccounts};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RecoverTokenArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: RecoverTokenArgs)]
pub struct RecoverToken<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(address = args.reward.creator @ PortalError::InvalidCreator)]
    pub creator: UncheckedAccount<'info>,
    /// CHECK: address is validated
    pub vault: UncheckedAccount<'info>,
    /// CHECK: owner is the token program
    #[account(mut)]
    pub vault_ata: UncheckedAccount<'info>,
    /// CHECK: owner is the token program
    #[account(mut)]
    pub creator_ata: UncheckedAccount<'info>,
    /// CHECK: token not part of the reward
    pub mint: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Forwards a token sent to the vault by mistake to the creator, whatever the vault status.
pub fn recover_intent_token<'info>(
    ctx: Context<'_, '_, '_, 'info, RecoverToken<'info>>,
    args: RecoverTokenArgs,
) -> Result<()> {
    let RecoverTokenArgs {
        destination,
        route_hash,
        reward,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());
    let (vault_pda, bump) = state::vault_pda(&intent_hash);
    let vault_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

    require_keys_eq!(ctx.accounts.vault.key(), vault_pda, PortalError::InvalidVault);
    require!(
        !reward.token_amounts()?.contains_key(ctx.accounts.mint.key),
        PortalError::InvalidRecoverToken
    );

    let accounts = TokenTransferAccounts::try_from(vec![
        ctx.accounts.vault_ata.as_ref(),
        ctx.accounts.creator_ata.as_ref(),
        ctx.accounts.mint.as_ref(),
    ])?;
    require_keys_eq!(
        accounts.from.key(),
        get_associated_token_address_with_program_id(
            &vault_pda,
            accounts.mint.key,
            accounts.token_program_id(),
        ),
        PortalError::InvalidAta
    );
    require!(
        accounts.from_balance()? > 0,
        PortalError::ZeroRecoverTokenBalance
    );

    let token_program = accounts.token_program(
        &ctx.accounts.token_program,
        &ctx.accounts.token_2022_program,
    )?;
    accounts.init_to_ata(
        &ctx.accounts.payer,
        &ctx.accounts.creator,
        &token_program,
        &ctx.accounts.associated_token_program,
        &ctx.accounts.system_program,
    )?;
    accounts
        .transfer_all(
            &token_program,
            &ctx.accounts.vault,
            &[&vault_seeds],
            &reward.creator,
        )?
        .map_err(|_| PortalError::RecoverTokenRejected)?;

    emit!(IntentTokenRecovered::new(
        intent_hash,
        reward.creator,
        ctx.accounts.mint.key(),
    ));

    Ok(())
}
