use anchor_lang::prelude::*;
use eco_svm_std::account::AccountExt;

use crate::instructions::StorageProverError;
use crate::state::{Config, CONFIG_SEED};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitArgs {
    pub root_oracle: Pubkey,
}

#[derive(Accounts)]
pub struct Init<'info> {
    /// CHECK: address is validated
    #[account(mut, address = Config::pda().0 @ StorageProverError::InvalidConfig)]
    pub config: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Fixes the root oracle. It can be set once and never changed.
pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
    require!(
        ctx.accounts.config.data_is_empty(),
        StorageProverError::ConfigAlreadyInitialized
    );
    let (_, bump) = Config::pda();
    let signer_seeds = [CONFIG_SEED, &[bump]];

    Config::new(args.root_oracle).init(
        &ctx.accounts.config,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &[&signer_seeds],
    )
}
