use anchor_lang::prelude::*;
use eco_svm_std::account::AccountExt;
use eco_svm_std::Bytes32;

use crate::instructions::HyperProverError;
use crate::state::{Config, CONFIG_SEED};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitArgs {
    pub whitelisted_senders: Vec<Bytes32>,
}

#[derive(Accounts)]
pub struct Init<'info> {
    /// CHECK: address is validated
    #[account(mut, address = Config::pda().0 @ HyperProverError::InvalidConfig)]
    pub config: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Stores the sender whitelist. It can be set once and never changed.
pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
    require!(
        ctx.accounts.config.data_is_empty(),
        HyperProverError::ConfigAlreadyInitialized
    );
    let (_, bump) = Config::pda();
    let signer_seeds = [CONFIG_SEED, &[bump]];

    Config::new(args.whitelisted_senders)?.init(
        &ctx.accounts.config,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &[&signer_seeds],
    )
}
