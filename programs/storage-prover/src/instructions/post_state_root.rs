use anchor_lang::prelude::*;
use eco_svm_std::account::AccountExt;
use eco_svm_std::Bytes32;

use crate::events::StateRootPosted;
use crate::instructions::StorageProverError;
use crate::state::{Config, StateRoot, STATE_ROOT_SEED};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct PostStateRootArgs {
    pub destination: u64,
    pub block: u64,
    pub root: Bytes32,
}

#[derive(Accounts)]
#[instruction(args: PostStateRootArgs)]
pub struct PostStateRoot<'info> {
    #[account(mut)]
    pub oracle: Signer<'info>,
    #[account(
        address = Config::pda().0 @ StorageProverError::InvalidConfig,
        constraint = config.root_oracle == oracle.key() @ StorageProverError::InvalidRootOracle,
    )]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(
        mut,
        address = StateRoot::pda(args.destination, args.block).0 @ StorageProverError::InvalidStateRoot,
    )]
    pub state_root: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

/// Stores the root of one destination block. A posted root is never replaced.
pub fn post_state_root(ctx: Context<PostStateRoot>, args: PostStateRootArgs) -> Result<()> {
    let PostStateRootArgs {
        destination,
        block,
        root,
    } = args;
    require!(
        ctx.accounts.state_root.data_is_empty(),
        StorageProverError::StateRootAlreadyPosted
    );

    let (_, bump) = StateRoot::pda(destination, block);
    let destination_bytes = destination.to_be_bytes();
    let block_bytes = block.to_be_bytes();
    let signer_seeds = [
        STATE_ROOT_SEED,
        destination_bytes.as_slice(),
        block_bytes.as_slice(),
        &[bump],
    ];

    StateRoot::new(destination, block, root).init(
        &ctx.accounts.state_root,
        &ctx.accounts.oracle,
        &ctx.accounts.system_program,
        &[&signer_seeds],
    )?;

    emit!(StateRootPosted::new(destination, block, root));

    Ok(())
}
