use anchor_lang::prelude::*;

declare_id!("52gVFYqekRiSUxWwCKPNKw9LhBsVxbZiLSnGVsTBGh5F");

pub mod events;
pub mod instructions;
pub mod state;
pub mod token;
pub mod types;

use instructions::*;

#[program]
pub mod portal {
    use super::*;

    pub fn publish(ctx: Context<Publish>, args: PublishArgs) -> Result<()> {
        publish_intent(ctx, args)
    }

    pub fn fund<'info>(ctx: Context<'_, '_, '_, 'info, Fund<'info>>, args: FundArgs) -> Result<()> {
        fund_intent(ctx, args)
    }

    pub fn fund_for<'info>(
        ctx: Context<'_, '_, '_, 'info, FundFor<'info>>,
        args: FundArgs,
    ) -> Result<()> {
        fund_intent_for(ctx, args)
    }

    pub fn publish_and_fund<'info>(
        ctx: Context<'_, '_, '_, 'info, Fund<'info>>,
        args: PublishAndFundArgs,
    ) -> Result<()> {
        publish_and_fund_intent(ctx, args)
    }

    pub fn refund<'info>(
        ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
        args: RefundArgs,
    ) -> Result<()> {
        refund_intent(ctx, args)
    }

    pub fn recover_token<'info>(
        ctx: Context<'_, '_, '_, 'info, RecoverToken<'info>>,
        args: RecoverTokenArgs,
    ) -> Result<()> {
        recover_intent_token(ctx, args)
    }

    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        args: WithdrawArgs,
    ) -> Result<()> {
        withdraw_intent(ctx, args)
    }

    pub fn batch_withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
        args: BatchWithdrawArgs,
    ) -> Result<()> {
        batch_withdraw_intents(ctx, args)
    }

    pub fn fulfill<'info>(
        ctx: Context<'_, '_, '_, 'info, Fulfill<'info>>,
        args: FulfillArgs,
    ) -> Result<()> {
        fulfill_intent(ctx, args)
    }

    pub fn fulfill_and_prove<'info>(
        ctx: Context<'_, '_, '_, 'info, FulfillAndProve<'info>>,
        args: FulfillAndProveArgs,
    ) -> Result<()> {
        fulfill_and_prove_intent(ctx, args)
    }

    pub fn prove<'info>(
        ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
        args: ProveArgs,
    ) -> Result<()> {
        prove_intent(ctx, args)
    }
}
