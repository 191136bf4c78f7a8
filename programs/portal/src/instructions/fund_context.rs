use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_lang::system_program;
use anchor_spl::{associated_token, token, token_2022};

use crate::instructions::{Fulfill, FulfillAndProve, Fund, FundFor, PortalError};
use crate::types::{TokenTransferAccounts, VecTokenTransferAccounts};

/// Tops `fundee` up to the requested amounts, never moving more than the funder can
/// actually provide. Completion is judged on the fundee's balances afterwards.
pub struct FundTokenContext<'a, 'info> {
    pub payer: AccountInfo<'info>,
    /// Owns the token accounts the tokens come from.
    pub funder: AccountInfo<'info>,
    /// Signs the token transfers: the funder itself, or the vault as its delegate.
    pub authority: AccountInfo<'info>,
    pub authority_seeds: Option<&'a [&'a [u8]]>,
    pub native_source: AccountInfo<'info>,
    pub fundee: AccountInfo<'info>,
    pub token_program: &'a Program<'info, token::Token>,
    pub token_2022_program: &'a Program<'info, token_2022::Token2022>,
    pub associated_token_program: &'a Program<'info, associated_token::AssociatedToken>,
    pub system_program: &'a Program<'info, System>,
}

impl<'a, 'info> From<&'a Context<'_, '_, '_, 'info, Fund<'info>>> for FundTokenContext<'a, 'info> {
    fn from(ctx: &'a Context<'_, '_, '_, 'info, Fund<'info>>) -> Self {
        Self {
            payer: ctx.accounts.payer.to_account_info(),
            funder: ctx.accounts.funder.to_account_info(),
            authority: ctx.accounts.funder.to_account_info(),
            authority_seeds: None,
            native_source: ctx.accounts.funder.to_account_info(),
            fundee: ctx.accounts.vault.to_account_info(),
            token_program: &ctx.accounts.token_program,
            token_2022_program: &ctx.accounts.token_2022_program,
            associated_token_program: &ctx.accounts.associated_token_program,
            system_program: &ctx.accounts.system_program,
        }
    }
}

impl<'a, 'info> FundTokenContext<'a, 'info> {
    /// Funding on behalf of `funder`, whose token accounts delegated to the vault.
    pub fn delegated(
        ctx: &'a Context<'_, '_, '_, 'info, FundFor<'info>>,
        vault_seeds: &'a [&'a [u8]],
    ) -> Self {
        Self {
            payer: ctx.accounts.payer.to_account_info(),
            funder: ctx.accounts.funder.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
            authority_seeds: Some(vault_seeds),
            native_source: ctx.accounts.payer.to_account_info(),
            fundee: ctx.accounts.vault.to_account_info(),
            token_program: &ctx.accounts.token_program,
            token_2022_program: &ctx.accounts.token_2022_program,
            associated_token_program: &ctx.accounts.associated_token_program,
            system_program: &ctx.accounts.system_program,
        }
    }
}

impl<'a, 'info> From<&'a Context<'_, '_, '_, 'info, Fulfill<'info>>>
    for FundTokenContext<'a, 'info>
{
    fn from(ctx: &'a Context<'_, '_, '_, 'info, Fulfill<'info>>) -> Self {
        Self {
            payer: ctx.accounts.payer.to_account_info(),
            funder: ctx.accounts.solver.to_account_info(),
            authority: ctx.accounts.solver.to_account_info(),
            authority_seeds: None,
            native_source: ctx.accounts.solver.to_account_info(),
            fundee: ctx.accounts.executor.to_account_info(),
            token_program: &ctx.accounts.token_program,
            token_2022_program: &ctx.accounts.token_2022_program,
            associated_token_program: &ctx.accounts.associated_token_program,
            system_program: &ctx.accounts.system_program,
        }
    }
}

impl<'a, 'info> From<&'a Context<'_, '_, '_, 'info, FulfillAndProve<'info>>>
    for FundTokenContext<'a, 'info>
{
    fn from(ctx: &'a Context<'_, '_, '_, 'info, FulfillAndProve<'info>>) -> Self {
        Self {
            payer: ctx.accounts.payer.to_account_info(),
            funder: ctx.accounts.solver.to_account_info(),
            authority: ctx.accounts.solver.to_account_info(),
            authority_seeds: None,
            native_source: ctx.accounts.solver.to_account_info(),
            fundee: ctx.accounts.executor.to_account_info(),
            token_program: &ctx.accounts.token_program,
            token_2022_program: &ctx.accounts.token_2022_program,
            associated_token_program: &ctx.accounts.associated_token_program,
            system_program: &ctx.accounts.system_program,
        }
    }
}

impl<'info> FundTokenContext<'_, 'info> {
    pub fn fund_native(&self, amount: u64) -> Result<bool> {
        amount
            .checked_sub(self.fundee.lamports())
            .map(|missing| missing.min(self.native_source.lamports()))
            .filter(|&missing| missing > 0)
            .map(|missing| {
                system_program::transfer(
                    CpiContext::new(
                        self.system_program.to_account_info(),
                        system_program::Transfer {
                            from: self.native_source.to_account_info(),
                            to: self.fundee.to_account_info(),
                        },
                    ),
                    missing,
                )
            })
            .transpose()
            .map(|_| self.fundee.lamports() >= amount)
    }

    /// Returns the mints whose required amount the fundee now holds in full.
    pub fn fund_tokens(
        &self,
        accounts: VecTokenTransferAccounts<'info>,
        token_amounts: &BTreeMap<Pubkey, u64>,
    ) -> Result<BTreeSet<Pubkey>> {
        accounts
            .into_inner()
            .into_iter()
            .map(|accounts| self.fund_token(accounts, token_amounts))
            .filter_map(|result| match result {
                Ok(Some(mint_key)) => Some(Ok(mint_key)),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            })
            .collect()
    }

    fn fund_token(
        &self,
        accounts: TokenTransferAccounts<'info>,
        token_amounts: &BTreeMap<Pubkey, u64>,
    ) -> Result<Option<Pubkey>> {
        let token_program = accounts.token_program(self.token_program, self.token_2022_program)?;
        let token_amount = *token_amounts
            .get(accounts.mint.key)
            .ok_or(PortalError::InvalidMint)?;
        accounts.init_to_ata(
            &self.payer,
            &self.fundee,
            &token_program,
            self.associated_token_program,
            self.system_program,
        )?;

        let spendable = self.spendable(&accounts)?;
        token_amount
            .checked_sub(accounts.to_balance()?)
            .map(|amount| amount.min(spendable))
            .filter(|&amount| amount > 0)
            .map(|amount| {
                accounts.transfer_with_signer(
                    &token_program,
                    &self.authority,
                    self.authority_seeds.as_slice(),
                    amount,
                )
            })
            .transpose()?;

        if accounts.to_balance()? >= token_amount {
            Ok(Some(accounts.mint.key()))
        } else {
            Ok(None)
        }
    }

    /// What the authority may move out of the funder's account: the balance, capped by
    /// the allowance when the authority is a delegate.
    fn spendable(&self, accounts: &TokenTransferAccounts<'info>) -> Result<u64> {
        if accounts.from.data_is_empty() {
            return Ok(0);
        }

        let from_data = accounts.from_data()?;
        require_keys_eq!(
            from_data.owner,
            self.funder.key(),
            PortalError::InvalidFunderToken
        );

        if self.authority.key() == self.funder.key() {
            return Ok(from_data.amount);
        }

        match from_data.delegate {
            COption::Some(delegate) if delegate == self.authority.key() => {
                Ok(from_data.amount.min(from_data.delegated_amount))
            }
            _ => Ok(0),
        }
    }
}
