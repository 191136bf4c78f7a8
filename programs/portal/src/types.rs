use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_spl::associated_token::{self, get_associated_token_address_with_program_id, AssociatedToken};
use anchor_spl::token::{self, Token};
use anchor_spl::token_2022::{self, Token2022};
use anchor_spl::token_interface::{transfer_checked, Mint, TokenAccount};
use eco_svm_std::{keccak, Bytes32, SerializableAccountMeta};
use itertools::Itertools;

pub use eco_svm_std::intent_hash;

use crate::instructions::PortalError;

pub const VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE: usize = 3;

pub struct VecTokenTransferAccounts<'info>(Vec<TokenTransferAccounts<'info>>);

impl<'info> TryFrom<&[AccountInfo<'info>]> for VecTokenTransferAccounts<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: &[AccountInfo<'info>]) -> Result<Self> {
        accounts
            .iter()
            .chunks(VEC_TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE)
            .into_iter()
            .map(|chunk| chunk.collect::<Vec<_>>().try_into())
            .collect::<Result<Vec<TokenTransferAccounts>>>()
            .map(Self)
    }
}

impl<'info> VecTokenTransferAccounts<'info> {
    pub fn into_inner(self) -> Vec<TokenTransferAccounts<'info>> {
        self.0
    }
}

pub struct TokenTransferAccounts<'info> {
    pub from: AccountInfo<'info>,
    pub to: AccountInfo<'info>,
    pub mint: AccountInfo<'info>,
}

impl<'info> TryFrom<Vec<&AccountInfo<'info>>> for TokenTransferAccounts<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: Vec<&AccountInfo<'info>>) -> Result<Self> {
        match accounts.as_slice() {
            [from, to, mint] => {
                // all three accounts belong to the mint's token program, `to` may not exist yet
                let token_program = mint.owner;
                require!(
                    from.data_is_empty() || token_program == from.owner,
                    PortalError::InvalidTokenTransferAccounts
                );
                require!(
                    to.data_is_empty() || token_program == to.owner,
                    PortalError::InvalidTokenTransferAccounts
                );

                Ok(Self {
                    from: from.to_account_info(),
                    to: to.to_account_info(),
                    mint: mint.to_account_info(),
                })
            }
            _ => Err(PortalError::InvalidTokenTransferAccounts.into()),
        }
    }
}

impl<'info> TokenTransferAccounts<'info> {
    pub fn transfer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        self.transfer_with_signer(token_program, authority, &[], amount)
    }

    pub fn transfer_with_signer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        amount: u64,
    ) -> Result<()> {
        match amount {
            0 => Ok(()),
            amount => transfer_checked(
                CpiContext::new_with_signer(
                    token_program.to_account_info(),
                    anchor_spl::token_interface::TransferChecked {
                        from: self.from.to_account_info(),
                        to: self.to.to_account_info(),
                        mint: self.mint.to_account_info(),
                        authority: authority.to_account_info(),
                    },
                    signer_seeds,
                ),
                amount,
                self.mint_data()?.decimals,
            ),
        }
    }

    pub fn token_program(
        &self,
        token_program: &Program<'info, Token>,
        token_2022_program: &Program<'info, Token2022>,
    ) -> Result<AccountInfo<'info>> {
        let token_program_id = self.token_program_id();

        if *token_program_id == token::ID {
            Ok(token_program.to_account_info())
        } else if *token_program_id == token_2022::ID {
            Ok(token_2022_program.to_account_info())
        } else {
            Err(PortalError::InvalidTokenProgram.into())
        }
    }

    /// Requires `to` to be the associated token account of `owner`, creating it when missing.
    pub fn init_to_ata(
        &self,
        payer: &AccountInfo<'info>,
        owner: &AccountInfo<'info>,
        token_program: &AccountInfo<'info>,
        associated_token_program: &Program<'info, AssociatedToken>,
        system_program: &Program<'info, System>,
    ) -> Result<()> {
        let ata = get_associated_token_address_with_program_id(
            owner.key,
            self.mint.key,
            self.token_program_id(),
        );
        require_keys_eq!(self.to.key(), ata, PortalError::InvalidAta);

        if !self.to.data_is_empty() {
            return Ok(());
        }

        associated_token::create(CpiContext::new(
            associated_token_program.to_account_info(),
            associated_token::Create {
                payer: payer.to_account_info(),
                associated_token: self.to.to_account_info(),
                authority: owner.to_account_info(),
                mint: self.mint.to_account_info(),
                system_program: system_program.to_account_info(),
                token_program: token_program.to_account_info(),
            },
        ))
    }

    pub fn token_program_id(&self) -> &Pubkey {
        self.mint.owner
    }

    pub fn mint_data(&self) -> Result<Mint> {
        Mint::try_deserialize(&mut &self.mint.try_borrow_data()?[..])
    }

    pub fn from_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.from.try_borrow_data()?[..])
    }

    pub fn to_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.to.try_borrow_data()?[..])
    }

    /// Balance of `from`, zero while the account does not exist.
    pub fn from_balance(&self) -> Result<u64> {
        token_balance(&self.from)
    }

    /// Balance of `to`, zero while the account does not exist.
    pub fn to_balance(&self) -> Result<u64> {
        token_balance(&self.to)
    }
}

fn token_balance(account: &AccountInfo<'_>) -> Result<u64> {
    if account.data_is_empty() {
        return Ok(0);
    }

    TokenAccount::try_deserialize(&mut &account.try_borrow_data()?[..]).map(|data| data.amount)
}

/// Represents minimal calldata that can fit within Solana's 1024-byte instruction limit.
/// This is provided as part of the fulfill instruction on the destination chain.
///
/// The source chain publishes the route with full [`CalldataWithAccounts`]; on the
/// destination chain only `Calldata` travels in the instruction and the accounts are
/// taken from the transaction to rebuild the hashed form.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Calldata {
    pub data: Vec<u8>,
    pub account_count: u8,
}

/// Complete calldata including both instruction data and account metadata, as hashed
/// into the route.
#[derive(AnchorSerialize, AnchorDeserialize, Debug)]
pub struct CalldataWithAccounts {
    pub calldata: Calldata,
    pub accounts: Vec<SerializableAccountMeta>,
}

impl CalldataWithAccounts {
    pub fn new<T>(calldata: Calldata, accounts: Vec<T>) -> Result<Self>
    where
        T: Into<SerializableAccountMeta>,
    {
        require!(
            accounts.len() == calldata.account_count as usize,
            PortalError::InvalidCalldata,
        );

        Ok(Self {
            calldata,
            accounts: accounts.into_iter().map(Into::into).collect(),
        })
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Intent {
    /// Chain the intent is published and funded on; checked at publish, not hashed.
    pub source: u64,
    pub destination: u64,
    pub route: Route,
    pub reward: Reward,
}

impl Intent {
    pub fn hash(&self) -> Bytes32 {
        intent_hash(self.destination, &self.route.hash(), &self.reward.hash())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub salt: Bytes32,
    pub deadline: u64,
    pub portal: Bytes32,
    pub native_amount: u64,
    pub tokens: Vec<TokenAmount>,
    pub calls: Vec<Call>,
}

impl Route {
    pub fn hash(&self) -> Bytes32 {
        let encoded = self.try_to_vec().expect("Failed to serialize Route");

        keccak([encoded.as_slice()])
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        token_amounts(&self.tokens)
    }

    /// The route as `fulfill` takes it, each call carrying only its [`Calldata`].
    pub fn to_fulfill_route(&self) -> Result<Self> {
        let mut route = self.clone();
        route.calls.iter_mut().try_for_each(|call| {
            let CalldataWithAccounts { calldata, .. } =
                CalldataWithAccounts::try_from_slice(&call.data)
                    .map_err(|_| PortalError::InvalidCalldata)?;
            call.data = calldata.try_to_vec()?;

            Ok::<_, Error>(())
        })?;

        Ok(route)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    pub deadline: u64,
    pub creator: Pubkey,
    pub prover: Pubkey,
    pub native_amount: u64,
    pub tokens: Vec<TokenAmount>,
}

impl Reward {
    pub fn hash(&self) -> Bytes32 {
        let encoded = self.try_to_vec().expect("Failed to serialize Reward");

        keccak([encoded.as_slice()])
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        token_amounts(&self.tokens)
    }
}

fn token_amounts(tokens: &[TokenAmount]) -> Result<BTreeMap<Pubkey, u64>> {
    tokens
        .iter()
        .try_fold(BTreeMap::<Pubkey, u64>::new(), |mut result, token| {
            let entry = result.entry(token.token).or_default();
            *entry = entry
                .checked_add(token.amount)
                .ok_or(PortalError::TokenAmountOverflow)?;

            Ok(result)
        })
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Pubkey,
    pub amount: u64,
}

/// A call the executor performs on the destination chain. `data` is the borsh encoded
/// [`CalldataWithAccounts`] when hashed and the bare [`Calldata`] when fulfilling.
/// Calls to accounts without code carry no data and move `value` lamports.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub target: Bytes32,
    pub data: Vec<u8>,
    pub value: u64,
}
