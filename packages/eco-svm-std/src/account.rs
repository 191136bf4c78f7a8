use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;

pub trait AccountExt: AccountSerialize + AccountDeserialize + Owner + Space {
    fn init<'info>(
        self,
        account: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let program_id = Self::owner();
        let data_len = 8 + Self::INIT_SPACE;
        let min_balance = Rent::get()?.minimum_balance(data_len);

        require!(
            account.data_is_empty() && *account.owner != program_id,
            anchor_lang::error::ErrorCode::ConstraintZero
        );

        match account.lamports() {
            0 => {
                invoke_signed(
                    &system_instruction::create_account(
                        &payer.key(),
                        &account.key(),
                        min_balance,
                        data_len as u64,
                        &program_id,
                    ),
                    &[
                        payer.to_account_info(),
                        account.to_account_info(),
                        system_program.to_account_info(),
                    ],
                    signer_seeds,
                )?;
            }
            balance => {
                if let Some(amount) = min_balance
                    .checked_sub(balance)
                    .filter(|amount| *amount > 0)
                {
                    invoke_signed(
                        &system_instruction::transfer(&payer.key(), &account.key(), amount),
                        &[
                            payer.to_account_info(),
                            account.to_account_info(),
                            system_program.to_account_info(),
                        ],
                        signer_seeds,
                    )?;
                }

                invoke_signed(
                    &system_instruction::allocate(&account.key(), data_len as u64),
                    &[account.to_account_info(), system_program.to_account_info()],
                    signer_seeds,
                )?;
                invoke_signed(
                    &system_instruction::assign(&account.key(), &program_id),
                    &[account.to_account_info(), system_program.to_account_info()],
                    signer_seeds,
                )?;
            }
        }

        self.try_serialize(&mut &mut account.try_borrow_mut_data()?[..])?;

        Ok(())
    }

    /// Deserializes the account, `None` while it holds no data.
    fn load(account: &AccountInfo<'_>) -> Result<Option<Self>> {
        if account.data_is_empty() {
            return Ok(None);
        }

        require_keys_eq!(
            *account.owner,
            Self::owner(),
            anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram
        );

        Self::try_deserialize(&mut &account.try_borrow_data()?[..]).map(Some)
    }

    fn save(&self, account: &AccountInfo<'_>) -> Result<()> {
        self.try_serialize(&mut &mut account.try_borrow_mut_data()?[..])
    }

    /// Hands the account's rent to `destination` and returns it to the system program.
    fn close<'info>(account: &AccountInfo<'info>, destination: &AccountInfo<'info>) -> Result<()> {
        let lamports = destination
            .lamports()
            .checked_add(account.lamports())
            .ok_or(ProgramError::ArithmeticOverflow)?;

        **destination.try_borrow_mut_lamports()? = lamports;
        **account.try_borrow_mut_lamports()? = 0;

        account.assign(&anchor_lang::system_program::ID);
        account.realloc(0, false).map_err(Into::into)
    }
}
