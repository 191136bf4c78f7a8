use anchor_lang::prelude::*;
use derive_new::new;
use eco_svm_std::account::AccountExt;
use eco_svm_std::Bytes32;

pub const VAULT_SEED: &[u8] = b"vault";
pub const VAULT_STATE_SEED: &[u8] = b"vault_state";
pub const FULFILL_MARKER_SEED: &[u8] = b"fulfill_marker";
pub const EXECUTOR_SEED: &[u8] = b"executor";
pub const DISPATCHER_SEED: &[u8] = b"dispatcher";

/// Escrow address of an intent, computable before anything is deployed there. It holds
/// the reward lamports and owns the reward token accounts.
pub fn vault_pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, intent_hash.as_ref()], &crate::ID)
}

pub fn executor_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[EXECUTOR_SEED], &crate::ID)
}

pub fn dispatcher_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISPATCHER_SEED], &crate::ID)
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VaultStatus {
    #[default]
    Initial,
    PartiallyFunded,
    Funded,
    Withdrawn,
    Refunded,
}

impl VaultStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Withdrawn | Self::Refunded)
    }
}

/// Resolution state of an intent's escrow, kept beside the [`vault_pda`] so the vault
/// itself stays a plain lamport holder.
#[account]
#[derive(InitSpace, Debug, Default, PartialEq, Eq)]
pub struct Vault {
    pub status: VaultStatus,
    /// Last funder while funding, claimant once withdrawn, creator once refunded.
    pub target: Pubkey,
}

impl AccountExt for Vault {}

impl Vault {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[VAULT_STATE_SEED, intent_hash.as_ref()], &crate::ID)
    }

    /// State stored in `account`, `Initial` before the vault was first touched.
    pub fn fetch(account: &AccountInfo<'_>) -> Result<Self> {
        Self::load(account).map(Option::unwrap_or_default)
    }

    pub fn store<'info>(
        &self,
        account: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        intent_hash: &Bytes32,
    ) -> Result<()> {
        if !account.data_is_empty() {
            return self.save(account);
        }

        let (_, bump) = Self::pda(intent_hash);
        self.clone().init(
            account,
            payer,
            system_program,
            &[&[VAULT_STATE_SEED, intent_hash.as_ref(), &[bump]]],
        )
    }
}

#[account]
#[derive(InitSpace, Debug, new)]
pub struct FulfillMarker {
    pub claimant: Bytes32,
    pub bump: u8,
}

impl AccountExt for FulfillMarker {}

impl FulfillMarker {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[FULFILL_MARKER_SEED, intent_hash.as_ref()], &crate::ID)
    }
}
