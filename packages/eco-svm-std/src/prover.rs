use anchor_lang::prelude::*;
use derive_new::new;

use crate::account::AccountExt;
use crate::{intent_hash, Bytes32};

pub const PROOF_SEED: &[u8] = b"proof";
pub const PROVE_DISCRIMINATOR: [u8; 8] = [52, 246, 26, 161, 211, 170, 86, 215];
pub const INTENT_HASH_CLAIMANT_SIZE: usize = 64;

pub const LOCAL_PROVER_ID: Pubkey = pubkey!("34pNy1Kn6VzTrEK8fg1z24fknE8r1EYncASV7wQh1x6j");
pub const HYPER_PROVER_ID: Pubkey = pubkey!("B4pMQaAGPZ7Mza9XnDxJfXZ1cUa4aa67zrNkv8zYAjx4");
pub const STORAGE_PROVER_ID: Pubkey = pubkey!("2GNnsZMw9rR2Hv6X2kG26GcnwvC71GoJkhJEf51Vziox");

#[error_code(offset = 8000)]
pub enum ProverError {
    InvalidProofData,
    InvalidProofAccount,
}

pub fn is_prover(program_id: &Pubkey) -> bool {
    [LOCAL_PROVER_ID, HYPER_PROVER_ID, STORAGE_PROVER_ID].contains(program_id)
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default, new, Debug, PartialEq, Eq)]
pub struct Proof {
    pub destination: u64,
    pub claimant: Pubkey,
}

impl Proof {
    pub fn pda(intent_hash: &Bytes32, prover: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[PROOF_SEED, intent_hash.as_ref()], prover)
    }

    /// Reads the proof `prover` recorded in `account`, skipping the account discriminator.
    /// Accounts the prover does not own hold no proof.
    pub fn read(account: &AccountInfo<'_>, prover: &Pubkey) -> Result<Option<Self>> {
        if account.owner != prover {
            return Ok(None);
        }

        account
            .try_borrow_data()?
            .get(8..)
            .map(Self::try_from_slice)
            .transpose()
            .map_err(|_| ProverError::InvalidProofAccount.into())
    }

    pub fn is_proven(&self) -> bool {
        self.claimant != Pubkey::default()
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, new, Debug, PartialEq, Eq)]
pub struct IntentHashClaimant {
    pub intent_hash: Bytes32,
    pub claimant: Bytes32,
}

/// Proof payload relayed from the destination chain: the destination chain id followed
/// by `(intent_hash, claimant)` pairs, 64 bytes each.
#[derive(Clone, new, Debug, PartialEq, Eq)]
pub struct ProofData {
    pub destination: u64,
    pub intent_hashes_claimants: Vec<IntentHashClaimant>,
}

impl ProofData {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.intent_hashes_claimants.iter().fold(
            self.destination.to_be_bytes().to_vec(),
            |mut bytes, pair| {
                bytes.extend_from_slice(pair.intent_hash.as_ref());
                bytes.extend_from_slice(pair.claimant.as_ref());
                bytes
            },
        )
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        require!(
            bytes.len() >= 8 && (bytes.len() - 8) % INTENT_HASH_CLAIMANT_SIZE == 0,
            ProverError::InvalidProofData
        );

        let (destination, pairs) = bytes.split_at(8);
        let destination = u64::from_be_bytes(
            destination
                .try_into()
                .map_err(|_| ProverError::InvalidProofData)?,
        );
        let intent_hashes_claimants = pairs
            .chunks_exact(INTENT_HASH_CLAIMANT_SIZE)
            .map(|pair| {
                let (intent_hash, claimant) = pair.split_at(32);

                Ok(IntentHashClaimant::new(
                    bytes32(intent_hash)?,
                    bytes32(claimant)?,
                ))
            })
            .collect::<Result<_>>()?;

        Ok(Self::new(destination, intent_hashes_claimants))
    }
}

fn bytes32(bytes: &[u8]) -> Result<Bytes32> {
    <[u8; 32]>::try_from(bytes)
        .map(Into::into)
        .map_err(|_| ProverError::InvalidProofData.into())
}

/// Arguments the portal passes to a prover's `prove` instruction, signed by the portal
/// dispatcher.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, new, Debug)]
pub struct ProveArgs {
    pub source: u64,
    pub intent_hashes_claimants: Vec<IntentHashClaimant>,
    pub data: Vec<u8>,
}

/// Identifies an intent by its declared destination, so a proof recorded for another
/// destination can be told apart.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, new, Debug)]
pub struct ChallengeArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward_hash: Bytes32,
}

impl ChallengeArgs {
    pub fn intent_hash(&self) -> Bytes32 {
        intent_hash(self.destination, &self.route_hash, &self.reward_hash)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeKind {
    Hyperlane,
}

/// How a prover learns about fulfillments, returned by every prover's `proof_type`
/// instruction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofType {
    Storage,
    Local,
    Bridge(BridgeKind),
}

/// Records `proof` for `intent_hash` in `proof_account` unless a proof is already there.
/// Returns whether it was recorded, so the caller can emit [`IntentProven`] or
/// [`IntentAlreadyProven`]. `payer_seeds` sign for a PDA payer.
pub fn record_proof<'info, A>(
    proof_account: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    payer_seeds: Option<&[&[u8]]>,
    system_program: &Program<'info, System>,
    intent_hash: &Bytes32,
    proof: Proof,
) -> Result<bool>
where
    A: AccountExt + From<Proof>,
{
    let prover = A::owner();
    let (pda, bump) = Proof::pda(intent_hash, &prover);
    require_keys_eq!(proof_account.key(), pda, ProverError::InvalidProofAccount);

    if Proof::read(proof_account, &prover)?.is_some() {
        return Ok(false);
    }

    let bump = [bump];
    let proof_seeds: &[&[u8]] = &[PROOF_SEED, intent_hash.as_ref(), &bump];
    let signer_seeds: Vec<&[&[u8]]> = payer_seeds.into_iter().chain([proof_seeds]).collect();

    A::from(proof).init(proof_account, payer, system_program, &signer_seeds)?;

    Ok(true)
}

/// Closes the proof of the intent when it names a destination other than the intent's
/// own, sending the rent to `rent_recipient`. Returns whether a proof was removed.
pub fn challenge_proof<'info, A>(
    proof_account: &AccountInfo<'info>,
    rent_recipient: &AccountInfo<'info>,
    args: &ChallengeArgs,
) -> Result<bool>
where
    A: AccountExt,
{
    let prover = A::owner();
    require_keys_eq!(
        proof_account.key(),
        Proof::pda(&args.intent_hash(), &prover).0,
        ProverError::InvalidProofAccount
    );

    match Proof::read(proof_account, &prover)? {
        Some(proof) if proof.destination != args.destination => {
            A::close(proof_account, rent_recipient)?;

            Ok(true)
        }
        _ => Ok(false),
    }
}

#[event]
#[derive(new)]
pub struct IntentProven {
    intent_hash: Bytes32,
    claimant: Pubkey,
    destination: u64,
}

#[event]
#[derive(new)]
pub struct IntentAlreadyProven {
    intent_hash: Bytes32,
}

#[event]
#[derive(new)]
pub struct IntentProofChallenged {
    intent_hash: Bytes32,
}
