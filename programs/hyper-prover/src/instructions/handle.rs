use anchor_lang::prelude::*;
use eco_svm_std::prover::{self, IntentAlreadyProven, IntentProven, Proof, ProofData};

use crate::hyperlane::process_authority_pda;
use crate::instructions::{domain_to_chain, HyperProverError};
use crate::state::{pda_payer_pda, Config, ProofAccount, PDA_PAYER_SEED};

/// The proof accounts of the carried intents follow as remaining accounts, in order.
#[event_cpi]
#[derive(Accounts)]
pub struct Handle<'info> {
    #[account(address = process_authority_pda().0 @ HyperProverError::InvalidProcessAuthority)]
    pub process_authority: Signer<'info>,
    #[account(address = Config::pda().0 @ HyperProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
    pub system_program: Program<'info, System>,
    /// CHECK: address is validated
    #[account(mut, address = pda_payer_pda().0 @ HyperProverError::InvalidPdaPayer)]
    pub pda_payer: UncheckedAccount<'info>,
}

/// Records the proofs carried by a message the mailbox delivered.
///
/// The message must come from a whitelisted prover, and the chain it was sent from must
/// be the destination the proofs claim. Intents that are already proven are skipped.
pub fn handle<'info>(
    ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
    origin: u32,
    sender: [u8; 32],
    payload: Vec<u8>,
) -> Result<()> {
    require!(
        ctx.accounts.config.is_whitelisted(&sender.into()),
        HyperProverError::InvalidSender
    );

    let ProofData {
        destination,
        intent_hashes_claimants,
    } = ProofData::from_bytes(&payload)?;
    require!(
        destination == domain_to_chain(origin),
        HyperProverError::InvalidOrigin
    );
    require!(
        intent_hashes_claimants.len() == ctx.remaining_accounts.len(),
        HyperProverError::InvalidProofAccounts
    );

    let (_, bump) = pda_payer_pda();
    let bump = [bump];
    let pda_payer_seeds: &[&[u8]] = &[PDA_PAYER_SEED, &bump];

    for (pair, proof_account) in intent_hashes_claimants
        .into_iter()
        .zip(ctx.remaining_accounts)
    {
        let claimant = pair.claimant.into();
        let recorded = prover::record_proof::<ProofAccount>(
            proof_account,
            &ctx.accounts.pda_payer,
            Some(pda_payer_seeds),
            &ctx.accounts.system_program,
            &pair.intent_hash,
            Proof::new(destination, claimant),
        )?;

        if recorded {
            emit_cpi!(IntentProven::new(pair.intent_hash, claimant, destination));
        } else {
            emit_cpi!(IntentAlreadyProven::new(pair.intent_hash));
        }
    }

    Ok(())
}
