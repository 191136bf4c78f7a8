use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use eco_svm_std::prover::{BridgeKind, ProofType};

pub const PROOF_TYPE: ProofType = ProofType::Bridge(BridgeKind::Hyperlane);

#[derive(Accounts)]
pub struct GetProofType {}

pub fn proof_type(_ctx: Context<GetProofType>) -> Result<()> {
    set_return_data(&PROOF_TYPE.try_to_vec()?);

    Ok(())
}
