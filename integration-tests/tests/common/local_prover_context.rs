use anchor_lang::prelude::AccountMeta;
use anchor_lang::{InstructionData, ToAccountMetas};
use derive_more::{Deref, DerefMut};
use eco_svm_std::prover::{ChallengeArgs, IntentHashClaimant, ProveArgs};
use eco_svm_std::{event_authority_pda, Bytes32, Proof};
use local_prover::instructions::{EscrowArgs, FlashFulfillArgs, SecondaryIntent};
use local_prover::state::{escrow_pda, flash_vault_pda, FlashEscrow};
use portal::state::{executor_pda, vault_pda, FulfillMarker, Vault};
use portal::types::Intent;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

use crate::common::{split_route, Context, TransactionResult, COMPUTE_UNIT_LIMIT};

#[derive(Deref, DerefMut)]
pub struct LocalProver<'a>(&'a mut Context);

impl Context {
    pub fn local_prover(&mut self) -> LocalProver {
        LocalProver(self)
    }
}

impl LocalProver<'_> {
    pub fn prove(
        &mut self,
        portal_dispatcher: &Keypair,
        source: u64,
        intent_hashes_claimants: Vec<IntentHashClaimant>,
    ) -> TransactionResult {
        let proof_accounts = intent_hashes_claimants
            .iter()
            .map(|pair| AccountMeta::new(Proof::pda(&pair.intent_hash, &local_prover::ID).0, false))
            .collect::<Vec<_>>();
        let args = ProveArgs {
            source,
            intent_hashes_claimants,
            data: vec![],
        };
        let instruction = local_prover::instruction::Prove { args };
        let accounts = local_prover::accounts::Prove {
            portal_dispatcher: portal_dispatcher.pubkey(),
            payer: self.payer.pubkey(),
            system_program: anchor_lang::system_program::ID,
            event_authority: event_authority_pda(&local_prover::ID).0,
            program: local_prover::ID,
        }
        .to_account_metas(None)
        .into_iter()
        .chain(proof_accounts)
        .collect();
        let instruction = Instruction {
            program_id: local_prover::ID,
            accounts,
            data: instruction.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer, portal_dispatcher],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    /// Accounts the portal forwards to `prove` for `intent_hashes`, after the portal
    /// dispatcher it signs with.
    pub fn portal_prove_accounts(&self, intent_hashes: &[Bytes32]) -> Vec<AccountMeta> {
        let proof_accounts = intent_hashes
            .iter()
            .map(|intent_hash| AccountMeta::new(Proof::pda(intent_hash, &local_prover::ID).0, false));

        local_prover::accounts::Prove {
            portal_dispatcher: portal::state::dispatcher_pda().0,
            payer: self.payer.pubkey(),
            system_program: anchor_lang::system_program::ID,
            event_authority: event_authority_pda(&local_prover::ID).0,
            program: local_prover::ID,
        }
        .to_account_metas(None)
        .into_iter()
        .skip(1)
        .chain(proof_accounts)
        .collect()
    }

    pub fn challenge(&mut self, args: ChallengeArgs) -> TransactionResult {
        let proof = Proof::pda(&args.intent_hash(), &local_prover::ID).0;
        let instruction = local_prover::instruction::Challenge { args };
        let accounts = local_prover::accounts::Challenge {
            proof,
            payer: self.payer.pubkey(),
        };
        let instruction = Instruction {
            program_id: local_prover::ID,
            accounts: accounts.to_account_metas(None),
            data: instruction.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    pub fn proof_type(&mut self) -> TransactionResult {
        let instruction = Instruction {
            program_id: local_prover::ID,
            accounts: local_prover::accounts::GetProofType {}.to_account_metas(None),
            data: local_prover::instruction::ProofType {}.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    /// Flash fulfills `intent`, whose route spends only reward tokens. The leftover goes to
    /// `claimant`, or into the escrow when `secondary` is set.
    pub fn flash_fulfill(
        &mut self,
        intent: &Intent,
        claimant: Pubkey,
        secondary: Option<SecondaryIntent>,
    ) -> TransactionResult {
        let intent_hash = intent.hash();
        let vault = vault_pda(&intent_hash).0;
        let flash_vault = flash_vault_pda().0;
        let executor = executor_pda().0;
        let escrow = escrow_pda(&intent_hash).0;
        let leftover_recipient = match secondary {
            Some(_) => escrow,
            None => claimant,
        };
        let (fulfill_route, call_accounts) = split_route(&intent.route);

        let withdraw_accounts = intent.reward.tokens.iter().flat_map(|token| {
            [
                AccountMeta::new(self.ata(&vault, &token.token), false),
                AccountMeta::new(self.ata(&flash_vault, &token.token), false),
                AccountMeta::new_readonly(token.token, false),
            ]
        });
        let leftover_accounts = intent.reward.tokens.iter().flat_map(|token| {
            [
                AccountMeta::new(self.ata(&flash_vault, &token.token), false),
                AccountMeta::new(self.ata(&leftover_recipient, &token.token), false),
                AccountMeta::new_readonly(token.token, false),
            ]
        });
        let route_accounts = fulfill_route.tokens.iter().flat_map(|token| {
            [
                AccountMeta::new(self.ata(&flash_vault, &token.token), false),
                AccountMeta::new(self.ata(&executor, &token.token), false),
                AccountMeta::new_readonly(token.token, false),
            ]
        });
        let remaining_accounts: Vec<_> = withdraw_accounts
            .chain(leftover_accounts)
            .chain(route_accounts)
            .chain(call_accounts)
            .collect();

        let args = FlashFulfillArgs {
            intent: intent.clone(),
            claimant: claimant.into(),
            secondary,
        };
        let instruction = local_prover::instruction::FlashFulfill { args };
        let accounts: Vec<_> = local_prover::accounts::FlashFulfill {
            payer: self.payer.pubkey(),
            claimant,
            flash_vault,
            proof: Proof::pda(&intent_hash, &local_prover::ID).0,
            vault,
            vault_state: Vault::pda(&intent_hash).0,
            executor,
            fulfill_marker: FulfillMarker::pda(&intent_hash).0,
            escrow,
            escrow_state: FlashEscrow::pda(&intent_hash).0,
            portal_program: portal::ID,
            token_program: anchor_spl::token::ID,
            token_2022_program: anchor_spl::token_2022::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            system_program: anchor_lang::system_program::ID,
        }
        .to_account_metas(None)
        .into_iter()
        .chain(remaining_accounts)
        .collect();
        let instruction = Instruction {
            program_id: local_prover::ID,
            accounts,
            data: instruction.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(
                &[
                    ComputeBudgetInstruction::set_compute_unit_limit(COMPUTE_UNIT_LIMIT),
                    instruction,
                ],
                Some(&self.payer.pubkey()),
            ),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    pub fn release_escrow(
        &mut self,
        intent_hash: Bytes32,
        claimant: Pubkey,
        secondary_proof: Pubkey,
        tokens: &[Pubkey],
    ) -> TransactionResult {
        let escrow = escrow_pda(&intent_hash).0;
        let token_accounts: Vec<_> = tokens
            .iter()
            .flat_map(|mint| {
                [
                    AccountMeta::new(self.ata(&escrow, mint), false),
                    AccountMeta::new(self.ata(&claimant, mint), false),
                    AccountMeta::new_readonly(*mint, false),
                ]
            })
            .collect();
        let instruction = local_prover::instruction::ReleaseEscrow {
            args: EscrowArgs { intent_hash },
        };
        let accounts = local_prover::accounts::ReleaseEscrow {
            payer: self.payer.pubkey(),
            claimant,
            escrow,
            escrow_state: FlashEscrow::pda(&intent_hash).0,
            secondary_proof,
            token_program: anchor_spl::token::ID,
            token_2022_program: anchor_spl::token_2022::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            system_program: anchor_lang::system_program::ID,
        };

        self.send_escrow_instruction(instruction.data(), accounts.to_account_metas(None), token_accounts)
    }

    pub fn reclaim_escrow(
        &mut self,
        intent_hash: Bytes32,
        secondary_proof: Pubkey,
        tokens: &[Pubkey],
    ) -> TransactionResult {
        let escrow = escrow_pda(&intent_hash).0;
        let vault = vault_pda(&intent_hash).0;
        let token_accounts: Vec<_> = tokens
            .iter()
            .flat_map(|mint| {
                [
                    AccountMeta::new(self.ata(&escrow, mint), false),
                    AccountMeta::new(self.ata(&vault, mint), false),
                    AccountMeta::new_readonly(*mint, false),
                ]
            })
            .collect();
        let instruction = local_prover::instruction::ReclaimEscrow {
            args: EscrowArgs { intent_hash },
        };
        let accounts = local_prover::accounts::ReclaimEscrow {
            payer: self.payer.pubkey(),
            vault,
            escrow,
            escrow_state: FlashEscrow::pda(&intent_hash).0,
            secondary_proof,
            token_program: anchor_spl::token::ID,
            token_2022_program: anchor_spl::token_2022::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            system_program: anchor_lang::system_program::ID,
        };

        self.send_escrow_instruction(instruction.data(), accounts.to_account_metas(None), token_accounts)
    }

    fn send_escrow_instruction(
        &mut self,
        data: Vec<u8>,
        accounts: Vec<AccountMeta>,
        token_accounts: Vec<AccountMeta>,
    ) -> TransactionResult {
        let instruction = Instruction {
            program_id: local_prover::ID,
            accounts: accounts.into_iter().chain(token_accounts).collect(),
            data,
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(
                &[
                    ComputeBudgetInstruction::set_compute_unit_limit(COMPUTE_UNIT_LIMIT),
                    instruction,
                ],
                Some(&self.payer.pubkey()),
            ),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }
}
