use anchor_lang::prelude::AccountMeta;
use anchor_lang::{InstructionData, ToAccountMetas};
use derive_more::{Deref, DerefMut};
use eco_svm_std::prover::{ChallengeArgs, IntentHashClaimant, ProofData, ProveArgs};
use eco_svm_std::Bytes32;
use hyper_prover::hyperlane;
use hyper_prover::instructions::InitArgs;
use hyper_prover::state::{dispatcher_pda, pda_payer_pda, Config};
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

use crate::common::{Context, TransactionResult, COMPUTE_UNIT_LIMIT};

#[derive(Deref, DerefMut)]
pub struct HyperProver<'a>(&'a mut Context);

impl Context {
    pub fn hyper_prover(&mut self) -> HyperProver {
        HyperProver(self)
    }
}

impl HyperProver<'_> {
    pub fn init(&mut self, whitelisted_senders: Vec<Bytes32>) -> TransactionResult {
        let instruction = hyper_prover::instruction::Init {
            args: InitArgs {
                whitelisted_senders,
            },
        };
        let accounts = hyper_prover::accounts::Init {
            config: Config::pda().0,
            payer: self.payer.pubkey(),
            system_program: anchor_lang::system_program::ID,
        };
        let instruction = Instruction {
            program_id: hyper_prover::ID,
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

    /// Whitelists this prover's own dispatcher, so messages it sends through the mailbox
    /// come back to it.
    pub fn init_loopback(&mut self) -> TransactionResult {
        self.init(vec![dispatcher_pda().0.into()])
    }

    pub fn prove(
        &mut self,
        portal_dispatcher: &Keypair,
        source: u64,
        intent_hashes_claimants: Vec<IntentHashClaimant>,
        data: Vec<u8>,
        unique_message: &Keypair,
    ) -> TransactionResult {
        let args = ProveArgs {
            source,
            intent_hashes_claimants,
            data,
        };
        let instruction = hyper_prover::instruction::Prove { args };
        let accounts = self.prove_account_metas(&portal_dispatcher.pubkey(), &unique_message.pubkey());
        let instruction = Instruction {
            program_id: hyper_prover::ID,
            accounts,
            data: instruction.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer, portal_dispatcher, unique_message],
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

    pub fn prove_account_metas(
        &self,
        portal_dispatcher: &Pubkey,
        unique_message: &Pubkey,
    ) -> Vec<AccountMeta> {
        hyper_prover::accounts::Prove {
            portal_dispatcher: *portal_dispatcher,
            dispatcher: dispatcher_pda().0,
            payer: self.payer.pubkey(),
            outbox_pda: mock_mailbox::outbox_pda().0,
            spl_noop_program: spl_noop::ID,
            unique_message: *unique_message,
            dispatched_message_pda: mock_mailbox::dispatched_message_pda(unique_message).0,
            system_program: anchor_lang::system_program::ID,
            mailbox_program: hyperlane::MAILBOX_ID,
        }
        .to_account_metas(None)
    }

    /// Accounts the portal forwards to `prove`, after the portal dispatcher it signs with.
    pub fn portal_prove_accounts(&self, unique_message: &Pubkey) -> Vec<AccountMeta> {
        self.prove_account_metas(&portal::state::dispatcher_pda().0, unique_message)
            .into_iter()
            .skip(1)
            .collect()
    }

    /// Calls `handle` directly, with `process_authority` signing in place of the mailbox.
    pub fn handle(
        &mut self,
        process_authority: &Keypair,
        sender: Bytes32,
        proof_data: &ProofData,
    ) -> TransactionResult {
        let accounts = std::iter::once(AccountMeta::new_readonly(process_authority.pubkey(), true))
            .chain(self.handle_accounts(proof_data))
            .collect();
        let instruction = Instruction {
            program_id: hyper_prover::ID,
            accounts,
            data: hyper_prover::instruction::Handle {
                origin: eco_svm_std::CHAIN_ID as u32,
                sender: sender.into(),
                payload: proof_data.to_bytes(),
            }
            .data(),
        };
        let transaction = Transaction::new(
            &[&self.payer, process_authority],
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

    pub fn handle_accounts(&self, proof_data: &ProofData) -> Vec<AccountMeta> {
        hyper_prover::instructions::handle_accounts(proof_data)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub fn challenge(&mut self, args: ChallengeArgs) -> TransactionResult {
        let proof = eco_svm_std::Proof::pda(&args.intent_hash(), &hyper_prover::ID).0;
        let instruction = hyper_prover::instruction::Challenge { args };
        let accounts = hyper_prover::accounts::Challenge {
            proof,
            pda_payer: pda_payer_pda().0,
        };
        let instruction = Instruction {
            program_id: hyper_prover::ID,
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

    pub fn handle_account_metas(&mut self, proof_data: &ProofData) -> TransactionResult {
        let (handle_account_metas, _) = Pubkey::find_program_address(
            &[b"hyperlane_message_recipient", b"-", b"handle", b"-", b"account_metas"],
            &hyper_prover::ID,
        );
        let instruction = Instruction {
            program_id: hyper_prover::ID,
            accounts: hyper_prover::accounts::HandleAccountMetas {
                handle_account_metas,
            }
            .to_account_metas(None),
            data: hyper_prover::instruction::HandleAccountMetas {
                origin: eco_svm_std::CHAIN_ID as u32,
                sender: dispatcher_pda().0.to_bytes(),
                payload: proof_data.to_bytes(),
            }
            .data(),
        };

        self.send_view(instruction)
    }

    pub fn ism(&mut self) -> TransactionResult {
        let instruction = Instruction {
            program_id: hyper_prover::ID,
            accounts: hyper_prover::accounts::Ism {}.to_account_metas(None),
            data: hyper_prover::instruction::Ism {}.data(),
        };

        self.send_view(instruction)
    }

    pub fn ism_account_metas(&mut self) -> TransactionResult {
        let (ism_account_metas, _) = Pubkey::find_program_address(
            &[
                b"hyperlane_message_recipient",
                b"-",
                b"interchain_security_module",
                b"-",
                b"account_metas",
            ],
            &hyper_prover::ID,
        );
        let instruction = Instruction {
            program_id: hyper_prover::ID,
            accounts: hyper_prover::accounts::IsmAccountMetas { ism_account_metas }
                .to_account_metas(None),
            data: hyper_prover::instruction::IsmAccountMetas {}.data(),
        };

        self.send_view(instruction)
    }

    pub fn proof_type(&mut self) -> TransactionResult {
        let instruction = Instruction {
            program_id: hyper_prover::ID,
            accounts: hyper_prover::accounts::GetProofType {}.to_account_metas(None),
            data: hyper_prover::instruction::ProofType {}.data(),
        };

        self.send_view(instruction)
    }

    /// Sends an instruction that only sets return data.
    fn send_view(&mut self, instruction: Instruction) -> TransactionResult {
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }
}
