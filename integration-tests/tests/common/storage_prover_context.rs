use anchor_lang::{InstructionData, ToAccountMetas};
use derive_more::{Deref, DerefMut};
use eco_svm_std::merkle::MerkleProof;
use eco_svm_std::prover::{ChallengeArgs, IntentHashClaimant, ProveArgs};
use eco_svm_std::{event_authority_pda, Bytes32, Proof};
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use storage_prover::instructions::{InitArgs, PostStateRootArgs, ProveStorageArgs};
use storage_prover::state::{Config, StateRoot};

use crate::common::{Context, TransactionResult};

#[derive(Deref, DerefMut)]
pub struct StorageProver<'a>(&'a mut Context);

impl Context {
    pub fn storage_prover(&mut self) -> StorageProver {
        StorageProver(self)
    }
}

impl StorageProver<'_> {
    /// Makes the context's root oracle the only poster of state roots.
    pub fn init(&mut self) -> TransactionResult {
        let args = InitArgs {
            root_oracle: self.root_oracle.pubkey(),
        };
        let accounts = storage_prover::accounts::Init {
            config: Config::pda().0,
            payer: self.payer.pubkey(),
            system_program: anchor_lang::system_program::ID,
        };
        let instruction = Instruction {
            program_id: storage_prover::ID,
            accounts: accounts.to_account_metas(None),
            data: storage_prover::instruction::Init { args }.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    pub fn post_state_root(
        &mut self,
        oracle: &Keypair,
        destination: u64,
        block: u64,
        root: Bytes32,
    ) -> TransactionResult {
        let args = PostStateRootArgs {
            destination,
            block,
            root,
        };
        let accounts = storage_prover::accounts::PostStateRoot {
            oracle: oracle.pubkey(),
            config: Config::pda().0,
            state_root: StateRoot::pda(destination, block).0,
            system_program: anchor_lang::system_program::ID,
        };
        let instruction = Instruction {
            program_id: storage_prover::ID,
            accounts: accounts.to_account_metas(None),
            data: storage_prover::instruction::PostStateRoot { args }.data(),
        };
        let transaction = Transaction::new(
            &[oracle],
            Message::new(&[instruction], Some(&oracle.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    pub fn prove_storage(
        &mut self,
        destination: u64,
        block: u64,
        intent_hash: Bytes32,
        claimant: Bytes32,
        merkle_proof: MerkleProof,
    ) -> TransactionResult {
        let accounts = storage_prover::accounts::ProveStorage {
            payer: self.payer.pubkey(),
            state_root: StateRoot::pda(destination, block).0,
            proof: Proof::pda(&intent_hash, &storage_prover::ID).0,
            system_program: anchor_lang::system_program::ID,
            event_authority: event_authority_pda(&storage_prover::ID).0,
            program: storage_prover::ID,
        };
        let args = ProveStorageArgs {
            destination,
            block,
            intent_hash,
            claimant,
            merkle_proof,
        };
        let instruction = Instruction {
            program_id: storage_prover::ID,
            accounts: accounts.to_account_metas(None),
            data: storage_prover::instruction::ProveStorage { args }.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    pub fn prove(
        &mut self,
        portal_dispatcher: &Keypair,
        source: u64,
        intent_hashes_claimants: Vec<IntentHashClaimant>,
    ) -> TransactionResult {
        let args = ProveArgs {
            source,
            intent_hashes_claimants,
            data: vec![],
        };
        let accounts = storage_prover::accounts::Prove {
            portal_dispatcher: portal_dispatcher.pubkey(),
        };
        let instruction = Instruction {
            program_id: storage_prover::ID,
            accounts: accounts.to_account_metas(None),
            data: storage_prover::instruction::Prove { args }.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer, portal_dispatcher],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    pub fn challenge(&mut self, args: ChallengeArgs) -> TransactionResult {
        let accounts = storage_prover::accounts::Challenge {
            proof: Proof::pda(&args.intent_hash(), &storage_prover::ID).0,
            payer: self.payer.pubkey(),
        };
        let instruction = Instruction {
            program_id: storage_prover::ID,
            accounts: accounts.to_account_metas(None),
            data: storage_prover::instruction::Challenge { args }.data(),
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
            program_id: storage_prover::ID,
            accounts: storage_prover::accounts::GetProofType {}.to_account_metas(None),
            data: storage_prover::instruction::ProofType {}.data(),
        };
        let transaction = Transaction::new(
            &[&self.payer],
            Message::new(&[instruction], Some(&self.payer.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }
}
