//! Hyperlane mailbox stand-in.
//!
//! Speaks the mailbox's borsh instruction encoding, so it is dispatched through the
//! program's fallback. `OutboxDispatch` stores the message and charges the protocol fee;
//! `InboxProcess` delivers a message to its recipient exactly once, signed by the
//! recipient's process authority. Interchain security modules are not consulted.

use anchor_lang::prelude::borsh::{BorshDeserialize, BorshSerialize};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::{invoke_signed, set_return_data};
use anchor_lang::system_program;
use derive_new::new;
use eco_svm_std::account::AccountExt;
use eco_svm_std::{keccak, Bytes32};
use hyper_prover::hyperlane::{OutboxDispatch, HANDLE_DISCRIMINATOR, PROCESS_AUTHORITY_SEED};

declare_id!("75HBBLae3ddeneJVrZeyrDfv6vb7SMC3aCpBucSXS5aR");

pub const MESSAGE_VERSION: u8 = 3;
pub const MESSAGE_HEADER_LEN: usize = 77;
const MAX_MESSAGE_LEN: usize = 2048;

#[program]
pub mod mock_mailbox {
    use super::*;

    pub fn fallback<'info>(
        _program_id: &Pubkey,
        accounts: &'info [AccountInfo<'info>],
        data: &[u8],
    ) -> Result<()> {
        match MailboxInstruction::try_from_slice(data)
            .map_err(|_| ErrorCode::InstructionDidNotDeserialize)?
        {
            MailboxInstruction::Init(args) => init(accounts, args),
            MailboxInstruction::InboxProcess(args) => inbox_process(accounts, args),
            MailboxInstruction::OutboxDispatch(args) => outbox_dispatch(accounts, args),
            MailboxInstruction::InboxSetDefaultIsm(_)
            | MailboxInstruction::InboxGetRecipientIsm(_) => {
                Err(MailboxError::UnsupportedInstruction.into())
            }
        }
    }
}

#[error_code(offset = 7000)]
pub enum MailboxError {
    UnsupportedInstruction,
    InvalidOutbox,
    NotInitialized,
    AlreadyInitialized,
    InvalidSender,
    InvalidDispatchedMessage,
    InvalidProcessedMessage,
    MessageTooLarge,
    InvalidMessage,
    InvalidDestination,
    InvalidRecipient,
    MessageAlreadyDelivered,
}

/// Leading variants of the Hyperlane mailbox instruction, in its order.
#[derive(BorshSerialize, BorshDeserialize)]
pub enum MailboxInstruction {
    Init(Init),
    InboxProcess(InboxProcess),
    InboxSetDefaultIsm(Pubkey),
    InboxGetRecipientIsm(Pubkey),
    OutboxDispatch(OutboxDispatch),
}

#[derive(BorshSerialize, BorshDeserialize)]
pub struct Init {
    pub local_domain: u32,
    pub protocol_fee: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
pub struct InboxProcess {
    pub metadata: Vec<u8>,
    pub message: Vec<u8>,
}

#[account]
#[derive(InitSpace, Debug)]
pub struct Outbox {
    pub local_domain: u32,
    pub protocol_fee: u64,
    pub nonce: u32,
}

impl AccountExt for Outbox {}

#[account]
#[derive(InitSpace, Debug, new)]
pub struct DispatchedMessage {
    pub nonce: u32,
    #[max_len(MAX_MESSAGE_LEN)]
    pub message: Vec<u8>,
}

impl AccountExt for DispatchedMessage {}

#[account]
#[derive(InitSpace, Debug, new)]
pub struct ProcessedMessage {
    pub message_id: Bytes32,
}

impl AccountExt for ProcessedMessage {}

#[event]
#[derive(new)]
pub struct Dispatch {
    pub message_id: Bytes32,
    pub nonce: u32,
    pub destination: u32,
}

#[event]
#[derive(new)]
pub struct Process {
    pub message_id: Bytes32,
    pub recipient: Pubkey,
}

pub fn outbox_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"hyperlane", b"-", b"outbox"], &ID)
}

pub fn dispatched_message_pda(unique_message: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"hyperlane",
            b"-",
            b"dispatched_message",
            b"-",
            unique_message.as_ref(),
        ],
        &ID,
    )
}

pub fn processed_message_pda(message_id: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"hyperlane",
            b"-",
            b"processed_message",
            b"-",
            message_id.as_ref(),
        ],
        &ID,
    )
}

/// Hyperlane message in its wire format: a big endian header followed by the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HyperlaneMessage {
    pub version: u8,
    pub nonce: u32,
    pub origin: u32,
    pub sender: Bytes32,
    pub destination: u32,
    pub recipient: Bytes32,
    pub body: Vec<u8>,
}

impl HyperlaneMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MESSAGE_HEADER_LEN + self.body.len());

        bytes.push(self.version);
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(&self.origin.to_be_bytes());
        bytes.extend_from_slice(self.sender.as_ref());
        bytes.extend_from_slice(&self.destination.to_be_bytes());
        bytes.extend_from_slice(self.recipient.as_ref());
        bytes.extend_from_slice(&self.body);

        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        require!(
            bytes.len() >= MESSAGE_HEADER_LEN,
            MailboxError::InvalidMessage
        );
        let (header, body) = bytes.split_at(MESSAGE_HEADER_LEN);
        let u32_at = |offset: usize| {
            u32::from_be_bytes([
                header[offset],
                header[offset + 1],
                header[offset + 2],
                header[offset + 3],
            ])
        };
        let bytes32_at = |offset: usize| {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&header[offset..offset + 32]);
            Bytes32::from(bytes)
        };

        Ok(Self {
            version: header[0],
            nonce: u32_at(1),
            origin: u32_at(5),
            sender: bytes32_at(9),
            destination: u32_at(41),
            recipient: bytes32_at(45),
            body: body.to_vec(),
        })
    }

    pub fn id(&self) -> Bytes32 {
        keccak([self.to_bytes().as_slice()])
    }
}

/// Accounts: system program, payer, outbox.
fn init<'info>(accounts: &'info [AccountInfo<'info>], args: Init) -> Result<()> {
    let [system_program, payer, outbox, ..] = accounts else {
        return Err(ErrorCode::AccountNotEnoughKeys.into());
    };
    let system_program = Program::<System>::try_from(system_program)?;
    let (outbox_key, bump) = outbox_pda();
    require_keys_eq!(outbox.key(), outbox_key, MailboxError::InvalidOutbox);
    require!(outbox.data_is_empty(), MailboxError::AlreadyInitialized);

    Outbox {
        local_domain: args.local_domain,
        protocol_fee: args.protocol_fee,
        nonce: 0,
    }
    .init(
        outbox,
        payer,
        &system_program,
        &[&[b"hyperlane", b"-", b"outbox", &[bump]]],
    )
}

/// Accounts: outbox, sender, system program, noop program, payer, unique message,
/// dispatched message. Returns the message id.
fn outbox_dispatch<'info>(accounts: &'info [AccountInfo<'info>], args: OutboxDispatch) -> Result<()> {
    let [outbox, sender, system_program, _noop, payer, unique_message, dispatched_message, ..] =
        accounts
    else {
        return Err(ErrorCode::AccountNotEnoughKeys.into());
    };
    let system_program = Program::<System>::try_from(system_program)?;

    require_keys_eq!(outbox.key(), outbox_pda().0, MailboxError::InvalidOutbox);
    require!(
        sender.is_signer && sender.key() == args.sender,
        MailboxError::InvalidSender
    );
    require!(unique_message.is_signer, MailboxError::InvalidDispatchedMessage);
    let (dispatched_message_key, bump) = dispatched_message_pda(unique_message.key);
    require_keys_eq!(
        dispatched_message.key(),
        dispatched_message_key,
        MailboxError::InvalidDispatchedMessage
    );

    let mut state = Outbox::load(outbox)?.ok_or(MailboxError::NotInitialized)?;
    let message = HyperlaneMessage {
        version: MESSAGE_VERSION,
        nonce: state.nonce,
        origin: state.local_domain,
        sender: args.sender.into(),
        destination: args.destination_domain,
        recipient: args.recipient.into(),
        body: args.message_body,
    };
    let message_bytes = message.to_bytes();
    require!(
        message_bytes.len() <= MAX_MESSAGE_LEN,
        MailboxError::MessageTooLarge
    );

    if state.protocol_fee > 0 {
        system_program::transfer(
            CpiContext::new(
                system_program.to_account_info(),
                system_program::Transfer {
                    from: payer.to_account_info(),
                    to: outbox.to_account_info(),
                },
            ),
            state.protocol_fee,
        )?;
    }

    DispatchedMessage::new(message.nonce, message_bytes).init(
        dispatched_message,
        payer,
        &system_program,
        &[&[
            b"hyperlane",
            b"-",
            b"dispatched_message",
            b"-",
            unique_message.key.as_ref(),
            &[bump],
        ]],
    )?;

    state.nonce += 1;
    state.save(outbox)?;

    let message_id = message.id();
    emit!(Dispatch::new(message_id, message.nonce, message.destination));
    set_return_data(&message_id.try_to_vec()?);

    Ok(())
}

/// Accounts: payer, outbox, processed message, system program, recipient program, then
/// the accounts of the recipient's `handle`, its process authority among them.
fn inbox_process<'info>(accounts: &'info [AccountInfo<'info>], args: InboxProcess) -> Result<()> {
    let [payer, outbox, processed_message, system_program, recipient, handle_accounts @ ..] =
        accounts
    else {
        return Err(ErrorCode::AccountNotEnoughKeys.into());
    };
    let system_program = Program::<System>::try_from(system_program)?;

    require_keys_eq!(outbox.key(), outbox_pda().0, MailboxError::InvalidOutbox);
    let state = Outbox::load(outbox)?.ok_or(MailboxError::NotInitialized)?;
    let message = HyperlaneMessage::from_bytes(&args.message)?;
    let message_id = message.id();

    require!(
        message.destination == state.local_domain,
        MailboxError::InvalidDestination
    );
    require!(
        message.recipient == recipient.key() && recipient.executable,
        MailboxError::InvalidRecipient
    );

    let (processed_message_key, processed_bump) = processed_message_pda(&message_id);
    require_keys_eq!(
        processed_message.key(),
        processed_message_key,
        MailboxError::InvalidProcessedMessage
    );
    require!(
        processed_message.data_is_empty(),
        MailboxError::MessageAlreadyDelivered
    );
    ProcessedMessage::new(message_id).init(
        processed_message,
        payer,
        &system_program,
        &[&[
            b"hyperlane",
            b"-",
            b"processed_message",
            b"-",
            message_id.as_ref(),
            &[processed_bump],
        ]],
    )?;

    deliver(recipient, handle_accounts, &message)?;

    emit!(Process::new(message_id, recipient.key()));

    Ok(())
}

fn deliver<'info>(
    recipient: &'info AccountInfo<'info>,
    handle_accounts: &'info [AccountInfo<'info>],
    message: &HyperlaneMessage,
) -> Result<()> {
    let (process_authority, bump) = process_authority_pda_of(recipient.key);
    let data: Vec<u8> = HANDLE_DISCRIMINATOR
        .into_iter()
        .chain(message.origin.try_to_vec()?)
        .chain(<[u8; 32]>::from(message.sender).try_to_vec()?)
        .chain(message.body.try_to_vec()?)
        .collect();
    let ix = Instruction {
        program_id: recipient.key(),
        accounts: handle_accounts
            .iter()
            .map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: account.is_signer || account.key() == process_authority,
                is_writable: account.is_writable,
            })
            .collect(),
        data,
    };
    let account_infos: Vec<_> = handle_accounts
        .iter()
        .chain([recipient])
        .cloned()
        .collect();
    let bump = [bump];
    let signer_seeds: Vec<&[u8]> = PROCESS_AUTHORITY_SEED
        .iter()
        .copied()
        .chain([recipient.key.as_ref(), bump.as_slice()])
        .collect();

    invoke_signed(&ix, &account_infos, &[signer_seeds.as_slice()]).map_err(Into::into)
}

pub fn process_authority_pda_of(recipient: &Pubkey) -> (Pubkey, u8) {
    hyper_prover::hyperlane::process_authority_pda_of(recipient)
}
