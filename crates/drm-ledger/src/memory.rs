//! # In-Memory Ledger
//!
//! A [`Ledger`] that lives in process, for tests and offline demos. It
//! checks what the real ledger checks before anything reaches a program
//! (signatures, blockhash freshness, duplicate submission) and enforces the
//! storage-allocation rule itself: an address that already holds an account
//! can never be allocated again.
//!
//! Program behavior is supplied by registering a [`ProgramEmulator`] per
//! program identity. Emulators only describe the accounts an instruction
//! would create; the ledger applies them atomically or not at all.
//!
//! Fault injection covers the failure paths callers must handle: failed
//! sends, failed scans, slow or withheld confirmation, and transactions that
//! land with an execution error instead of failing preflight.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::debug;

use drm_core::{Hash, Pubkey};

use crate::error::LedgerError;
use crate::filter::{validate_filters, AccountFilter};
use crate::ledger::{wire_bytes, Account, Commitment, KeyedAccount, Ledger, SignatureStatus};

/// One instruction as a program sees it.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub program_id: &'a Pubkey,
    pub accounts: &'a [AccountMeta],
    pub data: &'a [u8],
}

/// An account an instruction creates, owned by the invoked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub address: Pubkey,
    pub data: Vec<u8>,
}

/// Stand-in for on-ledger program logic.
pub trait ProgramEmulator: Send + Sync {
    /// The accounts `invocation` would create, or the program's error.
    fn execute(&self, invocation: &Invocation<'_>) -> Result<Vec<Allocation>, String>;
}

#[derive(Debug)]
struct Landed {
    slot: u64,
    err: Option<String>,
    polls: u32,
}

#[derive(Debug, Default)]
struct Faults {
    send_failures: VecDeque<LedgerError>,
    scan_failures: VecDeque<LedgerError>,
    confirm_after_polls: u32,
    withhold_confirmation: bool,
    skip_preflight: bool,
}

#[derive(Default)]
struct State {
    accounts: BTreeMap<Pubkey, Account>,
    programs: HashMap<Pubkey, Arc<dyn ProgramEmulator>>,
    statuses: HashMap<Signature, Landed>,
    blockhashes: HashSet<Hash>,
    slot: u64,
    send_attempts: usize,
    faults: Faults,
}

/// An in-process ledger.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryLedger")
            .field("accounts", &state.accounts.len())
            .field("programs", &state.programs.len())
            .field("slot", &state.slot)
            .finish()
    }
}

impl MemoryLedger {
    /// An empty ledger with no programs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the emulator that executes instructions for `program_id`.
    pub fn register_program(&self, program_id: Pubkey, emulator: Arc<dyn ProgramEmulator>) {
        self.state.lock().programs.insert(program_id, emulator);
    }

    /// Store an account directly, bypassing any program.
    pub fn insert_account(&self, address: Pubkey, account: Account) {
        self.state.lock().accounts.insert(address, account);
    }

    /// Number of stored accounts.
    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }

    /// How many times `send_transaction` has been called.
    pub fn send_attempts(&self) -> usize {
        self.state.lock().send_attempts
    }

    /// Make the next `send_transaction` fail with `err` before doing anything.
    pub fn fail_next_send(&self, err: LedgerError) {
        self.state.lock().faults.send_failures.push_back(err);
    }

    /// Make the next `program_accounts` fail with `err`.
    pub fn fail_next_scan(&self, err: LedgerError) {
        self.state.lock().faults.scan_failures.push_back(err);
    }

    /// Report landed transactions as merely processed for the first `polls`
    /// status queries, then as finalized.
    pub fn set_confirm_after_polls(&self, polls: u32) {
        self.state.lock().faults.confirm_after_polls = polls;
    }

    /// Keep every landed transaction at processed indefinitely.
    pub fn withhold_confirmation(&self, withhold: bool) {
        self.state.lock().faults.withhold_confirmation = withhold;
    }

    /// Accept transactions whose execution fails, recording the failure in
    /// their status instead of refusing them at submission.
    pub fn set_skip_preflight(&self, skip: bool) {
        self.state.lock().faults.skip_preflight = skip;
    }
}

/// Whether account `index` of `message` may be written, read from the header.
fn is_writable_index(message: &Message, index: usize) -> bool {
    let header = &message.header;
    let signed = usize::from(header.num_required_signatures);
    if index < signed {
        index < signed.saturating_sub(usize::from(header.num_readonly_signed_accounts))
    } else {
        index
            < message
                .account_keys
                .len()
                .saturating_sub(usize::from(header.num_readonly_unsigned_accounts))
    }
}

impl State {
    /// Run every instruction against the current accounts, returning the
    /// accounts to create if all succeed.
    fn execute(&self, message: &Message) -> Result<BTreeMap<Pubkey, Account>, String> {
        let keys = &message.account_keys;
        let mut staged = BTreeMap::new();
        for (index, ix) in message.instructions.iter().enumerate() {
            let program_id = *keys
                .get(usize::from(ix.program_id_index))
                .ok_or_else(|| format!("Error processing Instruction {index}: bad program index"))?;
            let program = self.programs.get(&program_id).ok_or_else(|| {
                format!("Error processing Instruction {index}: program {program_id} not found")
            })?;
            let accounts = ix
                .accounts
                .iter()
                .map(|&i| {
                    let i = usize::from(i);
                    keys.get(i).map(|&pubkey| AccountMeta {
                        pubkey,
                        is_signer: message.is_signer(i),
                        is_writable: is_writable_index(message, i),
                    })
                })
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| format!("Error processing Instruction {index}: bad account index"))?;
            let invocation = Invocation {
                program_id: &program_id,
                accounts: &accounts,
                data: &ix.data,
            };
            let allocations = program
                .execute(&invocation)
                .map_err(|e| format!("Error processing Instruction {index}: {e}"))?;

            for allocation in allocations {
                let writable = accounts
                    .iter()
                    .any(|m| m.pubkey == allocation.address && m.is_writable);
                if !writable {
                    return Err(format!(
                        "Error processing Instruction {index}: {} is not a writable account of the instruction",
                        allocation.address
                    ));
                }
                if self.accounts.contains_key(&allocation.address)
                    || staged.contains_key(&allocation.address)
                {
                    return Err(format!(
                        "Error processing Instruction {index}: account {} already in use",
                        allocation.address
                    ));
                }
                staged.insert(
                    allocation.address,
                    Account {
                        owner: program_id,
                        data: allocation.data,
                    },
                );
            }
        }
        Ok(staged)
    }
}

fn rejected(reason: impl Into<String>) -> LedgerError {
    LedgerError::Rejected {
        reason: reason.into(),
        logs: Vec::new(),
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn latest_blockhash(&self, _commitment: Commitment) -> Result<Hash, LedgerError> {
        let mut state = self.state.lock();
        state.slot += 1;
        let mut bytes = [0xbb; 32];
        bytes[..8].copy_from_slice(&state.slot.to_le_bytes());
        let hash = Hash::new_from_array(bytes);
        state.blockhashes.insert(hash);
        Ok(hash)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        _commitment: Commitment,
    ) -> Result<Signature, LedgerError> {
        let mut state = self.state.lock();
        state.send_attempts += 1;
        if let Some(err) = state.faults.send_failures.pop_front() {
            return Err(err);
        }

        wire_bytes(transaction)?;
        let signature = *transaction
            .signatures
            .first()
            .ok_or_else(|| LedgerError::InvalidTransaction("transaction is unsigned".into()))?;
        transaction
            .verify()
            .map_err(|e| rejected(format!("signature verification failed: {e}")))?;
        if !state.blockhashes.contains(&transaction.message.recent_blockhash) {
            return Err(rejected("Blockhash not found"));
        }
        if state.statuses.contains_key(&signature) {
            return Err(rejected("This transaction has already been processed"));
        }

        let err = match state.execute(&transaction.message) {
            Ok(created) => {
                state.accounts.extend(created);
                None
            }
            Err(reason) if !state.faults.skip_preflight => {
                return Err(LedgerError::Rejected {
                    reason: format!("Transaction simulation failed: {reason}"),
                    logs: vec![reason],
                });
            }
            Err(reason) => Some(reason),
        };

        state.slot += 1;
        let slot = state.slot;
        debug!(%signature, slot, failed = err.is_some(), "memory ledger landed transaction");
        state.statuses.insert(
            signature,
            Landed {
                slot,
                err,
                polls: 0,
            },
        );
        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let mut state = self.state.lock();
        let confirm_after = state.faults.confirm_after_polls;
        let withhold = state.faults.withhold_confirmation;
        Ok(state.statuses.get_mut(signature).map(|landed| {
            landed.polls += 1;
            let confirmation = if withhold || landed.polls <= confirm_after {
                Commitment::Processed
            } else {
                Commitment::Finalized
            };
            SignatureStatus {
                slot: landed.slot,
                confirmation: Some(confirmation),
                err: landed.err.clone(),
            }
        }))
    }

    async fn account(
        &self,
        address: &Pubkey,
        _commitment: Commitment,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(self.state.lock().accounts.get(address).cloned())
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        _commitment: Commitment,
    ) -> Result<Vec<KeyedAccount>, LedgerError> {
        validate_filters(filters)?;
        let mut state = self.state.lock();
        if let Some(err) = state.faults.scan_failures.pop_front() {
            return Err(err);
        }
        Ok(state
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| filters.iter().all(|f| f.matches(&account.data)))
            .map(|(address, account)| KeyedAccount {
                address: *address,
                account: account.clone(),
            })
            .collect())
    }
}
