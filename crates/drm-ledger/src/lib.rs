//! # drm-ledger — The Ledger Boundary
//!
//! Everything between the license registry and the network:
//!
//! - **Ledger** (`ledger.rs`): the async `Ledger` trait the registry is
//!   written against, commitment levels and account/status values, and
//!   `wire_bytes`, the size-checked wire encoding of a signed
//!   `solana_sdk` transaction.
//!
//! - **Filters** (`filter.rs`): server-side account-scan predicates
//!   (`DataSize`, `Memcmp`) with local validation and their JSON-RPC form.
//!
//! - **RPC** (`rpc.rs`): `RpcLedger`, the JSON-RPC implementation.
//!
//! - **Memory** (`memory.rs`): `MemoryLedger`, an in-process implementation
//!   with pluggable program emulators and fault injection, for tests.
//!
//! - **Config** (`config.rs`): endpoint, program identity, commitment and
//!   timeouts, loaded from the environment.
//!
//! ## Crate Policy
//!
//! - Depends on `drm-core` internally; transactions, signatures and
//!   blockhashes are the ledger SDK's own types.
//! - Every read and submission takes its commitment from the caller.
//! - Never retries on its own; retry policy belongs to callers.

pub mod config;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod memory;
pub mod rpc;

pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use filter::{validate_filters, AccountFilter};
pub use ledger::{wire_bytes, Account, Commitment, KeyedAccount, Ledger, SignatureStatus};
pub use memory::{Allocation, Invocation, MemoryLedger, ProgramEmulator};
pub use rpc::RpcLedger;
