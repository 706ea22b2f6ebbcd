//! # drm-registry — The License Registry
//!
//! Issues licenses to the ledger and reads them back:
//!
//! - **Context** (`context.rs`): `RegistryContext`, the explicit ledger
//!   handle, program identity and confirmation policy every operation takes.
//!
//! - **Instruction** (`instruction.rs`): the `create_license` instruction
//!   and its data encoding.
//!
//! - **Issuance** (`issuance.rs`): the `Built → Submitted → Confirmed`
//!   typestate protocol and the one-call `issue()`.
//!
//! - **Query** (`query.rs`): `find_licenses_by_owner()`, the filtered bulk
//!   scan, and `check_license()`, the single-address read.
//!
//! - **Emulator** (`emulator.rs`): `LicenseProgram`, the registry program's
//!   behavior for `drm_ledger::MemoryLedger`.
//!
//! ## Concurrency
//!
//! No shared mutable state lives here. Issuances and queries for different
//! pairs run concurrently on clones of one context; the only suspension
//! points are ledger calls and the confirmation poll.

pub mod context;
pub mod emulator;
pub mod error;
pub mod instruction;
pub mod issuance;
pub mod query;

pub use context::RegistryContext;
pub use emulator::LicenseProgram;
pub use error::{IssuanceError, QueryError};
pub use instruction::{create_license, CreateLicenseArgs, CREATE_LICENSE_DISCRIMINATOR};
pub use issuance::{issue, Issuance, IssuanceReceipt, TransitionRecord};
pub use query::{check_license, find_licenses_by_owner, owner_filters, OwnerLicenses};
