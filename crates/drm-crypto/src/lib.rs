//! # drm-crypto — License Address Derivation
//!
//! Computes the deterministic, off-curve storage address of a license from
//! `"license"`, the owner and the application id, on top of the ledger
//! SDK's program-derived address search. No network access.
//!
//! Signing lives with the SDK too: callers hand the issuance protocol any
//! `solana_sdk::signer::Signer`.
//!
//! ## Crate Policy
//!
//! - Depends only on `drm-core` internally.
//! - No mocking of cryptographic operations in tests. Derivation tests use
//!   real SHA-256 and real curve-point decompression.

pub mod pda;

pub use pda::{create_program_address, find_program_address, AddressDeriver, LICENSE_SEED};
