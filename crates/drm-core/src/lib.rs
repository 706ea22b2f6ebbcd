//! # drm-core — Foundational Types for the License Registry
//!
//! This crate is the leaf of the chain DRM workspace. It defines the value
//! types every other crate speaks in and the one piece of wire format that
//! must never drift: the byte layout of a License record.
//!
//! ## Key Design Principles
//!
//! 1. **The ledger SDK's own primitives.** `Pubkey` and `Hash` come from
//!    `solana-program`; the registry adds `ApplicationId` and
//!    `FingerprintHash` so no bare integers or digests cross a crate boundary.
//!
//! 2. **One layout descriptor.** `RecordLayout` owns every offset and width of
//!    the License record. The codec and the owner-scan filter both read from
//!    it, so the filter offset cannot disagree with the encoding.
//!
//! 3. **Borsh after the tag.** A record is an 8-byte tag followed by the
//!    Borsh encoding of `License`; `License::decode()` returns a
//!    `DecodeError` naming what was wrong.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `drm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod discriminator;
pub mod error;
pub mod fingerprint;
pub mod identity;
pub mod layout;
pub mod license;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use discriminator::{account_discriminator, instruction_discriminator, LICENSE_RECORD_TAG};
pub use error::{DecodeError, DerivationError, EncodeError, InvalidArgument};
pub use fingerprint::{FingerprintHash, FINGERPRINT_HASH_LEN};
pub use identity::{ApplicationId, Hash, Pubkey};
pub use layout::{FieldSpan, RecordLayout};
pub use license::License;
pub use temporal::Timestamp;
