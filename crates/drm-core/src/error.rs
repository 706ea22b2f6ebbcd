//! # Error Types — Registry Error Taxonomy
//!
//! The value-level errors of the license registry. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - `InvalidArgument` is a caller bug: a malformed hex string or an
//!   application id that does not fit the record's integer width.
//! - `DerivationError` means the address search could not produce an
//!   address. It never yields a wrong one.
//! - `DecodeError` is reported per record. A bulk scan skips the record and
//!   continues; it never aborts on one.
//!
//! Network and protocol failures live with the crates that perform I/O.

use thiserror::Error;

/// A caller-supplied argument violates the registry's input contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// A hex string contains a non-hex character.
    #[error("malformed hex {input:?}: {reason}")]
    MalformedHex {
        /// The rejected input, as given.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The application id does not fit the 32-bit field of the record.
    #[error("application id {value} does not fit in 32 bits")]
    ApplicationIdOutOfRange {
        /// The out-of-range value.
        value: u64,
    },

    /// A fixed-width byte field was given the wrong number of bytes.
    #[error("{field} must be exactly {expected} bytes, got {actual}")]
    WrongLength {
        /// The field being constructed.
        field: &'static str,
        /// Required width.
        expected: usize,
        /// Supplied width.
        actual: usize,
    },
}

/// The derived-address search failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// Every bump candidate hashed onto a valid curve point.
    #[error("no bump value yields an off-curve address")]
    ExhaustedBumpSpace,

    /// The supplied bump and seeds hash onto a valid curve point.
    #[error("seeds and bump produce an on-curve address")]
    OnCurve,

    /// A single seed is longer than the ledger accepts.
    #[error("seed {index} is {len} bytes, maximum is {max}")]
    MaxSeedLengthExceeded {
        /// Position of the offending seed.
        index: usize,
        /// Its length.
        len: usize,
        /// The ledger's per-seed limit.
        max: usize,
    },

    /// The program identity is the runtime's own derivation marker.
    #[error("program identity may not own derived addresses")]
    IllegalOwner,

    /// More seeds than the ledger accepts.
    #[error("{count} seeds supplied, maximum is {max}")]
    TooManySeeds {
        /// Number of seeds supplied (bump included).
        count: usize,
        /// The ledger's seed-count limit.
        max: usize,
    },
}

/// A byte buffer could not be decoded as a License record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The leading 8 bytes are not the License record tag.
    #[error("record tag mismatch: expected {expected:02x?}, found {found:02x?}")]
    WrongTag {
        /// The License record tag.
        expected: [u8; 8],
        /// The tag found in the buffer.
        found: [u8; 8],
    },

    /// The buffer is shorter than the fixed record width.
    #[error("record truncated: need {expected} bytes, got {actual}")]
    Truncated {
        /// The fixed record width.
        expected: usize,
        /// The buffer length.
        actual: usize,
    },

    /// The record body after the tag failed to deserialize.
    #[error("record body malformed: {reason}")]
    Body {
        /// The deserializer's complaint.
        reason: String,
    },
}

/// A value could not be serialized into its on-ledger form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to encode {what}: {reason}")]
pub struct EncodeError {
    /// What was being encoded.
    pub what: &'static str,
    /// The serializer's complaint.
    pub reason: String,
}
