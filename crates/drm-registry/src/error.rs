//! # Registry Error Types
//!
//! `IssuanceError` is terminal for one issuance attempt. None of its
//! variants means "retry now": a rejected or timed-out attempt may still
//! have stored the record, so callers re-check with
//! [`check_license`](crate::check_license) before trying again.

use std::time::Duration;

use thiserror::Error;

use drm_core::{DecodeError, DerivationError, EncodeError, Pubkey};
use drm_ledger::{Commitment, LedgerError};
use solana_sdk::signature::Signature;

/// Errors from issuing a license.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// No valid storage address exists for the pair.
    #[error("address derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    /// The instruction arguments could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodeError),

    /// The transaction could not be compiled or signed locally.
    #[error("could not sign issuance transaction: {0}")]
    Signing(String),

    /// The ledger could not be reached or answered unintelligibly.
    #[error("network failure while {stage}: {source}")]
    NetworkFailure {
        /// What the protocol was doing.
        stage: &'static str,
        source: LedgerError,
    },

    /// The ledger refused the transaction or it executed with an error,
    /// typically because the license address is already allocated.
    #[error("issuance rejected: {reason}")]
    Rejected { reason: String, logs: Vec<String> },

    /// The transaction did not reach the required commitment in time. It may
    /// still land later.
    #[error("transaction {signature} not {commitment} within {waited:?}")]
    Timeout {
        signature: Signature,
        commitment: Commitment,
        waited: Duration,
    },

    /// The record read back after confirmation is not the one requested.
    #[error("record at {address} does not match the issuance request: {reason}")]
    VerificationMismatch { address: Pubkey, reason: String },
}

impl IssuanceError {
    /// Classify a ledger failure met while `stage` was in progress.
    pub(crate) fn from_ledger(stage: &'static str, err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected { reason, logs } => Self::Rejected { reason, logs },
            LedgerError::InvalidTransaction(reason) => Self::Signing(reason),
            source => Self::NetworkFailure { stage, source },
        }
    }
}

/// Errors from reading licenses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The scan or read failed at the ledger.
    #[error("ledger query failed: {0}")]
    Ledger(#[from] LedgerError),

    /// No valid storage address exists for the pair.
    #[error("address derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    /// The derived address holds something that is not a license record.
    #[error("account at {address} is not a license record: {source}")]
    Malformed {
        address: Pubkey,
        source: DecodeError,
    },

    /// The derived address holds a record owned by another program.
    #[error("account at {address} is owned by {owner}, not the registry")]
    ForeignOwner { address: Pubkey, owner: Pubkey },
}
