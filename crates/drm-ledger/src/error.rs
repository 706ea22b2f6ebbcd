//! # Ledger Error Types
//!
//! Failures crossing the ledger boundary. The issuance protocol maps these
//! onto its own taxonomy: [`LedgerError::Rejected`] becomes a rejection,
//! everything else a network failure.

use thiserror::Error;

/// Errors returned by a [`Ledger`](crate::Ledger) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The request never produced a response: connection, TLS, timeout.
    #[error("transport failure calling {method}: {reason}")]
    Transport {
        /// JSON-RPC method or operation name.
        method: String,
        /// Underlying transport message.
        reason: String,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("{method} returned HTTP {status}: {body}")]
    Http {
        method: String,
        status: u16,
        body: String,
    },

    /// The endpoint answered with a JSON-RPC error object.
    #[error("{method} failed with RPC error {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// The ledger refused the transaction: failed simulation, bad signature,
    /// unknown blockhash, or an instruction error such as an already
    /// allocated account.
    #[error("transaction rejected: {reason}")]
    Rejected {
        reason: String,
        /// Program log lines, when the ledger reported them.
        logs: Vec<String>,
    },

    /// The response did not have the expected shape.
    #[error("malformed {method} response: {reason}")]
    Malformed { method: String, reason: String },

    /// An account-scan filter set that could never match a record.
    #[error("invalid account filter: {0}")]
    InvalidFilter(String),

    /// A transaction could not be compiled, signed or serialized.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

impl LedgerError {
    /// Whether the ledger itself refused the request, as opposed to the
    /// request failing to reach it or come back.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
