//! # Ledger Identities
//!
//! Account addresses and blockhashes are the ledger SDK's own `Pubkey` and
//! `Hash`, re-exported here so every crate names them from one place. The
//! registry adds one newtype of its own, [`ApplicationId`], fixed at the
//! record's 32-bit width.
//!
//! ## Text Encoding
//!
//! The SDK types render and parse as base58 but serialize through serde as
//! raw byte arrays. Registry types that appear in JSON (CLI output,
//! receipts) route them through [`base58`] so they read the way the ledger
//! prints them.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub use solana_program::hash::Hash;
pub use solana_program::pubkey::Pubkey;

use crate::error::InvalidArgument;

/// Identifier of a licensed application.
///
/// Fixed at 32 bits to match the record layout and the deployed program's
/// instruction argument.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(transparent)]
pub struct ApplicationId(u32);

impl ApplicationId {
    /// Wrap a 32-bit application id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The numeric id.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Little-endian bytes, as used in both the record and the address seeds.
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl From<u32> for ApplicationId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl TryFrom<u64> for ApplicationId {
    type Error = InvalidArgument;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| InvalidArgument::ApplicationIdOutOfRange { value })
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serde adapter: any `Display + FromStr` ledger value as its text form.
///
/// ```ignore
/// #[serde(with = "drm_core::identity::base58")]
/// pub owner: Pubkey,
/// ```
pub mod base58 {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.trim().parse().map_err(serde::de::Error::custom)
    }
}
