//! # Machine Fingerprint Hash
//!
//! A license is bound to one physical or virtual machine through a digest
//! of that machine's identifying string. The digest is SHA-256 truncated to
//! its first 16 bytes before storage.
//!
//! ## Security Note
//!
//! Truncation halves the digest. Collision resistance drops from 128-bit to
//! 64-bit strength in exchange for 16 bytes of account rent per record. The
//! deployed program stores exactly 16 bytes, so the truncation is part of
//! the wire contract and cannot be widened here.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::InvalidArgument;

/// Stored width of a machine fingerprint hash.
pub const FINGERPRINT_HASH_LEN: usize = 16;

/// Truncated SHA-256 digest of a machine fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct FingerprintHash([u8; FINGERPRINT_HASH_LEN]);

impl FingerprintHash {
    /// Hash a raw machine fingerprint and truncate to the stored width.
    pub fn of(machine_fingerprint: &[u8]) -> Self {
        let digest = Sha256::digest(machine_fingerprint);
        let mut bytes = [0u8; FINGERPRINT_HASH_LEN];
        bytes.copy_from_slice(&digest[..FINGERPRINT_HASH_LEN]);
        Self(bytes)
    }

    /// Wrap an already-truncated digest.
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// The 16 stored bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_HASH_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 32-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, InvalidArgument> {
        let hex = hex.trim();
        if hex.len() != FINGERPRINT_HASH_LEN * 2 || !hex.is_ascii() {
            return Err(InvalidArgument::WrongLength {
                field: "fingerprint hash hex",
                expected: FINGERPRINT_HASH_LEN * 2,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; FINGERPRINT_HASH_LEN];
        for (i, out) in bytes.iter_mut().enumerate() {
            *out = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
                InvalidArgument::MalformedHex {
                    input: hex.to_string(),
                    reason: format!("invalid hex at position {}", i * 2),
                }
            })?;
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for FingerprintHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for FingerprintHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FingerprintHash({})", self.to_hex())
    }
}

impl Serialize for FingerprintHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FingerprintHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = <String as Deserialize>::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
