//! # License Record and Binary Codec
//!
//! The canonical License record and its fixed-width byte encoding. The
//! encoding is the storage format of the deployed registry program and must
//! match it byte for byte; every offset comes from [`RecordLayout`].
//!
//! ## Invariants
//!
//! - The record is the 8-byte [`LICENSE_RECORD_TAG`] followed by the Borsh
//!   encoding of [`License`]. Borsh writes fields in declaration order with
//!   no padding or length prefixes, so the struct's field order is the
//!   storage order described by [`RecordLayout`].
//! - `encode()` always produces exactly `RecordLayout::LEN` bytes.
//! - `decode()` checks width before tag: any buffer shorter than the record
//!   is `Truncated`, whatever its first bytes are.
//! - Bytes past the fixed width are ignored.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::discriminator::LICENSE_RECORD_TAG;
use crate::error::{DecodeError, EncodeError};
use crate::fingerprint::FingerprintHash;
use crate::identity::{base58, ApplicationId, Pubkey};
use crate::layout::RecordLayout;

/// A license record: one application, one owner, one machine.
///
/// Created once by issuance and immutable afterwards. The record tag is not
/// a field; it is implied by the type and written by the codec.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct License {
    /// The licensed application.
    pub application_id: ApplicationId,
    /// The identity permitted to use the license.
    #[serde(with = "base58")]
    pub owner: Pubkey,
    /// Truncated digest of the bound machine's fingerprint.
    pub machine_fingerprint_hash: FingerprintHash,
    /// Bump that made the record's derived address valid.
    pub derivation_bump: u8,
}

impl License {
    /// Encode into the fixed storage layout.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::with_capacity(RecordLayout::LEN);
        out.extend_from_slice(&LICENSE_RECORD_TAG);
        BorshSerialize::serialize(self, &mut out).map_err(|e| EncodeError {
            what: "license record",
            reason: e.to_string(),
        })?;
        Ok(out)
    }

    /// Decode from stored account bytes.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < RecordLayout::LEN {
            return Err(DecodeError::Truncated {
                expected: RecordLayout::LEN,
                actual: data.len(),
            });
        }

        let mut found = [0u8; 8];
        found.copy_from_slice(RecordLayout::TAG.slice(data));
        if found != LICENSE_RECORD_TAG {
            return Err(DecodeError::WrongTag {
                expected: LICENSE_RECORD_TAG,
                found,
            });
        }

        let mut body = &data[RecordLayout::TAG.end()..RecordLayout::LEN];
        <Self as BorshDeserialize>::deserialize(&mut body).map_err(|e| DecodeError::Body {
            reason: e.to_string(),
        })
    }

    /// Whether this record carries the given request fields.
    ///
    /// The bump is not compared: it is an output of derivation, not an
    /// input of the request.
    pub fn matches(
        &self,
        owner: &Pubkey,
        application_id: ApplicationId,
        machine_fingerprint_hash: &FingerprintHash,
    ) -> bool {
        self.owner == *owner
            && self.application_id == application_id
            && self.machine_fingerprint_hash == *machine_fingerprint_hash
    }
}
