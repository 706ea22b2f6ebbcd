//! # Account-Scan Filters
//!
//! Server-side predicates for a bulk scan of program-owned accounts. The
//! ledger evaluates them against raw account bytes, so a scan returns only
//! the records that could possibly match.
//!
//! ## Wire Form
//!
//! ```json
//! { "dataSize": 61 }
//! { "memcmp": { "offset": 12, "bytes": "<base58>", "encoding": "base58" } }
//! ```
//!
//! ## Validation
//!
//! [`validate_filters`] runs before any request is sent. A `Memcmp` that
//! extends past a `DataSize` in the same set can never match, and the
//! ledger caps both the number of filters and the compared length; such a
//! set is rejected locally instead of costing a round trip.

use serde_json::{json, Value};

use crate::error::LedgerError;

/// Most filters one scan may carry.
pub const MAX_FILTERS: usize = 4;

/// Longest byte string a `Memcmp` may compare.
pub const MAX_MEMCMP_LEN: usize = 128;

/// One predicate over raw account bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data is exactly this many bytes long.
    DataSize(u64),
    /// Account data holds `bytes` starting at `offset`.
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    /// A byte-range equality filter.
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memcmp {
            offset,
            bytes: bytes.into(),
        }
    }

    /// Evaluate the predicate locally.
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::DataSize(size) => data.len() as u64 == *size,
            Self::Memcmp { offset, bytes } => offset
                .checked_add(bytes.len())
                .and_then(|end| data.get(*offset..end))
                .is_some_and(|window| window == bytes.as_slice()),
        }
    }

    /// The JSON-RPC representation.
    pub fn to_rpc_value(&self) -> Value {
        match self {
            Self::DataSize(size) => json!({ "dataSize": size }),
            Self::Memcmp { offset, bytes } => json!({
                "memcmp": {
                    "offset": offset,
                    "bytes": bs58::encode(bytes).into_string(),
                    "encoding": "base58",
                }
            }),
        }
    }
}

/// Reject filter sets the ledger would refuse or that cannot match.
pub fn validate_filters(filters: &[AccountFilter]) -> Result<(), LedgerError> {
    if filters.len() > MAX_FILTERS {
        return Err(LedgerError::InvalidFilter(format!(
            "{} filters given, at most {MAX_FILTERS} allowed",
            filters.len()
        )));
    }

    let size = filters.iter().find_map(|f| match f {
        AccountFilter::DataSize(size) => Some(*size),
        AccountFilter::Memcmp { .. } => None,
    });

    for filter in filters {
        if let AccountFilter::Memcmp { offset, bytes } = filter {
            if bytes.is_empty() {
                return Err(LedgerError::InvalidFilter(format!(
                    "memcmp at offset {offset} compares no bytes"
                )));
            }
            if bytes.len() > MAX_MEMCMP_LEN {
                return Err(LedgerError::InvalidFilter(format!(
                    "memcmp compares {} bytes, at most {MAX_MEMCMP_LEN} allowed",
                    bytes.len()
                )));
            }
            if let Some(size) = size {
                let end = (*offset as u64).saturating_add(bytes.len() as u64);
                if end > size {
                    return Err(LedgerError::InvalidFilter(format!(
                        "memcmp over {offset}..{end} exceeds data size {size}"
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form() {
        assert_eq!(
            AccountFilter::DataSize(61).to_rpc_value(),
            json!({ "dataSize": 61 })
        );
        assert_eq!(
            AccountFilter::memcmp(12, vec![0u8; 32]).to_rpc_value(),
            json!({
                "memcmp": {
                    "offset": 12,
                    "bytes": "11111111111111111111111111111111",
                    "encoding": "base58",
                }
            })
        );
    }

    #[test]
    fn test_local_matching() {
        let data = [0u8, 1, 2, 3, 4, 5];
        assert!(AccountFilter::DataSize(6).matches(&data));
        assert!(!AccountFilter::DataSize(7).matches(&data));
        assert!(AccountFilter::memcmp(2, vec![2, 3]).matches(&data));
        assert!(!AccountFilter::memcmp(2, vec![3, 3]).matches(&data));
        assert!(!AccountFilter::memcmp(5, vec![5, 6]).matches(&data));
        assert!(!AccountFilter::memcmp(usize::MAX, vec![1]).matches(&data));
    }

    #[test]
    fn test_memcmp_must_fit_inside_size() {
        let ok = [AccountFilter::DataSize(61), AccountFilter::memcmp(12, vec![1; 32])];
        assert!(validate_filters(&ok).is_ok());

        let overflow = [AccountFilter::DataSize(40), AccountFilter::memcmp(12, vec![1; 32])];
        assert!(matches!(
            validate_filters(&overflow),
            Err(LedgerError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_filter_count_and_length_limits() {
        let too_many = vec![AccountFilter::DataSize(61); 5];
        assert!(validate_filters(&too_many).is_err());
        assert!(validate_filters(&[AccountFilter::memcmp(0, vec![1; 129])]).is_err());
        assert!(validate_filters(&[AccountFilter::memcmp(0, Vec::new())]).is_err());
        assert!(validate_filters(&[]).is_ok());
    }
}
