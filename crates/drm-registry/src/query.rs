//! # Query Engine
//!
//! Reads licenses back from the ledger.
//!
//! [`find_licenses_by_owner`] runs one server-side scan over every account
//! the registry program owns, filtered to records of exactly the License
//! width whose owner field equals the requested owner. Both the width and
//! the owner offset come from [`RecordLayout`], the same descriptor the
//! codec encodes with.
//!
//! [`check_license`] re-derives the address of one `(owner, application_id)`
//! pair and reads it directly. It is how a caller learns whether a failed
//! or timed-out issuance actually stored its record.

use tracing::{debug, warn};

use drm_core::{ApplicationId, DecodeError, License, Pubkey, RecordLayout};
use drm_ledger::{AccountFilter, KeyedAccount};

use crate::context::RegistryContext;
use crate::error::QueryError;

/// The scan filters selecting `owner`'s license records.
pub fn owner_filters(owner: &Pubkey) -> [AccountFilter; 2] {
    [
        AccountFilter::DataSize(RecordLayout::LEN as u64),
        AccountFilter::memcmp(RecordLayout::OWNER.offset, owner.to_bytes().to_vec()),
    ]
}

/// The licenses held by one owner, decoded lazily.
///
/// Yields `(address, License)` in ledger order. Records that fail to decode
/// are skipped, logged, and kept in [`OwnerLicenses::skipped`]. The sequence
/// is finite and single-pass.
#[derive(Debug)]
pub struct OwnerLicenses {
    owner: Pubkey,
    pending: std::vec::IntoIter<KeyedAccount>,
    skipped: Vec<(Pubkey, DecodeError)>,
}

impl OwnerLicenses {
    /// The owner the scan was for.
    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    /// Malformed records passed over so far.
    pub fn skipped(&self) -> &[(Pubkey, DecodeError)] {
        &self.skipped
    }
}

impl Iterator for OwnerLicenses {
    type Item = (Pubkey, License);

    fn next(&mut self) -> Option<Self::Item> {
        for keyed in self.pending.by_ref() {
            match License::decode(&keyed.account.data) {
                Ok(license) => return Some((keyed.address, license)),
                Err(error) => {
                    warn!(
                        address = %keyed.address,
                        owner = %self.owner,
                        %error,
                        "skipping malformed license record"
                    );
                    self.skipped.push((keyed.address, error));
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.pending.size_hint().1)
    }
}

/// All licenses whose owner is `owner`.
///
/// An owner with no licenses yields an empty sequence, not an error.
pub async fn find_licenses_by_owner(
    ctx: &RegistryContext,
    owner: &Pubkey,
) -> Result<OwnerLicenses, QueryError> {
    let accounts = ctx
        .ledger()
        .program_accounts(ctx.program_id(), &owner_filters(owner), ctx.commitment())
        .await?;
    debug!(%owner, matches = accounts.len(), "owner scan complete");
    Ok(OwnerLicenses {
        owner: *owner,
        pending: accounts.into_iter(),
        skipped: Vec::new(),
    })
}

/// The license stored for `(owner, application_id)`, if any.
///
/// Unlike the owner scan, a malformed or foreign record at the derived
/// address is an error here: the caller asked about that address alone.
pub async fn check_license(
    ctx: &RegistryContext,
    owner: &Pubkey,
    application_id: ApplicationId,
) -> Result<Option<License>, QueryError> {
    let (address, _) = ctx.deriver().derive(owner, application_id)?;
    let Some(account) = ctx.ledger().account(&address, ctx.commitment()).await? else {
        return Ok(None);
    };
    if account.owner != *ctx.program_id() {
        return Err(QueryError::ForeignOwner {
            address,
            owner: account.owner,
        });
    }
    License::decode(&account.data)
        .map(Some)
        .map_err(|source| QueryError::Malformed { address, source })
}
