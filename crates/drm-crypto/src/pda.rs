//! # Program-Derived Addresses
//!
//! Computes the storage address of a license from its key fields alone.
//! Anyone holding `(owner, application_id)` and the registry's program
//! identity reproduces the same address without asking the network.
//!
//! ## Derivation
//!
//! ```text
//! seeds   = "license" ‖ owner (32 bytes) ‖ application_id (u32 LE)
//! for bump in 255 ..= 1:
//!     h = sha256(seeds ‖ [bump] ‖ program_id ‖ "ProgramDerivedAddress")
//!     if h is not a valid compressed Ed25519 point: return (h, bump)
//! ```
//!
//! The search itself is the ledger SDK's `Pubkey::try_find_program_address`.
//! This module adds the registry's seeds and turns the SDK's silent `None`
//! and panics into [`DerivationError`]s: seed limits are checked up front so
//! an oversized seed is reported as such instead of as an exhausted search.
//!
//! ## Security Invariant
//!
//! A derived address is never on the curve, so no private key exists for
//! it and no ordinary signer can control it. Only the owning program can
//! write there.

use solana_program::pubkey::{Pubkey, PubkeyError, MAX_SEEDS, MAX_SEED_LEN};

use drm_core::{ApplicationId, DerivationError, License};

/// Domain-separation seed of every license address.
pub const LICENSE_SEED: &[u8] = b"license";

/// Hash `seeds` with `program_id` into an address, rejecting on-curve results.
///
/// `seeds` must already include the bump if one is used.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    check_seeds(seeds, 0)?;
    Pubkey::create_program_address(seeds, program_id).map_err(|e| match e {
        PubkeyError::InvalidSeeds => DerivationError::OnCurve,
        PubkeyError::IllegalOwner => DerivationError::IllegalOwner,
        PubkeyError::MaxSeedLengthExceeded => DerivationError::MaxSeedLengthExceeded {
            index: seeds.iter().position(|s| s.len() > MAX_SEED_LEN).unwrap_or(0),
            len: seeds.iter().map(|s| s.len()).max().unwrap_or(0),
            max: MAX_SEED_LEN,
        },
    })
}

/// Search bumps from 255 down to 1 for the first off-curve address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    check_seeds(seeds, 1)?;
    Pubkey::try_find_program_address(seeds, program_id).ok_or(DerivationError::ExhaustedBumpSpace)
}

/// Enforce the runtime's seed limits, leaving room for `reserved` more seeds.
fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), DerivationError> {
    let count = seeds.len() + reserved;
    if count > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds {
            count,
            max: MAX_SEEDS,
        });
    }
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(DerivationError::MaxSeedLengthExceeded {
                index,
                len: seed.len(),
                max: MAX_SEED_LEN,
            });
        }
    }
    Ok(())
}

// ─── License addresses ───────────────────────────────────────────────

/// Derives license storage addresses for one deployed registry program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDeriver {
    program_id: Pubkey,
}

impl AddressDeriver {
    /// A deriver bound to the registry's program identity.
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// The program identity addresses are derived under.
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// The address and bump for `(owner, application_id)`.
    pub fn derive(
        &self,
        owner: &Pubkey,
        application_id: ApplicationId,
    ) -> Result<(Pubkey, u8), DerivationError> {
        let app = application_id.to_le_bytes();
        find_program_address(&[LICENSE_SEED, owner.as_ref(), &app[..]], &self.program_id)
    }

    /// Whether `address` is where `license` belongs, using its stored bump.
    ///
    /// Checks the single recorded bump rather than repeating the search, so
    /// a record carrying a non-canonical bump is reported as misplaced.
    pub fn verify_placement(&self, license: &License, address: &Pubkey) -> bool {
        let app = license.application_id.to_le_bytes();
        let bump = [license.derivation_bump];
        match create_program_address(
            &[LICENSE_SEED, license.owner.as_ref(), &app[..], &bump[..]],
            &self.program_id,
        ) {
            Ok(expected) => {
                expected == *address
                    && self
                        .derive(&license.owner, license.application_id)
                        .map(|(_, canonical)| canonical == license.derivation_bump)
                        .unwrap_or(false)
            }
            Err(_) => false,
        }
    }
}
