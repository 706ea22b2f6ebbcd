//! # Derive Subcommand
//!
//! Computes where a license lives without touching the network.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use drm_core::identity::base58;
use drm_core::{ApplicationId, Pubkey};
use drm_crypto::AddressDeriver;

/// Arguments for `chain-drm derive`.
#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// The licensee's public identity (base58).
    #[arg(long)]
    pub owner: Pubkey,
    /// The application identifier.
    #[arg(long)]
    pub app_id: u64,
}

/// A derived license address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedAddress {
    #[serde(with = "base58")]
    pub owner: Pubkey,
    pub application_id: ApplicationId,
    #[serde(with = "base58")]
    pub address: Pubkey,
    pub bump: u8,
}

/// Derive the license address for `args` under `program_id`.
pub fn derive_address(args: &DeriveArgs, program_id: &Pubkey) -> Result<DerivedAddress> {
    let application_id = ApplicationId::try_from(args.app_id)?;
    let (address, bump) = AddressDeriver::new(*program_id)
        .derive(&args.owner, application_id)
        .context("address derivation failed")?;
    Ok(DerivedAddress {
        owner: args.owner,
        application_id,
        address,
        bump,
    })
}

/// Execute the derive subcommand.
pub fn run_derive(args: &DeriveArgs, program_id: &Pubkey, json: bool) -> Result<u8> {
    let derived = derive_address(args, program_id)?;
    if json {
        crate::print_json(&derived)?;
    } else {
        println!("{}", derived.address);
        println!("  bump: {}", derived.bump);
    }
    Ok(0)
}
