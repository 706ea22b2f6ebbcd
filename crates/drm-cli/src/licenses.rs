//! # Licenses Subcommand
//!
//! Lists every license held by one owner.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use drm_core::identity::base58;
use drm_core::{License, Pubkey};
use drm_registry::{find_licenses_by_owner, RegistryContext};

/// Arguments for `chain-drm licenses`.
#[derive(Args, Debug)]
pub struct LicensesArgs {
    /// The owner whose licenses to list (base58).
    #[arg(value_name = "OWNER")]
    pub owner: Pubkey,
}

#[derive(Debug, Serialize)]
struct Listed {
    #[serde(with = "base58")]
    address: Pubkey,
    #[serde(flatten)]
    license: License,
}

/// Execute the licenses subcommand.
pub async fn run_licenses(args: &LicensesArgs, ctx: &RegistryContext, json: bool) -> Result<u8> {
    let mut licenses = find_licenses_by_owner(ctx, &args.owner)
        .await
        .with_context(|| format!("failed to list licenses of {}", args.owner))?;
    let listed: Vec<Listed> = licenses
        .by_ref()
        .map(|(address, license)| Listed { address, license })
        .collect();

    if json {
        crate::print_json(&listed)?;
    } else if listed.is_empty() {
        println!("no licenses for {}", args.owner);
    } else {
        for entry in &listed {
            println!(
                "{}  app {}  fingerprint {}  bump {}",
                entry.address,
                entry.license.application_id,
                entry.license.machine_fingerprint_hash,
                entry.license.derivation_bump
            );
        }
    }

    if !licenses.skipped().is_empty() {
        tracing::warn!(
            skipped = licenses.skipped().len(),
            "some records under the program could not be decoded"
        );
    }
    Ok(0)
}
