//! # Issue Subcommand
//!
//! Issues one license and waits for it to be confirmed.
//!
//! When the outcome is uncertain (timeout, or the network failed after the
//! transaction may have been sent), the derived address is checked once
//! before reporting, so the operator knows whether a license now exists.
//! Nothing is resubmitted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use drm_core::{ApplicationId, Pubkey};
use drm_registry::{check_license, issue, IssuanceError, RegistryContext};

/// Arguments for `chain-drm issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Developer keypair file (JSON array of 64 bytes); pays and authorizes.
    #[arg(long)]
    pub keypair: PathBuf,
    /// The licensee's public identity (base58).
    #[arg(long)]
    pub owner: Pubkey,
    /// The application identifier.
    #[arg(long)]
    pub app_id: u64,
    /// The raw machine identification string to bind the license to.
    #[arg(long)]
    pub machine_code: String,
}

/// Execute the issue subcommand.
pub async fn run_issue(args: &IssueArgs, ctx: &RegistryContext, json: bool) -> Result<u8> {
    let developer = crate::keyfile::read_keypair(&args.keypair)?;
    let application_id = ApplicationId::try_from(args.app_id)?;

    match issue(
        ctx,
        &developer,
        &args.owner,
        application_id,
        args.machine_code.as_bytes(),
    )
    .await
    {
        Ok(receipt) => {
            if json {
                crate::print_json(&receipt)?;
            } else {
                println!("OK: license issued");
                println!("  Address:     {}", receipt.address);
                println!("  Owner:       {}", receipt.license.owner);
                println!("  Application: {}", receipt.license.application_id);
                println!("  Fingerprint: {}", receipt.license.machine_fingerprint_hash);
                println!("  Signature:   {}", receipt.signature);
            }
            Ok(0)
        }
        Err(err @ (IssuanceError::Timeout { .. } | IssuanceError::NetworkFailure { .. })) => {
            tracing::warn!(error = %err, "issuance outcome uncertain; checking derived address");
            let existing = check_license(ctx, &args.owner, application_id)
                .await
                .context("could not determine whether the license was stored")?;
            match existing {
                Some(license) => println!(
                    "UNCERTAIN: {err}; a license for this pair now exists (fingerprint {})",
                    license.machine_fingerprint_hash
                ),
                None => println!("FAIL: {err}; no license is stored for this pair"),
            }
            Ok(1)
        }
        Err(err) => {
            println!("FAIL: {err}");
            Ok(1)
        }
    }
}
