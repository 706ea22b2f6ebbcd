//! # Fingerprint Subcommand
//!
//! Shows the 16-byte hash a machine code is bound to in a license record.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use drm_core::FingerprintHash;

/// Arguments for `chain-drm fingerprint`.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// The raw machine identification string.
    #[arg(value_name = "MACHINE_CODE")]
    pub machine_code: String,
}

/// Execute the fingerprint subcommand.
pub fn run_fingerprint(args: &FingerprintArgs, json: bool) -> Result<u8> {
    let hash = FingerprintHash::of(args.machine_code.as_bytes());
    if json {
        crate::print_json(&json!({ "machine_fingerprint_hash": hash }))?;
    } else {
        println!("{}", hash.to_hex());
    }
    Ok(0)
}
