//! Keypair files in the ledger tooling's format: a JSON array of 64
//! integers, the secret seed followed by the public key.

use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use solana_sdk::signature::Keypair;
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::signer::Signer;

const KEYPAIR_FILE_LEN: usize = 64;

/// Read a keypair file.
pub fn read_keypair(path: &Path) -> Result<Keypair> {
    if !path.exists() {
        bail!("keypair file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read keypair: {}", path.display()))?;
    let bytes: Vec<u8> = serde_json::from_str(&content)
        .with_context(|| format!("keypair is not a JSON byte array: {}", path.display()))?;
    ensure!(
        bytes.len() == KEYPAIR_FILE_LEN,
        "invalid keypair: {}: expected {KEYPAIR_FILE_LEN} bytes, found {}",
        path.display(),
        bytes.len()
    );

    let (seed, public) = bytes.split_at(32);
    let keypair = keypair_from_seed(seed)
        .map_err(|e| anyhow!("invalid keypair: {}: {e}", path.display()))?;
    ensure!(
        keypair.pubkey().as_ref() == public,
        "invalid keypair: {}: public key does not match the secret seed",
        path.display()
    );
    Ok(keypair)
}
