//! # drm-cli — CLI for the License Registry
//!
//! Provides the `chain-drm` command-line interface, thin glue over
//! `drm-registry`:
//!
//! - `chain-drm derive` — the storage address and bump of a license.
//! - `chain-drm issue` — issue a license, signed with a keypair file.
//! - `chain-drm licenses` — every license held by an owner.
//! - `chain-drm fingerprint` — the truncated hash of a machine code.
//!
//! ```bash
//! chain-drm derive --owner GDfeT17oazw8ep1W17V4BCpQroQywhKHfhU2xhNMaz17 --app-id 123123
//! chain-drm issue --keypair ~/.config/solana/id.json \
//!     --owner GDfeT17oazw8ep1W17V4BCpQroQywhKHfhU2xhNMaz17 \
//!     --app-id 123123 --machine-code CLIENT-MACHINE-ID-STRING-EXAMPLE
//! chain-drm licenses GDfeT17oazw8ep1W17V4BCpQroQywhKHfhU2xhNMaz17
//! ```

pub mod derive;
pub mod fingerprint;
pub mod issue;
pub mod keyfile;
pub mod licenses;

use anyhow::{Context, Result};
use url::Url;

use drm_core::Pubkey;
use drm_ledger::LedgerConfig;

/// Load ledger configuration from the environment, then apply flag overrides.
pub fn load_config(rpc_url: Option<&Url>, program_id: Option<&Pubkey>) -> Result<LedgerConfig> {
    let mut config = LedgerConfig::from_env().context("invalid ledger configuration")?;
    if let Some(url) = rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(program_id) = program_id {
        config.program_id = *program_id;
    }
    tracing::debug!(?config, "ledger configuration");
    Ok(config)
}

/// Print `value` as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}
