//! # chain-drm CLI Entry Point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use drm_cli::derive::{run_derive, DeriveArgs};
use drm_cli::fingerprint::{run_fingerprint, FingerprintArgs};
use drm_cli::issue::{run_issue, IssueArgs};
use drm_cli::licenses::{run_licenses, LicensesArgs};
use drm_core::Pubkey;
use drm_registry::RegistryContext;

/// Chain DRM license registry CLI.
///
/// Derives license addresses, issues licenses against the deployed registry
/// program, and lists the licenses an owner holds.
#[derive(Parser, Debug)]
#[command(name = "chain-drm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON-RPC endpoint of the ledger (overrides CHAIN_DRM_RPC_URL).
    #[arg(long, global = true)]
    rpc_url: Option<Url>,

    /// Identity of the registry program (overrides CHAIN_DRM_PROGRAM_ID).
    #[arg(long, global = true)]
    program_id: Option<Pubkey>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the storage address and bump of a license.
    Derive(DeriveArgs),

    /// Issue a license and wait for confirmation.
    Issue(IssueArgs),

    /// List every license held by an owner.
    Licenses(LicensesArgs),

    /// Hash a machine code the way license records store it.
    Fingerprint(FingerprintArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    if let Commands::Fingerprint(args) = &cli.command {
        return run_fingerprint(args, cli.json);
    }

    let config = drm_cli::load_config(cli.rpc_url.as_ref(), cli.program_id.as_ref())?;
    match &cli.command {
        Commands::Derive(args) => run_derive(args, &config.program_id, cli.json),
        Commands::Issue(args) => {
            let ctx = RegistryContext::from_config(&config)?;
            run_issue(args, &ctx, cli.json).await
        }
        Commands::Licenses(args) => {
            let ctx = RegistryContext::from_config(&config)?;
            run_licenses(args, &ctx, cli.json).await
        }
        Commands::Fingerprint(args) => run_fingerprint(args, cli.json),
    }
}
