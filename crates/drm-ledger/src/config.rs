//! Ledger connection configuration.
//!
//! Defaults point at the public development cluster and the deployed
//! registry program. Override via environment variables, CLI flags, or
//! explicit construction for local validators and tests.

use std::time::Duration;

use url::Url;

use drm_core::Pubkey;

use crate::ledger::Commitment;

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Identity of the deployed license registry program.
pub const DEFAULT_PROGRAM_ID: &str = "6CTtHe2u4robZvXvP1SbdhKrRvZzYszAurBD7wxMydji";

/// Configuration for talking to the ledger and the registry program on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// The registry program every license address is derived under.
    pub program_id: Pubkey,
    /// Commitment level reads and confirmations are evaluated at.
    pub commitment: Commitment,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// How long issuance waits for its transaction to reach `commitment`.
    pub confirm_timeout_secs: u64,
    /// Delay between signature status polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CHAIN_DRM_RPC_URL` (default: `https://api.devnet.solana.com`)
    /// - `CHAIN_DRM_PROGRAM_ID` (default: the deployed registry program)
    /// - `CHAIN_DRM_COMMITMENT` (`processed` | `confirmed` | `finalized`, default: `confirmed`)
    /// - `CHAIN_DRM_TIMEOUT_SECS` (default: 30)
    /// - `CHAIN_DRM_CONFIRM_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let program_id = env_or("CHAIN_DRM_PROGRAM_ID", DEFAULT_PROGRAM_ID);
        let program_id = program_id
            .parse()
            .map_err(|e| ConfigError::InvalidValue("CHAIN_DRM_PROGRAM_ID".into(), format!("{e}")))?;
        let commitment = env_or("CHAIN_DRM_COMMITMENT", "confirmed");
        let commitment = commitment
            .parse()
            .map_err(|e| ConfigError::InvalidValue("CHAIN_DRM_COMMITMENT".into(), e))?;

        Ok(Self {
            rpc_url: env_url("CHAIN_DRM_RPC_URL", DEFAULT_RPC_URL)?,
            program_id,
            commitment,
            timeout_secs: env_u64("CHAIN_DRM_TIMEOUT_SECS", 30)?,
            confirm_timeout_secs: env_u64("CHAIN_DRM_CONFIRM_TIMEOUT_SECS", 60)?,
            poll_interval_ms: 500,
        })
    }

    /// A configuration pointing at a local validator or mock server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed
    /// (should not occur for valid port numbers, but avoids `expect()`).
    pub fn local(port: u16, program_id: Pubkey) -> Result<Self, ConfigError> {
        let rpc_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            rpc_url,
            program_id,
            commitment: Commitment::Confirmed,
            timeout_secs: 5,
            confirm_timeout_secs: 10,
            poll_interval_ms: 50,
        })
    }

    /// The HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The confirmation wait.
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    /// The status poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = env_or(var, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_u64(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), format!("not an integer: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
