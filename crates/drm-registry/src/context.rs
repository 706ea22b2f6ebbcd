//! # Registry Context
//!
//! The explicit session every registry operation runs in: which ledger to
//! talk to, which deployed program owns the licenses, and how long to wait
//! for confirmation. There is no global connection or ambient program id;
//! two contexts pointing at different clusters coexist in one process.
//!
//! The context's commitment is the only one in play: the ledger holds none
//! of its own, and every read, submission and confirmation wait passes this
//! one through.

use std::sync::Arc;
use std::time::Duration;

use drm_core::Pubkey;
use drm_crypto::AddressDeriver;
use drm_ledger::{Commitment, Ledger, LedgerConfig, LedgerError, RpcLedger};

/// Default wait for an issuance to reach its commitment.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Default delay between signature status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Ledger handle, program identity and confirmation policy.
///
/// Cheap to clone; clones share the ledger.
#[derive(Clone)]
pub struct RegistryContext {
    ledger: Arc<dyn Ledger>,
    deriver: AddressDeriver,
    commitment: Commitment,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl std::fmt::Debug for RegistryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryContext")
            .field("program_id", self.deriver.program_id())
            .field("commitment", &self.commitment)
            .field("confirm_timeout", &self.confirm_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl RegistryContext {
    /// A context over `ledger` for the program at `program_id`, with default
    /// confirmation policy.
    pub fn new(ledger: Arc<dyn Ledger>, program_id: Pubkey) -> Self {
        Self {
            ledger,
            deriver: AddressDeriver::new(program_id),
            commitment: Commitment::Confirmed,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// A context over `ledger` taking program and policy from `config`.
    pub fn with_ledger(ledger: Arc<dyn Ledger>, config: &LedgerConfig) -> Self {
        Self::new(ledger, config.program_id)
            .with_commitment(config.commitment)
            .with_confirm_timeout(config.confirm_timeout())
            .with_poll_interval(config.poll_interval())
    }

    /// A context talking JSON-RPC to `config.rpc_url`.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let ledger = Arc::new(RpcLedger::new(config)?);
        Ok(Self::with_ledger(ledger, config))
    }

    /// Commitment for every ledger call made under this context.
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The ledger operations run against.
    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// The address deriver bound to this context's program.
    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    /// The registry program identity.
    pub fn program_id(&self) -> &Pubkey {
        self.deriver.program_id()
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn confirm_timeout(&self) -> Duration {
        self.confirm_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
