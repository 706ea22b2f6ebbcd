//! # Issuance Protocol
//!
//! Issues one license as a typestate machine. Each state is a distinct
//! type, so confirming before submitting, or reading a receipt from an
//! unconfirmed issuance, does not compile.
//!
//! ## States
//!
//! ```text
//! Built ──submit()──▶ Submitted ──confirm()──▶ Confirmed ──into_receipt()──▶ IssuanceReceipt
//!   │                     │
//!   └─────────────────────┴──▶ Err(IssuanceError), terminal for the attempt
//! ```
//!
//! - `Built`: address derived, fingerprint hashed, instruction assembled.
//!   Pure; no network access.
//! - `Submitted`: transaction signed and accepted by the ledger. Acceptance
//!   is not durability.
//! - `Confirmed`: the transaction reached the context's commitment and the
//!   record read back from the derived address matches the request.
//!
//! ## Security Invariant
//!
//! Nothing here retries. A second submission for the same pair targets the
//! same derived address and is refused by the allocation rule whether or
//! not the first one landed. After any failure, callers run
//! [`check_license`](crate::check_license) to learn whether the record
//! exists before deciding what to do next.
//!
//! ## Cancellation
//!
//! `confirm()` is a plain future. Dropping it, or letting an outer timeout
//! drop it, stops only the local wait; the ledger side is unaffected and no
//! local state is left half-updated.
//!
//! ```compile_fail
//! use drm_registry::issuance::{Built, Issuance};
//!
//! fn premature(issuance: Issuance<Built>) {
//!     // ERROR: no method named `into_receipt` found for `Issuance<Built>`
//!     let _ = issuance.into_receipt();
//! }
//! ```

use std::marker::PhantomData;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use drm_core::identity::base58;
use drm_core::{ApplicationId, FingerprintHash, License, Pubkey, Timestamp};
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

use crate::context::RegistryContext;
use crate::error::IssuanceError;
use crate::instruction::{create_license, CreateLicenseArgs};

// ─── State Types ─────────────────────────────────────────────────────

/// Issuance state: instruction assembled, nothing sent.
#[derive(Debug, Clone, Copy)]
pub struct Built;

/// Issuance state: accepted by the ledger, outcome unknown.
#[derive(Debug, Clone, Copy)]
pub struct Submitted;

/// Issuance state: final and verified.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Built {}
    impl Sealed for super::Submitted {}
    impl Sealed for super::Confirmed {}
}

/// Marker trait for issuance states. Sealed.
pub trait IssuanceState: private::Sealed + std::fmt::Debug {
    /// Canonical state name, as recorded in the transition trail.
    fn name() -> &'static str;
}

impl IssuanceState for Built {
    fn name() -> &'static str {
        "BUILT"
    }
}
impl IssuanceState for Submitted {
    fn name() -> &'static str {
        "SUBMITTED"
    }
}
impl IssuanceState for Confirmed {
    fn name() -> &'static str {
        "CONFIRMED"
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// One state change of an issuance, in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_state: String,
    pub to_state: String,
    pub timestamp: Timestamp,
}

/// Proof of a completed issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuanceReceipt {
    /// The record as read back from the ledger.
    pub license: License,
    /// Where it is stored.
    #[serde(with = "base58")]
    pub address: Pubkey,
    /// The transaction that stored it.
    #[serde(with = "base58")]
    pub signature: Signature,
    /// Slot the transaction executed in.
    pub slot: u64,
    /// Every state change, oldest first.
    pub transitions: Vec<TransitionRecord>,
}

// ─── The Issuance ────────────────────────────────────────────────────

/// One license issuance, parameterized by its protocol state.
#[derive(Debug)]
pub struct Issuance<S: IssuanceState> {
    owner: Pubkey,
    application_id: ApplicationId,
    machine_fingerprint_hash: FingerprintHash,
    address: Pubkey,
    bump: u8,
    instruction: Instruction,
    signature: Option<Signature>,
    slot: u64,
    license: Option<License>,
    transitions: Vec<TransitionRecord>,
    _state: PhantomData<S>,
}

impl<S: IssuanceState> Issuance<S> {
    pub fn state_name(&self) -> &'static str {
        S::name()
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    pub fn machine_fingerprint_hash(&self) -> &FingerprintHash {
        &self.machine_fingerprint_hash
    }

    /// The derived storage address.
    pub fn address(&self) -> &Pubkey {
        &self.address
    }

    /// The bump the address was derived with.
    pub fn bump(&self) -> u8 {
        self.bump
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    fn transition_to<T: IssuanceState>(mut self) -> Issuance<T> {
        debug!(
            address = %self.address,
            from = S::name(),
            to = T::name(),
            "issuance transition"
        );
        self.transitions.push(TransitionRecord {
            from_state: S::name().to_string(),
            to_state: T::name().to_string(),
            timestamp: Timestamp::now(),
        });
        Issuance {
            owner: self.owner,
            application_id: self.application_id,
            machine_fingerprint_hash: self.machine_fingerprint_hash,
            address: self.address,
            bump: self.bump,
            instruction: self.instruction,
            signature: self.signature,
            slot: self.slot,
            license: self.license,
            transitions: self.transitions,
            _state: PhantomData,
        }
    }

    fn fail(&self, err: IssuanceError) -> IssuanceError {
        warn!(address = %self.address, state = S::name(), error = %err, "issuance failed");
        err
    }
}

impl Issuance<Built> {
    /// Derive the address, hash the fingerprint and assemble the instruction
    /// with `developer` as payer and authorizer.
    pub fn prepare(
        ctx: &RegistryContext,
        developer: &Pubkey,
        owner: &Pubkey,
        application_id: ApplicationId,
        machine_fingerprint: &[u8],
    ) -> Result<Self, IssuanceError> {
        let (address, bump) = ctx.deriver().derive(owner, application_id)?;
        let machine_fingerprint_hash = FingerprintHash::of(machine_fingerprint);
        let instruction = create_license(
            ctx.program_id(),
            developer,
            owner,
            &address,
            CreateLicenseArgs {
                application_id,
                machine_fingerprint_hash,
            },
        )?;
        debug!(%owner, %application_id, %address, bump, "issuance built");
        Ok(Self {
            owner: *owner,
            application_id,
            machine_fingerprint_hash,
            address,
            bump,
            instruction,
            signature: None,
            slot: 0,
            license: None,
            transitions: Vec::new(),
            _state: PhantomData,
        })
    }

    /// The assembled instruction.
    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    /// Sign with `signer` and transmit.
    ///
    /// `signer` pays the fee and must be the developer named in
    /// [`Issuance::prepare`].
    pub async fn submit(
        self,
        ctx: &RegistryContext,
        signer: &(dyn Signer + Sync),
    ) -> Result<Issuance<Submitted>, IssuanceError> {
        let blockhash = ctx
            .ledger()
            .latest_blockhash(ctx.commitment())
            .await
            .map_err(|e| self.fail(IssuanceError::from_ledger("fetching a blockhash", e)))?;
        let payer = signer.pubkey();
        let message = Message::new_with_blockhash(
            std::slice::from_ref(&self.instruction),
            Some(&payer),
            &blockhash,
        );
        let transaction = {
            let mut transaction = Transaction::new_unsigned(message);
            let signers: [&dyn Signer; 1] = [signer];
            transaction
                .try_sign(&signers[..], blockhash)
                .map(|()| transaction)
        }
        .map_err(|e| self.fail(IssuanceError::Signing(e.to_string())))?;

        let signature = ctx
            .ledger()
            .send_transaction(&transaction, ctx.commitment())
            .await
            .map_err(|e| self.fail(IssuanceError::from_ledger("submitting", e)))?;

        let mut submitted = self.transition_to::<Submitted>();
        submitted.signature = Some(signature);
        Ok(submitted)
    }
}

impl Issuance<Submitted> {
    /// The submission identifier.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Wait for the context's commitment, within its confirmation timeout,
    /// then verify the stored record.
    pub async fn confirm(self, ctx: &RegistryContext) -> Result<Issuance<Confirmed>, IssuanceError> {
        let timeout = ctx.confirm_timeout();
        self.confirm_within(ctx, timeout).await
    }

    /// As [`Issuance::confirm`] with an explicit timeout.
    pub async fn confirm_within(
        mut self,
        ctx: &RegistryContext,
        timeout: Duration,
    ) -> Result<Issuance<Confirmed>, IssuanceError> {
        let signature = self.signature.ok_or_else(|| {
            self.fail(IssuanceError::Signing("submitted issuance has no signature".into()))
        })?;

        let outcome = tokio::time::timeout(timeout, self.await_commitment(ctx, &signature)).await;
        let slot = match outcome {
            Ok(result) => result.map_err(|e| self.fail(e))?,
            Err(_) => {
                return Err(self.fail(IssuanceError::Timeout {
                    signature,
                    commitment: ctx.commitment(),
                    waited: timeout,
                }))
            }
        };
        self.slot = slot;

        let license = self.read_back(ctx).await.map_err(|e| self.fail(e))?;
        info!(
            address = %self.address,
            owner = %self.owner,
            application_id = %self.application_id,
            %signature,
            slot = self.slot,
            "license issued"
        );
        self.license = Some(license);
        Ok(self.transition_to())
    }

    /// Poll until the transaction reaches the commitment or fails.
    async fn await_commitment(
        &self,
        ctx: &RegistryContext,
        signature: &Signature,
    ) -> Result<u64, IssuanceError> {
        loop {
            let status = ctx
                .ledger()
                .signature_status(signature)
                .await
                .map_err(|e| IssuanceError::from_ledger("confirming", e))?;
            if let Some(status) = status {
                if let Some(err) = status.err {
                    return Err(IssuanceError::Rejected {
                        reason: err,
                        logs: Vec::new(),
                    });
                }
                if status.reaches(ctx.commitment()) {
                    return Ok(status.slot);
                }
            }
            tokio::time::sleep(ctx.poll_interval()).await;
        }
    }

    /// Read the record at the derived address and require it to match.
    async fn read_back(&self, ctx: &RegistryContext) -> Result<License, IssuanceError> {
        let mismatch = |reason: String| IssuanceError::VerificationMismatch {
            address: self.address,
            reason,
        };
        let account = ctx
            .ledger()
            .account(&self.address, ctx.commitment())
            .await
            .map_err(|e| IssuanceError::from_ledger("reading back the record", e))?
            .ok_or_else(|| mismatch("no account at the derived address".into()))?;
        if account.owner != *ctx.program_id() {
            return Err(mismatch(format!("account owned by {}", account.owner)));
        }
        let license = License::decode(&account.data).map_err(|e| mismatch(e.to_string()))?;
        if !license.matches(&self.owner, self.application_id, &self.machine_fingerprint_hash) {
            return Err(mismatch(format!(
                "stored (owner {}, application {}, fingerprint {}) differs from request",
                license.owner, license.application_id, license.machine_fingerprint_hash
            )));
        }
        if license.derivation_bump != self.bump {
            return Err(mismatch(format!(
                "stored bump {} differs from derived bump {}",
                license.derivation_bump, self.bump
            )));
        }
        Ok(license)
    }
}

impl Issuance<Confirmed> {
    /// The verified record.
    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    /// The final receipt.
    pub fn into_receipt(self) -> Result<IssuanceReceipt, IssuanceError> {
        match (self.license, self.signature) {
            (Some(license), Some(signature)) => Ok(IssuanceReceipt {
                license,
                address: self.address,
                signature,
                slot: self.slot,
                transitions: self.transitions,
            }),
            _ => Err(IssuanceError::VerificationMismatch {
                address: self.address,
                reason: "confirmed issuance is missing its record".into(),
            }),
        }
    }
}

/// Issue a license: prepare, submit, confirm and verify.
///
/// `developer` authorizes and pays; `owner` is the licensee. On error the
/// attempt is over; see the module docs before retrying.
pub async fn issue(
    ctx: &RegistryContext,
    developer: &(dyn Signer + Sync),
    owner: &Pubkey,
    application_id: ApplicationId,
    machine_fingerprint: &[u8],
) -> Result<IssuanceReceipt, IssuanceError> {
    Issuance::prepare(
        ctx,
        &developer.pubkey(),
        owner,
        application_id,
        machine_fingerprint,
    )?
    .submit(ctx, developer)
    .await?
    .confirm(ctx)
    .await?
    .into_receipt()
}
