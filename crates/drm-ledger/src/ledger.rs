//! # The Ledger Boundary
//!
//! Everything the registry needs from the network, as one async trait.
//! [`RpcLedger`](crate::RpcLedger) implements it over JSON-RPC;
//! [`MemoryLedger`](crate::MemoryLedger) implements it in process for tests.
//!
//! Implementations are `Send + Sync` and hold no per-call state the caller
//! can observe, so a single instance can serve concurrent issuances and
//! queries behind an `Arc`.
//!
//! Every read takes the [`Commitment`] it should observe. Implementations
//! keep no default of their own, so whoever waits for a transaction also
//! decides what state its read-back sees.
//!
//! Transactions are the ledger SDK's own `Transaction`, compiled and signed
//! by `solana-sdk`; [`wire_bytes`] is the one place their binary form is
//! produced.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use drm_core::{Hash, Pubkey};

use crate::error::LedgerError;
use crate::filter::AccountFilter;

/// How settled a transaction must be before it counts.
///
/// Ordered: `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Executed by one node; may still be rolled back.
    Processed,
    /// Voted on by a supermajority of the cluster.
    Confirmed,
    /// Rooted; cannot be rolled back.
    Finalized,
}

impl Commitment {
    /// The JSON-RPC spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(format!(
                "unknown commitment {other:?}, expected processed, confirmed or finalized"
            )),
        }
    }
}

/// Stored account state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The program permitted to write the account.
    pub owner: Pubkey,
    /// Raw account bytes.
    pub data: Vec<u8>,
}

/// An account together with its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAccount {
    pub address: Pubkey,
    pub account: Account,
}

/// What the ledger knows about a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    /// Slot the transaction executed in.
    pub slot: u64,
    /// Highest commitment reached so far, if the ledger reports one.
    pub confirmation: Option<Commitment>,
    /// Execution error, if the transaction landed but failed.
    pub err: Option<String>,
}

impl SignatureStatus {
    /// Whether the transaction has settled at least as far as `required`.
    pub fn reaches(&self, required: Commitment) -> bool {
        self.confirmation.is_some_and(|c| c >= required)
    }
}

/// The serialized form of a signed transaction, as it travels on the wire.
///
/// Rejects unsigned transactions and anything over the ledger's packet size.
pub fn wire_bytes(transaction: &Transaction) -> Result<Vec<u8>, LedgerError> {
    if !transaction.is_signed() {
        return Err(LedgerError::InvalidTransaction(
            "transaction is not fully signed".into(),
        ));
    }
    let bytes = bincode::serialize(transaction)
        .map_err(|e| LedgerError::InvalidTransaction(format!("serialization failed: {e}")))?;
    if bytes.len() > PACKET_DATA_SIZE {
        return Err(LedgerError::InvalidTransaction(format!(
            "transaction is {} bytes, limit is {PACKET_DATA_SIZE}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Network operations the license registry depends on.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// A recent blockhash to anchor a new transaction's lifetime.
    async fn latest_blockhash(&self, commitment: Commitment) -> Result<Hash, LedgerError>;

    /// Submit a signed transaction, returning its identifying signature.
    ///
    /// Preflight runs against `commitment`. Acceptance is not durability:
    /// the transaction may still fail or be dropped. Callers poll
    /// [`Ledger::signature_status`] for the outcome.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        commitment: Commitment,
    ) -> Result<Signature, LedgerError>;

    /// Status of a submitted transaction, or `None` if the ledger has not
    /// seen it.
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError>;

    /// The account at `address` as of `commitment`, or `None` if nothing is
    /// stored there.
    async fn account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<Account>, LedgerError>;

    /// Every account owned by `program_id` that passes all `filters`, as of
    /// `commitment`.
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        commitment: Commitment,
    ) -> Result<Vec<KeyedAccount>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_ordering() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }

    #[test]
    fn test_commitment_parse_and_display() {
        for c in [Commitment::Processed, Commitment::Confirmed, Commitment::Finalized] {
            assert_eq!(c.to_string().parse::<Commitment>().unwrap(), c);
        }
        assert!("max".parse::<Commitment>().is_err());
        assert_eq!(
            serde_json::to_string(&Commitment::Finalized).unwrap(),
            "\"finalized\""
        );
    }

    #[test]
    fn test_status_reaches() {
        let status = SignatureStatus {
            slot: 10,
            confirmation: Some(Commitment::Confirmed),
            err: None,
        };
        assert!(status.reaches(Commitment::Processed));
        assert!(status.reaches(Commitment::Confirmed));
        assert!(!status.reaches(Commitment::Finalized));

        let unknown = SignatureStatus {
            confirmation: None,
            ..status
        };
        assert!(!unknown.reaches(Commitment::Processed));
    }

    #[test]
    fn test_wire_bytes_requires_signatures() {
        use solana_sdk::instruction::{AccountMeta, Instruction};
        use solana_sdk::message::Message;
        use solana_sdk::signature::Keypair;
        use solana_sdk::signer::Signer;

        let payer = Keypair::new();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1, 2, 3],
            vec![AccountMeta::new(payer.pubkey(), true)],
        );
        let blockhash = Hash::new_from_array([7; 32]);
        let message = Message::new_with_blockhash(&[ix], Some(&payer.pubkey()), &blockhash);

        let unsigned = Transaction::new_unsigned(message.clone());
        assert!(matches!(
            wire_bytes(&unsigned),
            Err(LedgerError::InvalidTransaction(_))
        ));

        let signed = Transaction::new(&[&payer], message, blockhash);
        let bytes = wire_bytes(&signed).unwrap();
        let back: Transaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, signed);
    }

    #[test]
    fn test_wire_bytes_enforces_packet_size() {
        use solana_sdk::instruction::{AccountMeta, Instruction};
        use solana_sdk::message::Message;
        use solana_sdk::signature::Keypair;
        use solana_sdk::signer::Signer;

        let payer = Keypair::new();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[0u8; PACKET_DATA_SIZE],
            vec![AccountMeta::new(payer.pubkey(), true)],
        );
        let blockhash = Hash::new_from_array([7; 32]);
        let message = Message::new_with_blockhash(&[ix], Some(&payer.pubkey()), &blockhash);
        let signed = Transaction::new(&[&payer], message, blockhash);
        match wire_bytes(&signed) {
            Err(LedgerError::InvalidTransaction(reason)) => assert!(reason.contains("limit")),
            other => panic!("expected size rejection, got {other:?}"),
        }
    }
}
