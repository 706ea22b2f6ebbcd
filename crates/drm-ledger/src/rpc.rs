//! # JSON-RPC Ledger Client
//!
//! [`Ledger`] over the ledger's HTTP JSON-RPC interface. Account data and
//! transactions travel base58-encoded, the ledger's native text form.
//! The client holds no commitment of its own; each call carries the one
//! the caller asks for.
//!
//! ## Methods
//!
//! | Trait operation | JSON-RPC method |
//! |---|---|
//! | `latest_blockhash` | `getLatestBlockhash` |
//! | `send_transaction` | `sendTransaction` |
//! | `signature_status` | `getSignatureStatuses` (searching history) |
//! | `account` | `getAccountInfo` |
//! | `program_accounts` | `getProgramAccounts` |
//!
//! Requests are never retried here. A resent transaction with the same
//! signature is harmless, but the caller decides that, not the transport.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::debug;
use url::Url;

use drm_core::{Hash, Pubkey};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::filter::{validate_filters, AccountFilter};
use crate::ledger::{wire_bytes, Account, Commitment, KeyedAccount, Ledger, SignatureStatus};

/// Preflight simulation failed.
const SEND_TRANSACTION_PREFLIGHT_FAILURE: i64 = -32002;
/// A signature did not verify.
const TRANSACTION_SIGNATURE_VERIFICATION_FAILURE: i64 = -32003;

// -- Response shapes ----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    fn into_ledger_error(self, method: &str) -> LedgerError {
        match self.code {
            SEND_TRANSACTION_PREFLIGHT_FAILURE | TRANSACTION_SIGNATURE_VERIFICATION_FAILURE => {
                let logs = self
                    .data
                    .as_ref()
                    .and_then(|d| d.get("logs"))
                    .and_then(Value::as_array)
                    .map(|lines| {
                        lines
                            .iter()
                            .filter_map(|l| l.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                LedgerError::Rejected {
                    reason: self.message,
                    logs,
                }
            }
            code => LedgerError::Rpc {
                method: method.to_string(),
                code,
                message: self.message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusValue {
    slot: u64,
    #[serde(default)]
    confirmation_status: Option<Commitment>,
    #[serde(default)]
    err: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UiAccount {
    /// `[payload, encoding]`.
    data: (String, String),
    owner: String,
}

#[derive(Debug, Deserialize)]
struct KeyedUiAccount {
    pubkey: String,
    account: UiAccount,
}

// -- Client -------------------------------------------------------------------

/// A ledger reached over HTTP JSON-RPC.
#[derive(Debug)]
pub struct RpcLedger {
    http: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl RpcLedger {
    /// Build a client from configuration.
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LedgerError::Transport {
                method: "client_init".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint this client talks to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, url = %self.url, "ledger request");

        let resp = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Http {
                method: method.to_string(),
                status,
                body,
            });
        }

        let envelope: RpcEnvelope<T> = resp.json().await.map_err(|e| LedgerError::Malformed {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(error) = envelope.error {
            return Err(error.into_ledger_error(method));
        }
        envelope.result.ok_or_else(|| LedgerError::Malformed {
            method: method.to_string(),
            reason: "response carries neither result nor error".into(),
        })
    }
}

fn malformed(method: &str, reason: impl std::fmt::Display) -> LedgerError {
    LedgerError::Malformed {
        method: method.to_string(),
        reason: reason.to_string(),
    }
}

fn decode_account(method: &str, ui: UiAccount) -> Result<Account, LedgerError> {
    let (payload, encoding) = ui.data;
    if encoding != "base58" {
        return Err(malformed(method, format!("unexpected data encoding {encoding:?}")));
    }
    let data = bs58::decode(&payload)
        .into_vec()
        .map_err(|e| malformed(method, format!("account data: {e}")))?;
    let owner: Pubkey = ui
        .owner
        .parse()
        .map_err(|e| malformed(method, format!("account owner: {e}")))?;
    Ok(Account { owner, data })
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn latest_blockhash(&self, commitment: Commitment) -> Result<Hash, LedgerError> {
        const METHOD: &str = "getLatestBlockhash";
        let resp: WithContext<BlockhashValue> = self
            .call(METHOD, json!([{ "commitment": commitment.as_str() }]))
            .await?;
        resp.value
            .blockhash
            .parse()
            .map_err(|e| malformed(METHOD, format!("blockhash: {e}")))
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        commitment: Commitment,
    ) -> Result<Signature, LedgerError> {
        const METHOD: &str = "sendTransaction";
        let wire = bs58::encode(wire_bytes(transaction)?).into_string();
        let signature: String = self
            .call(
                METHOD,
                json!([
                    wire,
                    {
                        "encoding": "base58",
                        "preflightCommitment": commitment.as_str(),
                    }
                ]),
            )
            .await?;
        signature
            .parse()
            .map_err(|e| malformed(METHOD, format!("signature: {e}")))
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        const METHOD: &str = "getSignatureStatuses";
        let resp: WithContext<Vec<Option<StatusValue>>> = self
            .call(
                METHOD,
                json!([[signature.to_string()], { "searchTransactionHistory": true }]),
            )
            .await?;
        let status = resp
            .value
            .into_iter()
            .next()
            .ok_or_else(|| malformed(METHOD, "empty status list"))?;
        Ok(status.map(|s| SignatureStatus {
            slot: s.slot,
            confirmation: s.confirmation_status,
            err: s.err.filter(|e| !e.is_null()).map(|e| e.to_string()),
        }))
    }

    async fn account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<Account>, LedgerError> {
        const METHOD: &str = "getAccountInfo";
        let resp: WithContext<Option<UiAccount>> = self
            .call(
                METHOD,
                json!([
                    address.to_string(),
                    { "encoding": "base58", "commitment": commitment.as_str() }
                ]),
            )
            .await?;
        resp.value.map(|ui| decode_account(METHOD, ui)).transpose()
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        commitment: Commitment,
    ) -> Result<Vec<KeyedAccount>, LedgerError> {
        const METHOD: &str = "getProgramAccounts";
        validate_filters(filters)?;
        let filters: Vec<Value> = filters.iter().map(AccountFilter::to_rpc_value).collect();
        let resp: Vec<KeyedUiAccount> = self
            .call(
                METHOD,
                json!([
                    program_id.to_string(),
                    {
                        "encoding": "base58",
                        "commitment": commitment.as_str(),
                        "filters": filters,
                    }
                ]),
            )
            .await?;
        resp.into_iter()
            .map(|keyed| {
                let address: Pubkey = keyed
                    .pubkey
                    .parse()
                    .map_err(|e| malformed(METHOD, format!("account address: {e}")))?;
                let account = decode_account(METHOD, keyed.account)?;
                Ok(KeyedAccount { address, account })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_failure_is_rejection() {
        let err = RpcErrorObject {
            code: -32002,
            message: "Transaction simulation failed".into(),
            data: Some(json!({ "logs": ["Program log: already in use", 7] })),
        };
        assert_eq!(
            err.into_ledger_error("sendTransaction"),
            LedgerError::Rejected {
                reason: "Transaction simulation failed".into(),
                logs: vec!["Program log: already in use".into()],
            }
        );
    }

    #[test]
    fn test_other_codes_stay_rpc_errors() {
        let err = RpcErrorObject {
            code: -32005,
            message: "Node is behind".into(),
            data: None,
        };
        assert!(matches!(
            err.into_ledger_error("getAccountInfo"),
            LedgerError::Rpc { code: -32005, .. }
        ));
    }

    #[test]
    fn test_decode_account_rejects_foreign_encoding() {
        let ui = UiAccount {
            data: ("AAAA".into(), "base64".into()),
            owner: solana_sdk::system_program::ID.to_string(),
        };
        assert!(matches!(
            decode_account("getAccountInfo", ui),
            Err(LedgerError::Malformed { .. })
        ));
    }
}
