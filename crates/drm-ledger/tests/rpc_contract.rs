//! Contract tests for `RpcLedger` against the ledger's JSON-RPC interface.
//!
//! wiremock stands in for the RPC node. Each test pins the request method
//! and parameters the client sends and the response shapes it must accept.
//!
//! | Method | Test |
//! |--------|------|
//! | `getLatestBlockhash` | `latest_blockhash_*` |
//! | `sendTransaction` | `send_transaction_*` |
//! | `getSignatureStatuses` | `signature_status_*` |
//! | `getAccountInfo` | `account_*` |
//! | `getProgramAccounts` | `program_accounts_*` |

use drm_core::{Hash, Pubkey};
use drm_ledger::{
    wire_bytes, AccountFilter, Commitment, Ledger, LedgerConfig, LedgerError, RpcLedger,
};
use serde_json::{json, Value};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROGRAM: &str = "6CTtHe2u4robZvXvP1SbdhKrRvZzYszAurBD7wxMydji";
const OWNER: &str = "GDfeT17oazw8ep1W17V4BCpQroQywhKHfhU2xhNMaz17";
const AT: Commitment = Commitment::Confirmed;

fn test_client(mock_server: &MockServer) -> RpcLedger {
    let config = LedgerConfig {
        rpc_url: mock_server.uri().parse().unwrap(),
        program_id: PROGRAM.parse().unwrap(),
        commitment: Commitment::Confirmed,
        timeout_secs: 5,
        confirm_timeout_secs: 5,
        poll_interval_ms: 10,
    };
    RpcLedger::new(&config).unwrap()
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

fn rpc_error(error: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "error": error }))
}

async fn last_request_body(mock_server: &MockServer) -> Value {
    let requests = mock_server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

fn signed_transaction() -> Transaction {
    let payer = keypair_from_seed(&[11; 32]).unwrap();
    let ix = Instruction::new_with_bytes(
        PROGRAM.parse().unwrap(),
        &[1, 2, 3],
        vec![AccountMeta::new(payer.pubkey(), true)],
    );
    let blockhash = Hash::new_from_array([4; 32]);
    let msg = Message::new_with_blockhash(&[ix], Some(&payer.pubkey()), &blockhash);
    Transaction::new(&[&payer], msg, blockhash)
}

fn first_signature(tx: &Transaction) -> Signature {
    tx.signatures[0]
}

// ── getLatestBlockhash ───────────────────────────────────────────────

#[tokio::test]
async fn latest_blockhash_parses_value() {
    let mock_server = MockServer::start().await;
    let blockhash = Hash::new_from_array([4; 32]).to_string();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getLatestBlockhash" })))
        .respond_with(rpc_result(json!({
            "context": { "slot": 2792 },
            "value": { "blockhash": blockhash, "lastValidBlockHeight": 3090 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert_eq!(
        client.latest_blockhash(AT).await.unwrap(),
        Hash::new_from_array([4; 32])
    );

    let body = last_request_body(&mock_server).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["params"][0]["commitment"], "confirmed");
}

// ── sendTransaction ──────────────────────────────────────────────────

#[tokio::test]
async fn send_transaction_posts_base58_wire_form() {
    let mock_server = MockServer::start().await;
    let tx = signed_transaction();
    let signature = first_signature(&tx).to_string();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "sendTransaction" })))
        .respond_with(rpc_result(json!(signature)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let returned = client.send_transaction(&tx, AT).await.unwrap();
    assert_eq!(returned, first_signature(&tx));

    let body = last_request_body(&mock_server).await;
    let wire = bs58::decode(body["params"][0].as_str().unwrap()).into_vec().unwrap();
    assert_eq!(wire, wire_bytes(&tx).unwrap());
    let decoded: Transaction = bincode::deserialize(&wire).unwrap();
    assert_eq!(decoded, tx);
    assert_eq!(body["params"][1]["encoding"], "base58");
    assert_eq!(body["params"][1]["preflightCommitment"], "confirmed");
}

#[tokio::test]
async fn send_transaction_unsigned_never_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let unsigned = Transaction::new_unsigned(signed_transaction().message);
    assert!(matches!(
        client.send_transaction(&unsigned, AT).await,
        Err(LedgerError::InvalidTransaction(_))
    ));
}

#[tokio::test]
async fn send_transaction_preflight_failure_is_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_error(json!({
            "code": -32002,
            "message": "Transaction simulation failed: Error processing Instruction 0: custom program error: 0x0",
            "data": {
                "err": { "InstructionError": [0, { "Custom": 0 }] },
                "logs": [
                    "Program 6CTtHe2u4robZvXvP1SbdhKrRvZzYszAurBD7wxMydji invoke [1]",
                    "Allocate: account Address { address: C81f..., base: None } already in use"
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    match client.send_transaction(&signed_transaction(), AT).await.unwrap_err() {
        LedgerError::Rejected { reason, logs } => {
            assert!(reason.starts_with("Transaction simulation failed"));
            assert_eq!(logs.len(), 2);
            assert!(logs[1].contains("already in use"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

// ── getSignatureStatuses ─────────────────────────────────────────────

#[tokio::test]
async fn signature_status_unknown_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getSignatureStatuses" })))
        .respond_with(rpc_result(json!({ "context": { "slot": 82 }, "value": [null] })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let tx = signed_transaction();
    assert_eq!(client.signature_status(&first_signature(&tx)).await.unwrap(), None);

    let body = last_request_body(&mock_server).await;
    assert_eq!(body["params"][1]["searchTransactionHistory"], true);
}

#[tokio::test]
async fn signature_status_reports_commitment_and_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "context": { "slot": 82 },
            "value": [{
                "slot": 72,
                "confirmations": 10,
                "err": { "InstructionError": [0, { "Custom": 0 }] },
                "status": { "Err": { "InstructionError": [0, { "Custom": 0 }] } },
                "confirmationStatus": "confirmed"
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let tx = signed_transaction();
    let status = client
        .signature_status(&first_signature(&tx))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.slot, 72);
    assert_eq!(status.confirmation, Some(Commitment::Confirmed));
    assert!(status.err.unwrap().contains("InstructionError"));
}

// ── getAccountInfo ───────────────────────────────────────────────────

#[tokio::test]
async fn account_missing_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getAccountInfo" })))
        .respond_with(rpc_result(json!({ "context": { "slot": 1 }, "value": null })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let owner: Pubkey = OWNER.parse().unwrap();
    assert_eq!(client.account(&owner, AT).await.unwrap(), None);
}

#[tokio::test]
async fn account_uses_commitment_of_each_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getAccountInfo" })))
        .respond_with(rpc_result(json!({ "context": { "slot": 1 }, "value": null })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let owner: Pubkey = OWNER.parse().unwrap();
    client.account(&owner, Commitment::Finalized).await.unwrap();
    let body = last_request_body(&mock_server).await;
    assert_eq!(body["params"][1]["commitment"], "finalized");

    client.account(&owner, Commitment::Processed).await.unwrap();
    let body = last_request_body(&mock_server).await;
    assert_eq!(body["params"][1]["commitment"], "processed");
}

#[tokio::test]
async fn account_decodes_base58_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getAccountInfo" })))
        .respond_with(rpc_result(json!({
            "context": { "slot": 1 },
            "value": {
                "data": [bs58::encode([1u8, 2, 3, 4]).into_string(), "base58"],
                "executable": false,
                "lamports": 1_315_440,
                "owner": PROGRAM,
                "rentEpoch": 18_446_744_073_709_551_615u64,
                "space": 4
            }
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let owner: Pubkey = OWNER.parse().unwrap();
    let account = client.account(&owner, AT).await.unwrap().unwrap();
    assert_eq!(account.data, vec![1, 2, 3, 4]);
    assert_eq!(account.owner.to_string(), PROGRAM);

    let body = last_request_body(&mock_server).await;
    assert_eq!(body["params"][0], OWNER);
    assert_eq!(body["params"][1]["encoding"], "base58");
}

// ── getProgramAccounts ───────────────────────────────────────────────

#[tokio::test]
async fn program_accounts_sends_filters_and_decodes() {
    let mock_server = MockServer::start().await;
    let address = Pubkey::new_from_array([8; 32]).to_string();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getProgramAccounts" })))
        .respond_with(rpc_result(json!([{
            "pubkey": address,
            "account": {
                "data": [bs58::encode([9u8; 61]).into_string(), "base58"],
                "executable": false,
                "lamports": 1_315_440,
                "owner": PROGRAM,
                "rentEpoch": 0,
                "space": 61
            }
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let owner: Pubkey = OWNER.parse().unwrap();
    let filters = [
        AccountFilter::DataSize(61),
        AccountFilter::memcmp(12, owner.to_bytes().to_vec()),
    ];
    let found = client
        .program_accounts(&PROGRAM.parse().unwrap(), &filters, AT)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].address.to_string(), address);
    assert_eq!(found[0].account.data, vec![9u8; 61]);

    let body = last_request_body(&mock_server).await;
    assert_eq!(body["params"][0], PROGRAM);
    assert_eq!(body["params"][1]["commitment"], "confirmed");
    assert_eq!(
        body["params"][1]["filters"],
        json!([
            { "dataSize": 61 },
            { "memcmp": { "offset": 12, "bytes": OWNER, "encoding": "base58" } }
        ])
    );
}

#[tokio::test]
async fn program_accounts_invalid_filters_never_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_result(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let filters = [AccountFilter::DataSize(20), AccountFilter::memcmp(12, vec![1; 32])];
    assert!(matches!(
        client.program_accounts(&PROGRAM.parse().unwrap(), &filters, AT).await,
        Err(LedgerError::InvalidFilter(_))
    ));
}

// ── Transport and protocol failures ──────────────────────────────────

#[tokio::test]
async fn http_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    match client.latest_blockhash(AT).await.unwrap_err() {
        LedgerError::Http { status, body, .. } => {
            assert_eq!(status, 429);
            assert_eq!(body, "Too many requests");
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn rpc_error_object_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(rpc_error(json!({ "code": -32602, "message": "Invalid param: WrongSize" })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let owner: Pubkey = OWNER.parse().unwrap();
    assert_eq!(
        client.account(&owner, AT).await.unwrap_err(),
        LedgerError::Rpc {
            method: "getAccountInfo".into(),
            code: -32602,
            message: "Invalid param: WrongSize".into(),
        }
    );
}

#[tokio::test]
async fn garbage_body_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(matches!(
        client.latest_blockhash(AT).await,
        Err(LedgerError::Malformed { .. })
    ));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_failure() {
    let config = LedgerConfig::local(1, PROGRAM.parse().unwrap()).unwrap();
    let client = RpcLedger::new(&config).unwrap();
    assert!(matches!(
        client.latest_blockhash(AT).await,
        Err(LedgerError::Transport { .. })
    ));
}
