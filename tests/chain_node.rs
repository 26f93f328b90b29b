//! Node web API flow and the chain call orchestrator against a mock node.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tmrwdao_skill::blockchain::{
    ChainCaller, ChainNode, ContractCall, ContractCallRequest, ContractRegistry, HttpChainNode, RpcClientPool,
    SendOptions, WaitOptions, Wallet,
};
use tmrwdao_skill::config::SkillConfig;
use tmrwdao_skill::domains::chain::{self, ContractInput, TxResultInput};
use tmrwdao_skill::SkillContext;

mod common;

const TOKEN_CONTRACT: &str = "JRmBduh4nXWi1aXgdUsj5gJrzeZb2LxmrAbf7W99faZSvoAaE";
const RAW_TX: &str = "0a220a20aabbccdd";

/// Minimal node: chain status, raw transaction assembly, execution,
/// broadcast, and a result that turns MINED on the second poll.
async fn start_node(execute_body: &'static str) -> common::MockBackend {
    let polls = Arc::new(AtomicU32::new(0));
    common::start_programmable_backend(move |request| {
        let polls = polls.clone();
        async move {
            match request.path_only() {
                "/api/blockChain/chainStatus" => (
                    200,
                    r#"{"ChainId":"AELF","BestChainHeight":1024,"BestChainHash":"abc"}"#.to_string(),
                ),
                "/api/blockChain/rawTransaction" => (200, format!(r#"{{"RawTransaction":"{}"}}"#, RAW_TX)),
                "/api/blockChain/executeRawTransaction" => (200, execute_body.to_string()),
                "/api/blockChain/sendRawTransaction" => (200, r#"{"TransactionId":"tx-1"}"#.to_string()),
                "/api/blockChain/transactionResult" => {
                    let status = if polls.fetch_add(1, Ordering::SeqCst) == 0 {
                        "PENDING"
                    } else {
                        "MINED"
                    };
                    (
                        200,
                        json!({"TransactionId": "tx-1", "Status": status, "Logs": [{"Name": "Transferred"}]})
                            .to_string(),
                    )
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await
}

fn caller_for(config: &SkillConfig) -> ChainCaller {
    let book = config.contract_book().unwrap();
    ChainCaller::new(
        config,
        ContractRegistry::from_book(&book),
        RpcClientPool::http(8, Duration::from_secs(5), common::test_client()),
    )
    .with_wait_options(WaitOptions {
        poll_interval: Duration::from_millis(5),
        max_attempts: 5,
    })
}

fn transfer_call() -> ContractCall {
    ContractCall {
        contract_address: TOKEN_CONTRACT.to_string(),
        method_name: "Transfer".to_string(),
        params: r#"{"to":"x","symbol":"ELF","amount":"1"}"#.to_string(),
    }
}

#[tokio::test]
async fn test_raw_transaction_request_shape() {
    let backend = start_node(r#""{\"balance\":\"7\"}""#).await;
    let node = HttpChainNode::new(&backend.url(), Duration::from_secs(5), common::test_client());
    let wallet = Wallet::from_private_key(common::TEST_PRIVATE_KEY).unwrap();

    let value = node.execute(&transfer_call(), &wallet).await.unwrap();
    // JSON text inside a JSON string is decoded.
    assert_eq!(value, json!({"balance": "7"}));

    let requests = backend.requests();
    let raw = requests
        .iter()
        .find(|r| r.path_only() == "/api/blockChain/rawTransaction")
        .unwrap()
        .json();
    assert_eq!(raw["From"], wallet.address());
    assert_eq!(raw["To"], TOKEN_CONTRACT);
    assert_eq!(raw["RefBlockNumber"], 1024);
    assert_eq!(raw["RefBlockHash"], "abc");
    assert_eq!(raw["MethodName"], "Transfer");

    let executed = requests
        .iter()
        .find(|r| r.path_only() == "/api/blockChain/executeRawTransaction")
        .unwrap()
        .json();
    assert_eq!(executed["RawTransaction"], RAW_TX);
    let expected = wallet.sign_message(&hex::decode(RAW_TX).unwrap()).unwrap();
    assert_eq!(executed["Signature"], expected);
}

#[tokio::test]
async fn test_node_error_body_passes_through() {
    let backend = common::start_programmable_backend(|request| async move {
        match request.path_only() {
            "/api/blockChain/chainStatus" => (200, r#"{"BestChainHeight":1,"BestChainHash":"h"}"#.to_string()),
            _ => (500, r#"{"Error":{"Code":"20001","Message":"Invalid params"}}"#.to_string()),
        }
    })
    .await;
    let node = HttpChainNode::new(&backend.url(), Duration::from_secs(5), common::test_client());

    let value = node.broadcast(&transfer_call(), &Wallet::random()).await.unwrap();
    assert_eq!(value["Error"]["Message"], "Invalid params");
    assert_eq!(backend.hits("/api/blockChain/sendRawTransaction"), 0);
}

#[tokio::test]
async fn test_unreachable_node_is_rpc_error() {
    let node = HttpChainNode::new("http://127.0.0.1:1", Duration::from_secs(2), common::test_client());
    let err = node.transaction_result("tx").await.unwrap_err();
    assert_eq!(err.code(), "RPC_ERROR");
}

#[tokio::test]
async fn test_view_unwraps_result() {
    let backend = start_node(r#"{"result":{"allowance":"500"}}"#).await;
    let caller = caller_for(&common::config_for(&backend));

    let request = ContractCallRequest::new(
        "AELF",
        TOKEN_CONTRACT,
        "GetAllowance",
        json!({"symbol": "ELF", "owner": "a", "spender": "b"}),
    );
    let value = caller.call_view(&request).await.unwrap();
    assert_eq!(value, json!({"allowance": "500"}));
    assert_eq!(caller.pool().len(), 1);
}

#[tokio::test]
async fn test_view_error_marker() {
    let backend = start_node(r#"{"Error":{"Message":"Contract not found"}}"#).await;
    let caller = caller_for(&common::config_for(&backend));

    let request = ContractCallRequest::new("AELF", TOKEN_CONTRACT, "GetBalance", json!({"symbol": "ELF"}));
    let err = caller.call_view(&request).await.unwrap_err();
    assert_eq!(err.code(), "CONTRACT_VIEW_ERROR");
    assert_eq!(err.details().unwrap()["Error"]["Message"], "Contract not found");
}

#[tokio::test]
async fn test_send_polls_until_mined() {
    let backend = start_node("{}").await;
    let caller = caller_for(&common::config_for(&backend));

    let request = ContractCallRequest::new(
        "AELF",
        TOKEN_CONTRACT,
        "Transfer",
        json!({"to": "x", "symbol": "ELF", "amount": "1"}),
    );
    let outcome = caller.call_send(&request, &SendOptions::send()).await.unwrap();

    let tx = outcome.tx.unwrap();
    assert_eq!(tx.tx_id, "tx-1");
    assert_eq!(tx.status, "MINED");
    assert_eq!(tx.logs, Some(vec![json!({"Name": "Transferred"})]));
    assert_eq!(tx.explorer_url.as_deref(), Some("https://aelfscan.io/AELF/tx/tx-1"));
    assert_eq!(backend.hits("/api/blockChain/transactionResult"), 2);

    let sent = backend
        .requests()
        .into_iter()
        .find(|r| r.path_only() == "/api/blockChain/sendRawTransaction")
        .unwrap()
        .json();
    assert_eq!(sent["Transaction"], RAW_TX);
    assert_eq!(sent["ReturnTransaction"], false);
}

#[tokio::test]
async fn test_send_tool_without_waiting() {
    let backend = start_node("{}").await;
    let ctx = SkillContext::with_http_client(common::config_for(&backend), common::test_client()).unwrap();

    let input: ContractInput = serde_json::from_value(json!({
        "chainId": "AELF",
        "contractAddress": TOKEN_CONTRACT,
        "methodName": "Transfer",
        "args": {"to": "x", "symbol": "ELF", "amount": "1"},
        "mode": "send",
        "noWait": true,
    }))
    .unwrap();
    let result = chain::contract_send(&ctx, input).await;

    assert!(result.success);
    let tx = result.tx.unwrap();
    assert_eq!(tx.tx_id, "tx-1");
    assert_eq!(tx.status, "SUBMITTED");
    assert_eq!(backend.hits("/api/blockChain/transactionResult"), 0);
}

#[tokio::test]
async fn test_tx_result_tool() {
    let backend = start_node("{}").await;
    let ctx = SkillContext::with_http_client(common::config_for(&backend), common::test_client()).unwrap();

    let input = TxResultInput {
        chain_id: "AELF".into(),
        tx_id: "tx-1".into(),
        poll_interval_ms: Some(5),
        max_attempts: Some(4),
    };
    let result = chain::tx_result(&ctx, input).await;

    let data: Value = result.data.unwrap();
    assert_eq!(data["status"], "MINED");
    assert_eq!(data["result"]["TransactionId"], "tx-1");
    assert_eq!(
        backend.requests()[0].query().get("transactionId").map(String::as_str),
        Some("tx-1")
    );
}

#[tokio::test]
async fn test_tx_result_timeout() {
    let backend = common::start_mock_backend(200, r#"{"Status":"PENDING"}"#).await;
    let ctx = SkillContext::with_http_client(common::config_for(&backend), common::test_client()).unwrap();

    let input = TxResultInput {
        chain_id: "AELF".into(),
        tx_id: "slow".into(),
        poll_interval_ms: Some(1),
        max_attempts: Some(3),
    };
    let result = chain::tx_result(&ctx, input).await;

    assert_eq!(result.error.unwrap().code, "TX_TIMEOUT");
    assert_eq!(backend.hits("/api/blockChain/transactionResult"), 3);
}
