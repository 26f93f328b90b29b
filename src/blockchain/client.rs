//! Chain node transport.
//!
//! # Responsibilities
//! - Define the [`ChainNode`] seam the orchestrator talks through
//! - Speak the node web API over HTTP with a per-request timeout
//! - Hand node-reported failures back as raw JSON so callers can inspect them
//!
//! # Transaction flow
//! ```text
//! chainStatus (reference block)
//!     → rawTransaction (node assembles bytes from JSON params)
//!     → sign sha256(raw bytes)
//!     → executeRawTransaction (read-only) | sendRawTransaction (broadcast)
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

const CHAIN_STATUS_PATH: &str = "/api/blockChain/chainStatus";
const RAW_TRANSACTION_PATH: &str = "/api/blockChain/rawTransaction";
const EXECUTE_RAW_PATH: &str = "/api/blockChain/executeRawTransaction";
const SEND_RAW_PATH: &str = "/api/blockChain/sendRawTransaction";
const TX_RESULT_PATH: &str = "/api/blockChain/transactionResult";

/// A resolved contract invocation, ready for the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract_address: String,
    pub method_name: String,
    /// Protobuf-JSON encoded input.
    pub params: String,
}

/// A chain node client bound to one RPC URL.
#[async_trait]
pub trait ChainNode: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Read-only execution. Nothing is recorded on chain.
    async fn execute(&self, call: &ContractCall, wallet: &Wallet) -> BlockchainResult<Value>;

    /// Sign and broadcast. Returns the node's submission response.
    async fn broadcast(&self, call: &ContractCall, wallet: &Wallet) -> BlockchainResult<Value>;

    /// Current result record for a transaction id.
    async fn transaction_result(&self, tx_id: &str) -> BlockchainResult<Value>;
}

/// Node client over the HTTP web API.
#[derive(Clone)]
pub struct HttpChainNode {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpChainNode {
    pub fn new(endpoint: &str, timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> BlockchainResult<Value> {
        let response = request.timeout(self.timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                BlockchainError::Rpc(format!("{} timed out after {}ms", path, self.timeout.as_millis()))
            } else {
                BlockchainError::Rpc(format!("{} request failed: {}", path, e))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("{} body read failed: {}", path, e)))?;

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(value),
            Err(_) if status.is_success() => Ok(Value::String(text)),
            Err(_) => Err(BlockchainError::Rpc(format!(
                "{} returned HTTP {}: {}",
                path,
                status.as_u16(),
                truncate(&text, 256)
            ))),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> BlockchainResult<Value> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(request, path).await
    }

    async fn post(&self, path: &str, body: &Value) -> BlockchainResult<Value> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(request, path).await
    }

    async fn reference_block(&self) -> BlockchainResult<(u64, String)> {
        let status = self.get(CHAIN_STATUS_PATH, &[]).await?;
        let height = status
            .get("BestChainHeight")
            .and_then(Value::as_u64)
            .ok_or_else(|| BlockchainError::Rpc("chainStatus missing BestChainHeight".to_string()))?;
        let hash = status
            .get("BestChainHash")
            .and_then(Value::as_str)
            .ok_or_else(|| BlockchainError::Rpc("chainStatus missing BestChainHash".to_string()))?;
        Ok((height, hash.to_string()))
    }

    /// Builds and signs a raw transaction.
    ///
    /// `Err(body)` in the inner result is a node error response, passed
    /// through untouched.
    async fn signed_raw(
        &self,
        call: &ContractCall,
        wallet: &Wallet,
    ) -> BlockchainResult<Result<(String, String), Value>> {
        let (height, hash) = self.reference_block().await?;
        let body = json!({
            "From": wallet.address(),
            "To": call.contract_address,
            "RefBlockNumber": height,
            "RefBlockHash": hash,
            "MethodName": call.method_name,
            "Params": call.params,
        });
        let response = self.post(RAW_TRANSACTION_PATH, &body).await?;

        let raw = match response.get("RawTransaction").and_then(Value::as_str) {
            Some(raw) => raw.to_string(),
            None if has_error_field(&response) => return Ok(Err(response)),
            None => {
                return Err(BlockchainError::Rpc(
                    "rawTransaction response missing RawTransaction".to_string(),
                ))
            }
        };

        let bytes = hex::decode(&raw)
            .map_err(|e| BlockchainError::Rpc(format!("raw transaction is not hex: {}", e)))?;
        let signature = wallet.sign_message(&bytes)?;
        Ok(Ok((raw, signature)))
    }
}

#[async_trait]
impl ChainNode for HttpChainNode {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, call: &ContractCall, wallet: &Wallet) -> BlockchainResult<Value> {
        let (raw, signature) = match self.signed_raw(call, wallet).await? {
            Ok(signed) => signed,
            Err(node_error) => return Ok(node_error),
        };
        let body = json!({ "RawTransaction": raw, "Signature": signature });
        let response = self.post(EXECUTE_RAW_PATH, &body).await?;

        // Results may arrive as a JSON document encoded inside a string.
        Ok(match response {
            Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            other => other,
        })
    }

    async fn broadcast(&self, call: &ContractCall, wallet: &Wallet) -> BlockchainResult<Value> {
        let (raw, signature) = match self.signed_raw(call, wallet).await? {
            Ok(signed) => signed,
            Err(node_error) => return Ok(node_error),
        };
        let body = json!({
            "Transaction": raw,
            "Signature": signature,
            "ReturnTransaction": false,
        });
        let response = self.post(SEND_RAW_PATH, &body).await?;
        tracing::debug!(
            rpc_url = %self.endpoint,
            method = %call.method_name,
            tx_id = ?response.get("TransactionId"),
            "Transaction broadcast"
        );
        Ok(response)
    }

    async fn transaction_result(&self, tx_id: &str) -> BlockchainResult<Value> {
        self.get(TX_RESULT_PATH, &[("transactionId", tx_id)]).await
    }
}

impl std::fmt::Debug for HttpChainNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChainNode")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// True when the response carries a truthy `error`, `Error` or `code` field.
pub fn has_error_marker(value: &Value) -> bool {
    ["error", "Error", "code"]
        .iter()
        .any(|key| value.get(key).is_some_and(is_truthy))
}

fn has_error_field(value: &Value) -> bool {
    value.get("Error").is_some_and(is_truthy) || value.get("error").is_some_and(is_truthy)
}

/// Loose truthiness: null, false, 0, "" and NaN are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
