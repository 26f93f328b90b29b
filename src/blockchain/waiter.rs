//! Transaction confirmation polling.
//!
//! Bounded by attempt count, not wall clock: `poll_interval * max_attempts`
//! is the effective deadline. Node errors during polling are treated like a
//! pending status so a transient RPC failure never surfaces to the caller.

use serde_json::Value;
use std::sync::Arc;

use crate::blockchain::client::ChainNode;
use crate::blockchain::types::{BlockchainError, BlockchainResult, WaitOptions};
use crate::observability::metrics;

/// Statuses that mean the chain has not finished with the transaction.
pub const NON_TERMINAL_STATUSES: [&str; 3] = ["PENDING", "PENDING_VALIDATION", "NOTEXISTED"];

/// Terminal status and the normalized result record.
#[derive(Debug, Clone, PartialEq)]
pub struct TxOutcome {
    pub status: String,
    pub raw: Value,
}

impl TxOutcome {
    /// `Logs` or `logs` from the result record, empty when neither is present.
    pub fn logs(&self) -> Vec<Value> {
        self.raw
            .get("Logs")
            .or_else(|| self.raw.get("logs"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// Unwraps a `result` envelope when present.
pub fn normalize_result(response: Value) -> Value {
    match response {
        Value::Object(mut map) if map.get("result").is_some_and(Value::is_object) => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Uppercased `Status` when it is terminal.
pub fn terminal_status(record: &Value) -> Option<String> {
    let status = record
        .get("Status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_uppercase();
    if status.is_empty() || NON_TERMINAL_STATUSES.contains(&status.as_str()) {
        None
    } else {
        Some(status)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TxWaiter {
    options: WaitOptions,
}

impl TxWaiter {
    pub fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> WaitOptions {
        self.options
    }

    /// Poll until a terminal status or the attempt bound.
    pub async fn wait(&self, node: &Arc<dyn ChainNode>, tx_id: &str) -> BlockchainResult<TxOutcome> {
        let WaitOptions {
            poll_interval,
            max_attempts,
        } = self.options;

        for attempt in 1..=max_attempts {
            match node.transaction_result(tx_id).await {
                Ok(response) => {
                    let record = normalize_result(response);
                    let status = terminal_status(&record);
                    metrics::record_tx_poll(status.as_deref().unwrap_or("PENDING"));
                    if let Some(status) = status {
                        tracing::debug!(tx_id = %tx_id, status = %status, attempt, "Transaction settled");
                        return Ok(TxOutcome { status, raw: record });
                    }
                }
                Err(e) => {
                    metrics::record_tx_poll("ERROR");
                    tracing::debug!(tx_id = %tx_id, attempt, error = %e, "Transaction result poll failed");
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(poll_interval).await;
            }
        }

        tracing::warn!(tx_id = %tx_id, max_attempts, "Transaction polling timed out");
        Err(BlockchainError::TxTimeout {
            tx_id: tx_id.to_string(),
        })
    }
}
