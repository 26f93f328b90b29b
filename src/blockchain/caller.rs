//! Chain call orchestration.
//!
//! # Responsibilities
//! - Resolve chain → RPC URL → pooled node client → contract method
//! - Run read-only calls with a throwaway wallet
//! - Preview (simulate) or sign, broadcast and optionally wait (send)
//! - Pack method input for callers staging raw transactions
//!
//! # Design Decisions
//! - The RPC URL is checked before the pool is touched, so an unknown chain
//!   never constructs a client
//! - Simulate mode returns the preview before any lookup at all
//! - Broadcasts are never retried; resubmission is the caller's decision

use base64::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blockchain::client::{has_error_marker, is_truthy, ChainNode, ContractCall};
use crate::blockchain::pool::RpcClientPool;
use crate::blockchain::registry::{ContractRegistry, MethodDescriptor};
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, ContractCallRequest, ExecutionMode, SendOptions,
    SendOutcome, TxReceipt, WaitOptions, STATUS_SUBMITTED,
};
use crate::blockchain::waiter::{TxOutcome, TxWaiter};
use crate::blockchain::wallet::Wallet;
use crate::config::schema::SkillConfig;

pub struct ChainCaller {
    rpc: BTreeMap<String, String>,
    explorer: BTreeMap<String, String>,
    private_key: Option<String>,
    pool: Arc<RpcClientPool>,
    registry: Arc<ContractRegistry>,
    wait: WaitOptions,
}

impl ChainCaller {
    pub fn new(config: &SkillConfig, registry: ContractRegistry, pool: RpcClientPool) -> Self {
        Self {
            rpc: config.chains.rpc.clone(),
            explorer: config.chains.explorer.clone(),
            private_key: config.private_key.clone().filter(|k| !k.trim().is_empty()),
            pool: Arc::new(pool),
            registry: Arc::new(registry),
            wait: WaitOptions::default(),
        }
    }

    /// Default polling bounds for sends that wait for mining.
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    pub fn pool(&self) -> &RpcClientPool {
        &self.pool
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Configured RPC URL for a chain.
    pub fn rpc_url(&self, chain_id: &ChainId) -> BlockchainResult<&str> {
        self.rpc
            .get(chain_id.as_str())
            .map(String::as_str)
            .ok_or_else(|| BlockchainError::UnsupportedChain(format!("No rpc configured for {}", chain_id)))
    }

    fn resolve<'a>(
        &'a self,
        request: &ContractCallRequest,
    ) -> BlockchainResult<(Arc<dyn ChainNode>, &'a MethodDescriptor)> {
        let rpc_url = self.rpc_url(&request.chain_id)?;
        let node = self.pool.get(rpc_url);
        let method = self
            .registry
            .resolve(&request.contract_address, &request.method_name)?;
        Ok((node, method))
    }

    fn contract_call(request: &ContractCallRequest, method: &MethodDescriptor) -> BlockchainResult<ContractCall> {
        Ok(ContractCall {
            contract_address: request.contract_address.clone(),
            method_name: method.name.clone(),
            params: method.input.params(&method.name, &request.args)?,
        })
    }

    /// Read-only call. Returns `result` from the response when present.
    pub async fn call_view(&self, request: &ContractCallRequest) -> BlockchainResult<Value> {
        let (node, method) = self.resolve(request)?;
        let wallet = Wallet::random();
        let call = Self::contract_call(request, method)?;

        let raw = node.execute(&call, &wallet).await?;
        if has_error_marker(&raw) {
            return Err(BlockchainError::ContractView {
                method: request.method_name.clone(),
                raw,
            });
        }

        Ok(match raw {
            Value::Object(mut map) if map.get("result").is_some_and(|v| !v.is_null()) => {
                map.remove("result").unwrap_or(Value::Null)
            }
            other => other,
        })
    }

    /// State-changing call: preview in simulate mode, broadcast in send mode.
    pub async fn call_send(
        &self,
        request: &ContractCallRequest,
        options: &SendOptions,
    ) -> BlockchainResult<SendOutcome> {
        if options.mode == ExecutionMode::Simulate {
            return Ok(SendOutcome {
                tx: None,
                result: request.preview(),
                simulated: true,
            });
        }

        let private_key = options
            .private_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .or(self.private_key.as_deref())
            .ok_or(BlockchainError::SendPrivateKeyRequired)?;

        let (node, method) = self.resolve(request)?;
        let wallet = Wallet::from_private_key(private_key)?;
        let call = Self::contract_call(request, method)?;

        let raw = node.broadcast(&call, &wallet).await?;
        if has_error_marker(&raw) {
            return Err(BlockchainError::ContractSend {
                method: request.method_name.clone(),
                raw,
            });
        }

        let tx_id = match transaction_id(&raw) {
            Some(id) => id,
            None => return Err(BlockchainError::TxIdMissing { raw }),
        };

        tracing::info!(
            chain_id = %request.chain_id,
            method = %request.method_name,
            tx_id = %tx_id,
            "Transaction submitted"
        );

        let (status, logs) = if options.wait_for_mined != Some(false) {
            let waiter = TxWaiter::new(options.wait.unwrap_or(self.wait));
            let outcome = waiter.wait(&node, &tx_id).await?;
            let logs = outcome.logs();
            (outcome.status, Some(logs))
        } else {
            (STATUS_SUBMITTED.to_string(), None)
        };

        let explorer_url = self
            .explorer
            .get(request.chain_id.as_str())
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_id));

        Ok(SendOutcome {
            tx: Some(TxReceipt {
                tx_id,
                status,
                logs,
                explorer_url,
            }),
            result: raw,
            simulated: false,
        })
    }

    /// Base64 of the method's packed input bytes.
    pub fn pack_input(
        &self,
        chain_id: &ChainId,
        contract_address: &str,
        method_name: &str,
        args: &Value,
    ) -> BlockchainResult<String> {
        let request = ContractCallRequest::new(chain_id.clone(), contract_address, method_name, args.clone());
        let (_node, method) = self.resolve(&request)?;
        let packed = method
            .input
            .pack(method_name, args)?
            .ok_or_else(|| BlockchainError::PackInputUnsupported {
                method: method_name.to_string(),
            })?;
        Ok(BASE64_STANDARD.encode(packed))
    }

    /// Poll a transaction on the node behind `rpc_url`.
    pub async fn wait_for_tx_result(
        &self,
        rpc_url: &str,
        tx_id: &str,
        options: Option<WaitOptions>,
    ) -> BlockchainResult<TxOutcome> {
        let node = self.pool.get(rpc_url);
        TxWaiter::new(options.unwrap_or(self.wait)).wait(&node, tx_id).await
    }
}

impl std::fmt::Debug for ChainCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainCaller")
            .field("rpc", &self.rpc)
            .field("pool", &self.pool)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// `transactionId`, `TransactionId` or `result.TransactionId`, first truthy wins.
fn transaction_id(raw: &Value) -> Option<String> {
    [
        raw.get("transactionId"),
        raw.get("TransactionId"),
        raw.get("result").and_then(|r| r.get("TransactionId")),
    ]
    .into_iter()
    .flatten()
    .find(|v| is_truthy(v))
    .map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
