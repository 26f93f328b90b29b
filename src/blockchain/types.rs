//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Main chain identifier.
pub const AELF: &str = "AELF";

/// Side chain hosting the DAO contracts.
pub const TDVV: &str = "tDVV";

/// Chain identifier for strong typing.
///
/// Kept as a string so requests naming an unknown chain still type-check and
/// fail with [`BlockchainError::UnsupportedChain`] at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_main_chain(&self) -> bool {
        self.0 == AELF
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChainId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a state-changing call is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Preview only; nothing leaves the process.
    #[default]
    Simulate,
    /// Sign and broadcast.
    Send,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulate" => Ok(Self::Simulate),
            "send" => Ok(Self::Send),
            other => Err(format!("unknown execution mode '{}', expected simulate or send", other)),
        }
    }
}

/// One desired contract invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCallRequest {
    pub chain_id: ChainId,
    pub contract_address: String,
    pub method_name: String,
    #[serde(default)]
    pub args: Value,
}

impl ContractCallRequest {
    pub fn new(
        chain_id: impl Into<ChainId>,
        contract_address: impl Into<String>,
        method_name: impl Into<String>,
        args: Value,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            contract_address: contract_address.into(),
            method_name: method_name.into(),
            args,
        }
    }

    /// The preview payload returned by simulate mode.
    pub fn preview(&self) -> Value {
        json!({
            "chainId": self.chain_id,
            "contractAddress": self.contract_address,
            "methodName": self.method_name,
            "args": self.args,
        })
    }
}

/// Receipt attached to a successful send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

/// Status reported when the caller chose not to wait for mining.
pub const STATUS_SUBMITTED: &str = "SUBMITTED";

/// Polling bounds for the transaction waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            max_attempts: 30,
        }
    }
}

/// Options for [`ChainCaller::call_send`](crate::blockchain::ChainCaller::call_send).
#[derive(Clone, Default)]
pub struct SendOptions {
    pub mode: ExecutionMode,
    /// `None` means wait.
    pub wait_for_mined: Option<bool>,
    /// Overrides the configured key for this call only.
    pub private_key: Option<String>,
    pub wait: Option<WaitOptions>,
}

impl SendOptions {
    pub fn simulate() -> Self {
        Self::default()
    }

    pub fn send() -> Self {
        Self {
            mode: ExecutionMode::Send,
            ..Self::default()
        }
    }

    pub fn with_mode(mode: ExecutionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendOptions")
            .field("mode", &self.mode)
            .field("wait_for_mined", &self.wait_for_mined)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("wait", &self.wait)
            .finish()
    }
}

/// Result of `call_send`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub tx: Option<TxReceipt>,
    pub result: Value,
    pub simulated: bool,
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// No RPC endpoint or contract configured for the chain.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Private key is malformed.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Signing or key derivation failed.
    #[error("Signing failed: {0}")]
    Sign(String),

    #[error("Method {method} not found on contract {contract}")]
    MethodNotFound { contract: String, method: String },

    /// Arguments could not be encoded for the method.
    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArgs { method: String, reason: String },

    /// A read-only call returned an error marker.
    #[error("View call failed: {method}")]
    ContractView { method: String, raw: Value },

    /// A broadcast returned an error marker.
    #[error("Send failed: {method}")]
    ContractSend { method: String, raw: Value },

    #[error("A private key is required for execution mode send")]
    SendPrivateKeyRequired,

    #[error("Transaction id missing from contract send result")]
    TxIdMissing { raw: Value },

    /// No terminal status observed within the attempt bound.
    #[error("Transaction polling timeout: {tx_id}")]
    TxTimeout { tx_id: String },

    #[error("Method {method} does not support input packing")]
    PackInputUnsupported { method: String },

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),
}

impl BlockchainError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedChain(_) => "UNSUPPORTED_CHAIN",
            Self::InvalidKey(_) => "INVALID_PRIVATE_KEY",
            Self::Sign(_) => "SIGN_ERROR",
            Self::MethodNotFound { .. } => "METHOD_NOT_FOUND",
            Self::InvalidArgs { .. } => "INVALID_INPUT",
            Self::ContractView { .. } => "CONTRACT_VIEW_ERROR",
            Self::ContractSend { .. } => "CONTRACT_SEND_ERROR",
            Self::SendPrivateKeyRequired => "SEND_PRIVATE_KEY_REQUIRED",
            Self::TxIdMissing { .. } => "TX_ID_MISSING",
            Self::TxTimeout { .. } => "TX_TIMEOUT",
            Self::PackInputUnsupported { .. } => "PACK_INPUT_UNSUPPORTED",
            Self::Rpc(_) => "RPC_ERROR",
        }
    }

    /// Raw chain response carried by the error, if any.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::ContractView { raw, .. }
            | Self::ContractSend { raw, .. }
            | Self::TxIdMissing { raw } => Some(raw.clone()),
            _ => None,
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
