//! Error taxonomy and the tool result envelope.
//!
//! Every layer keeps its own error enum; [`SkillError`] aggregates them at
//! the tool boundary, where [`ToolResult::fail`] turns any of them into the
//! uniform `{success: false, error: {code, message, details?}}` shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;
use crate::blockchain::types::{BlockchainError, TxReceipt};
use crate::config::ConfigError;
use crate::http::ApiError;
use crate::observability::logging::sanitize;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    /// Missing, empty or inconsistent tool input.
    #[error("{0}")]
    InvalidInput(String),
}

impl SkillError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Auth(e) => e.code(),
            Self::Api(e) => e.code(),
            Self::Chain(e) => e.code(),
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Diagnostic payload with secrets masked.
    pub fn details(&self) -> Option<Value> {
        let details = match self {
            Self::Auth(e) => e.details(),
            Self::Api(e) => e.details(),
            Self::Chain(e) => e.details(),
            Self::Config(_) | Self::InvalidInput(_) => None,
        };
        details.map(|d| sanitize(&d))
    }
}

pub type SkillResult<T> = Result<T, SkillError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&SkillError> for ToolError {
    fn from(err: &SkillError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx: Option<TxReceipt>,
}

impl<T> ToolResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            trace_id: None,
            tx: None,
        }
    }

    /// Failure envelope; never carries data or a receipt.
    pub fn fail(err: &SkillError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ToolError::from(err)),
            trace_id: None,
            tx: None,
        }
    }

    pub fn with_tx(mut self, tx: Option<TxReceipt>) -> Self {
        if self.success {
            self.tx = tx;
        }
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// `value` unless it is null or an empty string.
pub fn require_value<'a>(value: &'a Value, name: &str) -> SkillResult<&'a Value> {
    match value {
        Value::Null => Err(SkillError::invalid_input(format!("{} is required", name))),
        Value::String(s) if s.is_empty() => Err(SkillError::invalid_input(format!("{} is required", name))),
        v => Ok(v),
    }
}

/// Non-empty string input.
pub fn require_text<'a>(value: &'a str, name: &str) -> SkillResult<&'a str> {
    if value.is_empty() {
        Err(SkillError::invalid_input(format!("{} is required", name)))
    } else {
        Ok(value)
    }
}

/// `value[name]` when present and non-empty, else `INVALID_INPUT`.
pub fn require_field<'a>(value: &'a Value, name: &str) -> SkillResult<&'a Value> {
    require_value(value.get(name).unwrap_or(&Value::Null), name)
}

/// Required string field.
pub fn require_str<'a>(value: &'a Value, name: &str) -> SkillResult<&'a str> {
    require_field(value, name)?
        .as_str()
        .ok_or_else(|| SkillError::invalid_input(format!("{} must be a string", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fail_envelope_shape() {
        let err = SkillError::from(BlockchainError::ContractSend {
            method: "Vote".into(),
            raw: json!({"Error": "denied", "privateKey": "abc"}),
        });
        let result: ToolResult<Value> = ToolResult::fail(&err).with_trace_id("trace-1");
        let rendered = serde_json::to_value(&result).unwrap();
        assert_eq!(rendered["success"], false);
        assert_eq!(rendered["traceId"], "trace-1");
        assert_eq!(rendered["error"]["code"], "CONTRACT_SEND_ERROR");
        assert_eq!(rendered["error"]["details"]["privateKey"], "[REDACTED]");
        assert!(rendered.get("data").is_none());
        assert!(rendered.get("tx").is_none());
    }

    #[test]
    fn test_failure_never_carries_tx() {
        let err = SkillError::invalid_input("x");
        let receipt = TxReceipt {
            tx_id: "t".into(),
            status: "MINED".into(),
            logs: None,
            explorer_url: None,
        };
        let result: ToolResult<Value> = ToolResult::fail(&err).with_tx(Some(receipt.clone()));
        assert!(result.tx.is_none());
        let result = ToolResult::ok(json!(1)).with_tx(Some(receipt));
        assert_eq!(result.tx.unwrap().tx_id, "t");
    }

    #[test]
    fn test_require_field() {
        let input = json!({"a": "x", "b": "", "c": null, "d": 0});
        assert_eq!(require_str(&input, "a").unwrap(), "x");
        assert_eq!(require_field(&input, "b").unwrap_err().code(), "INVALID_INPUT");
        assert!(require_field(&input, "c").is_err());
        assert!(require_field(&input, "missing").is_err());
        assert_eq!(require_field(&input, "d").unwrap(), &json!(0));
        assert!(require_str(&input, "d").is_err());
        assert!(require_text("", "comment").is_err());
        assert!(require_value(&json!({}), "args").is_ok());
    }

    #[test]
    fn test_nested_codes_pass_through() {
        let err = SkillError::from(ApiError::Auth(AuthError::PrivateKeyRequired));
        assert_eq!(err.code(), "AUTH_PRIVATE_KEY_REQUIRED");
        assert_eq!(err.to_string(), "A private key is required for authenticated APIs");
    }
}
