//! REST client types and errors.

use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;
use crate::observability::logging::sanitize;

/// Business code the backend uses for success.
pub const SUCCESS_CODE: &str = "20000";

/// Path prefix appended to the configured API base.
pub const API_PREFIX: &str = "/api/app";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Attach `Authorization` from the token cache.
    pub auth: bool,
}

impl RequestOptions {
    pub fn authenticated() -> Self {
        Self { auth: true }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx status after retries were exhausted.
    #[error("{status} {path}")]
    Http { status: u16, path: String, body: String },

    #[error("Request to {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    #[error("Request to {path} failed: {reason}")]
    Network { path: String, reason: String },

    /// 2xx response whose `code` is not the success sentinel.
    #[error("{message}")]
    Business { code: String, message: String, body: Value },

    #[error("Invalid response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "API_HTTP_ERROR",
            Self::Timeout { .. } => "API_TIMEOUT",
            Self::Network { .. } => "API_NETWORK_ERROR",
            Self::Business { .. } => "API_BUSINESS_ERROR",
            Self::Decode { .. } => "API_DECODE_ERROR",
            Self::Auth(e) => e.code(),
        }
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Http { body, .. } if !body.is_empty() => Some(Value::String(body.clone())),
            Self::Business { body, .. } => Some(sanitize(body)),
            Self::Auth(e) => e.details(),
            _ => None,
        }
    }

    /// True for timeouts and transport failures.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
