//! Bearer token cache and signature-based token exchange.
//!
//! # Design Decisions
//! - One token slot, swapped atomically; readers never see a partial token
//! - Validity check and refresh are not serialized: concurrent callers near
//!   expiry may each exchange, and the last write wins
//! - 30 s safety margin before `expires_at`

use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::signature::{build_auth_payload, now_millis};
use crate::blockchain::client::is_truthy;
use crate::blockchain::types::BlockchainError;
use crate::config::schema::SkillConfig;
use crate::observability::metrics;

const TOKEN_PATH: &str = "/connect/token";
const GRANT_TYPE: &str = "signature";
const TOKEN_SCOPE: &str = "TomorrowDAOServer";
const TOKEN_CLIENT_ID: &str = "TomorrowDAOServer_App";

/// Tokens closer than this to expiry are refreshed.
pub const EXPIRY_MARGIN_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("A private key is required for authenticated APIs")]
    PrivateKeyRequired,

    #[error("Token request failed: {status}")]
    Http { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Transport(String),

    #[error("Token response missing access_token or expires_in")]
    ResponseInvalid { body: Value },

    /// Key parsing or signing failed while building the payload.
    #[error(transparent)]
    Signature(#[from] BlockchainError),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PrivateKeyRequired => "AUTH_PRIVATE_KEY_REQUIRED",
            Self::Http { .. } | Self::Transport(_) => "AUTH_HTTP_ERROR",
            Self::ResponseInvalid { .. } => "AUTH_RESPONSE_INVALID",
            Self::Signature(e) => e.code(),
        }
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Http { body, .. } if !body.is_empty() => Some(Value::String(body.clone())),
            Self::ResponseInvalid { body } => Some(body.clone()),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds as issued.
    pub expires_in: u64,
    /// Milliseconds since the Unix epoch.
    pub expires_at: u64,
}

impl AuthToken {
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        self.expires_at.saturating_sub(now_ms) > EXPIRY_MARGIN_MS
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_millis())
    }

    /// `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Parse a token endpoint response issued at `now_ms`.
///
/// Fields are read from the top level first, then from a nested `data`.
pub fn parse_token_response(body: &Value, now_ms: u64) -> Result<AuthToken, AuthError> {
    let field = |name: &str| {
        body.get(name)
            .filter(|v| is_truthy(v))
            .or_else(|| body.get("data").and_then(|d| d.get(name)).filter(|v| is_truthy(v)))
    };

    let access_token = field("access_token").and_then(Value::as_str);
    let token_type = field("token_type").and_then(Value::as_str).unwrap_or("Bearer");
    // Any truthy lifetime is accepted; one that is not a number yields an
    // already-expired token.
    let expires_in = field("expires_in").map(|v| match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    });

    match (access_token, expires_in) {
        (Some(access_token), Some(expires_in)) => {
            let expires_at = if expires_in.is_finite() {
                (now_ms as f64 + expires_in * 1000.0).max(0.0) as u64
            } else {
                0
            };
            Ok(AuthToken {
                access_token: access_token.to_string(),
                token_type: token_type.to_string(),
                expires_in: if expires_in.is_finite() { expires_in.max(0.0) as u64 } else { 0 },
                expires_at,
            })
        }
        _ => Err(AuthError::ResponseInvalid { body: redact_token(body) }),
    }
}

fn redact_token(body: &Value) -> Value {
    crate::observability::logging::sanitize(body)
}

/// Single-slot token cache backed by the token endpoint.
pub struct TokenCache {
    client: reqwest::Client,
    token_url: String,
    source: String,
    chain_id: String,
    ca_hash: Option<String>,
    private_key: Option<String>,
    timeout: Duration,
    slot: ArcSwapOption<AuthToken>,
}

impl TokenCache {
    pub fn new(config: &SkillConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            token_url: format!("{}{}", config.api.auth_base.trim_end_matches('/'), TOKEN_PATH),
            source: config.api.source.clone(),
            chain_id: config.chains.auth_chain_id.clone(),
            ca_hash: config.api.ca_hash.clone().filter(|h| !h.is_empty()),
            private_key: config.private_key.clone().filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_millis(config.http.timeout_ms),
            slot: ArcSwapOption::const_empty(),
        }
    }

    /// Cached token when still valid, otherwise a fresh exchange.
    pub async fn get_access_token(&self, force_refresh: bool) -> Result<Arc<AuthToken>, AuthError> {
        if !force_refresh {
            if let Some(token) = self.slot.load_full() {
                if token.is_valid() {
                    return Ok(token);
                }
            }
        }

        let token = Arc::new(self.exchange().await?);
        self.slot.store(Some(token.clone()));
        Ok(token)
    }

    /// Cached token without refreshing.
    pub fn cached(&self) -> Option<Arc<AuthToken>> {
        self.slot.load_full()
    }

    pub fn clear(&self) {
        self.slot.store(None);
    }

    async fn exchange(&self) -> Result<AuthToken, AuthError> {
        let private_key = self.private_key.as_deref().ok_or(AuthError::PrivateKeyRequired)?;
        let payload = build_auth_payload(private_key, None)?;

        let timestamp = payload.timestamp.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", GRANT_TYPE),
            ("scope", TOKEN_SCOPE),
            ("client_id", TOKEN_CLIENT_ID),
            ("timestamp", timestamp.as_str()),
            ("signature", payload.signature.as_str()),
            ("source", self.source.as_str()),
            ("publickey", payload.public_key.as_str()),
            ("chain_id", self.chain_id.as_str()),
            ("address", payload.address.as_str()),
        ];
        if let Some(ca_hash) = &self.ca_hash {
            form.push(("ca_hash", ca_hash.as_str()));
        }

        let mut request = self.client.post(&self.token_url).form(&form);
        if !self.timeout.is_zero() {
            request = request.timeout(self.timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_token_exchange("transport_error");
                return Err(AuthError::Transport(e.without_url().to_string()));
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            metrics::record_token_exchange("http_error");
            tracing::warn!(status = status.as_u16(), "Token exchange rejected");
            return Err(AuthError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let token = parse_token_response(&body, now_millis()).inspect_err(|_| {
            metrics::record_token_exchange("invalid_response");
        })?;

        metrics::record_token_exchange("success");
        tracing::debug!(
            address = %payload.address,
            expires_in = token.expires_in,
            "Access token refreshed"
        );
        Ok(token)
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.token_url)
            .field("has_private_key", &self.private_key.is_some())
            .field("cached", &self.slot.load().is_some())
            .finish()
    }
}
