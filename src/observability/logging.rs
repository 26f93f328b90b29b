//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Redact secrets from JSON before it reaches a log line or an error detail
//!
//! # Design Decisions
//! - Logs go to stderr; stdout carries tool results only
//! - JSON lines by default, human-readable output on request
//! - `RUST_LOG` wins over the configured level

use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const REDACTED: &str = "[REDACTED]";

/// Field-name fragments whose values are always masked. Matched against the
/// lowercased name with `_` and `-` removed.
const SECRET_FRAGMENTS: [&str; 3] = ["privatekey", "accesstoken", "authorization"];

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(parse_level(level)));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = %parse_level(level), json, "Logging initialized");
    }
}

/// Normalize a configured level; unknown values fall back to `error`.
pub fn parse_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" | "silent" => "off",
        _ => "error",
    }
}

/// True for names like `privateKey`, `access_token`, `Authorization` or `refreshToken`.
pub fn is_secret_key(key: &str) -> bool {
    let key: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    key.ends_with("token") || SECRET_FRAGMENTS.iter().any(|fragment| key.contains(fragment))
}

/// Mask `value` when `key` names a secret.
pub fn redact(key: &str, value: &Value) -> Value {
    if is_secret_key(key) {
        Value::String(REDACTED.to_string())
    } else {
        sanitize(value)
    }
}

/// Deep copy of `value` with every secret-named field masked.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact(k, v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}
