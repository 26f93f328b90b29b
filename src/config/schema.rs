//! Configuration schema definitions.
//!
//! All sections derive Serde traits and default every field, so an empty
//! TOML document is a complete configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::blockchain::types::{AELF, TDVV};

/// Root configuration.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SkillConfig {
    /// REST backend and token endpoint.
    pub api: ApiConfig,

    /// Chain endpoints, explorers and contract overrides.
    pub chains: ChainsConfig,

    /// Timeout and retry policy for REST calls.
    pub http: HttpConfig,

    pub observability: ObservabilityConfig,

    /// Signing key. Never serialized.
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
}

impl std::fmt::Debug for SkillConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillConfig")
            .field("api", &self.api)
            .field("chains", &self.chains)
            .field("http", &self.http)
            .field("observability", &self.observability)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// REST base; requests go to `{api_base}/api/app`.
    pub api_base: String,

    /// Token endpoint base; `{auth_base}/connect/token`.
    pub auth_base: String,

    /// Wallet source reported during token exchange.
    pub source: String,

    /// Portkey CA hash, forwarded when present.
    pub ca_hash: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.tmrwdao.com".to_string(),
            auth_base: "https://api.tmrwdao.com".to_string(),
            source: "nightElf".to_string(),
            ca_hash: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainsConfig {
    /// Chain id → node RPC URL.
    pub rpc: BTreeMap<String, String>,

    /// Chain id → block explorer base URL.
    pub explorer: BTreeMap<String, String>,

    pub default_dao_chain: String,
    pub default_network_chain: String,

    /// Chain id sent with token exchange requests.
    pub auth_chain_id: String,

    /// Maximum cached node clients (floored at 1).
    pub rpc_pool_max: usize,

    /// Per-request node timeout in milliseconds.
    pub rpc_timeout_ms: u64,

    /// Chain id → contract name → address, layered over the built-in book.
    pub contracts: BTreeMap<String, BTreeMap<String, String>>,
}

impl ChainsConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            rpc: BTreeMap::from([
                (AELF.to_string(), "https://aelf-public-node.aelf.io".to_string()),
                (TDVV.to_string(), "https://tdvv-public-node.aelf.io".to_string()),
            ]),
            explorer: BTreeMap::from([
                (AELF.to_string(), "https://aelfscan.io/AELF".to_string()),
                (TDVV.to_string(), "https://aelfscan.io/tDVV".to_string()),
            ]),
            default_dao_chain: TDVV.to_string(),
            default_network_chain: AELF.to_string(),
            auth_chain_id: AELF.to_string(),
            rpc_pool_max: 8,
            rpc_timeout_ms: 20_000,
            contracts: BTreeMap::new(),
        }
    }
}

/// REST timeout and retry knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt timeout in milliseconds; 0 disables the timer.
    pub timeout_ms: u64,

    /// Extra attempts after the first. 0 disables retries.
    pub retry_max: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_base_ms: u64,

    /// Allow retrying POST requests.
    pub retry_post: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry_max: 1,
            retry_base_ms: 200,
            retry_post: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// JSON lines instead of human-readable output.
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "error".to_string(),
            log_json: true,
        }
    }
}
