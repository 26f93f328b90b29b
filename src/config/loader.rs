//! Configuration loading from disk and environment.
//!
//! Environment variables (`TMRW_*`) overlay whatever was loaded. Integers
//! that do not parse, or are negative, keep the current value.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use crate::config::contracts::ContractBook;
use crate::config::schema::SkillConfig;
use crate::config::validation::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override variable did not hold the expected JSON shape.
    #[error("{var} is not valid JSON: {reason}")]
    Override { var: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "INVALID_CONFIG"
    }
}

/// Load a TOML file, overlay the process environment, validate.
pub fn load_config(path: &Path) -> Result<SkillConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: SkillConfig = toml::from_str(&content)?;
    apply_env_with(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

impl SkillConfig {
    /// Defaults overlaid with the process environment, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with `lookup`, validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        apply_env_with(&mut config, lookup)?;
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Contract book with configured overrides applied.
    pub fn contract_book(&self) -> Result<ContractBook, ConfigError> {
        ContractBook::with_overrides(&self.chains.contracts).map_err(|reason| ConfigError::Override {
            var: "chains.contracts",
            reason,
        })
    }
}

/// Overlay `TMRW_*` variables read through `lookup`. Empty values are ignored.
pub fn apply_env_with<F>(config: &mut SkillConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(v) = var("TMRW_API_BASE") {
        config.api.api_base = v;
    }
    if let Some(v) = var("TMRW_AUTH_BASE") {
        config.api.auth_base = v;
    }
    config.api.api_base = trim_slash(&config.api.api_base);
    config.api.auth_base = trim_slash(&config.api.auth_base);

    if let Some(v) = var("TMRW_SOURCE") {
        config.api.source = v;
    }
    if let Some(v) = var("TMRW_CA_HASH") {
        config.api.ca_hash = Some(v);
    }
    if let Some(v) = var(PRIVATE_KEY_ENV_VAR) {
        config.private_key = Some(v);
    }

    if let Some(v) = var("TMRW_CHAIN_DEFAULT_DAO") {
        config.chains.default_dao_chain = v;
    }
    if let Some(v) = var("TMRW_CHAIN_DEFAULT_NETWORK") {
        config.chains.default_network_chain = v;
    }
    if let Some(v) = var("TMRW_AUTH_CHAIN_ID") {
        config.chains.auth_chain_id = v;
    }
    if let Some(v) = var("TMRW_RPC_AELF") {
        config.chains.rpc.insert("AELF".to_string(), v);
    }
    if let Some(v) = var("TMRW_RPC_TDVV") {
        config.chains.rpc.insert("tDVV".to_string(), v);
    }
    let pool_max = var("TMRW_RPC_POOL_MAX").or_else(|| var("TMRW_AELF_CACHE_MAX"));
    config.chains.rpc_pool_max = read_int(pool_max, config.chains.rpc_pool_max as u64) as usize;

    config.http.timeout_ms = read_int(var("TMRW_HTTP_TIMEOUT_MS"), config.http.timeout_ms);
    config.http.retry_max = read_int(var("TMRW_HTTP_RETRY_MAX"), config.http.retry_max as u64)
        .min(u32::MAX as u64) as u32;
    config.http.retry_base_ms = read_int(var("TMRW_HTTP_RETRY_BASE_MS"), config.http.retry_base_ms);
    config.http.retry_post = read_bool(var("TMRW_HTTP_RETRY_POST"), config.http.retry_post);

    if let Some(v) = var("TMRW_LOG_LEVEL") {
        config.observability.log_level = v;
    }

    if let Some(raw) = var("TMRW_EXPLORER_OVERRIDES") {
        let overrides: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Override {
                var: "TMRW_EXPLORER_OVERRIDES",
                reason: e.to_string(),
            })?;
        config.chains.explorer.extend(overrides);
    }

    if let Some(raw) = var("TMRW_CONTRACT_OVERRIDES") {
        let overrides: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Override {
                var: "TMRW_CONTRACT_OVERRIDES",
                reason: e.to_string(),
            })?;
        for (chain, entries) in overrides {
            config.chains.contracts.entry(chain).or_default().extend(entries);
        }
        ContractBook::with_overrides(&config.chains.contracts).map_err(|reason| ConfigError::Override {
            var: "TMRW_CONTRACT_OVERRIDES",
            reason,
        })?;
    }

    Ok(())
}

/// Non-negative integer, floored; anything else keeps `fallback`.
pub fn read_int(value: Option<String>, fallback: u64) -> u64 {
    let Some(value) = value else {
        return fallback;
    };
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => n.floor() as u64,
        _ => fallback,
    }
}

/// `1` or `true` (any case) is true; any other non-empty value is false.
pub fn read_bool(value: Option<String>, fallback: bool) -> bool {
    match value {
        None => fallback,
        Some(v) if v.is_empty() => fallback,
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
    }
}

pub fn trim_slash(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overlay() {
        let config = SkillConfig::from_lookup(lookup(&[
            ("TMRW_API_BASE", "http://127.0.0.1:9000/"),
            ("TMRW_HTTP_RETRY_MAX", "3"),
            ("TMRW_HTTP_RETRY_POST", "TRUE"),
            ("TMRW_RPC_AELF", "http://127.0.0.1:8000"),
            ("TMRW_PRIVATE_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.api.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.http.retry_max, 3);
        assert!(config.http.retry_post);
        assert_eq!(config.chains.rpc["AELF"], "http://127.0.0.1:8000");
        assert_eq!(config.private_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_bad_integers_fall_back() {
        let config = SkillConfig::from_lookup(lookup(&[
            ("TMRW_HTTP_TIMEOUT_MS", "soon"),
            ("TMRW_HTTP_RETRY_MAX", "-2"),
            ("TMRW_HTTP_RETRY_BASE_MS", "150.9"),
        ]))
        .unwrap();
        assert_eq!(config.http.timeout_ms, 10_000);
        assert_eq!(config.http.retry_max, 1);
        assert_eq!(config.http.retry_base_ms, 150);
    }

    #[test]
    fn test_pool_size_alias() {
        let config = SkillConfig::from_lookup(lookup(&[("TMRW_AELF_CACHE_MAX", "4")])).unwrap();
        assert_eq!(config.chains.rpc_pool_max, 4);

        let config = SkillConfig::from_lookup(lookup(&[
            ("TMRW_AELF_CACHE_MAX", "4"),
            ("TMRW_RPC_POOL_MAX", "12"),
        ]))
        .unwrap();
        assert_eq!(config.chains.rpc_pool_max, 12);
    }

    #[test]
    fn test_read_bool() {
        assert!(read_bool(Some("1".into()), false));
        assert!(!read_bool(Some("yes".into()), true));
        assert!(read_bool(None, true));
    }

    #[test]
    fn test_overrides() {
        let config = SkillConfig::from_lookup(lookup(&[
            ("TMRW_EXPLORER_OVERRIDES", r#"{"AELF": "https://explorer.test/AELF"}"#),
            ("TMRW_CONTRACT_OVERRIDES", r#"{"AELF": {"parliament": "p-override"}}"#),
        ]))
        .unwrap();
        assert_eq!(config.chains.explorer["AELF"], "https://explorer.test/AELF");
        assert_eq!(config.chains.explorer["tDVV"], "https://aelfscan.io/tDVV");
        let book = config.contract_book().unwrap();
        assert_eq!(
            book.address("AELF", crate::config::contracts::ContractName::Parliament),
            Some("p-override")
        );
    }

    #[test]
    fn test_malformed_override_json() {
        let err = SkillConfig::from_lookup(lookup(&[("TMRW_EXPLORER_OVERRIDES", "{not json")])).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("TMRW_EXPLORER_OVERRIDES"));
    }

    #[test]
    fn test_invalid_default_chain_rejected() {
        let err = SkillConfig::from_lookup(lookup(&[("TMRW_CHAIN_DEFAULT_DAO", "XYZ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join(format!("tmrwdao-config-{}.toml", std::process::id()));
        fs::write(&path, "[http]\nretry_max = 0\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.http.retry_max, 0);
        fs::remove_file(&path).ok();

        assert!(matches!(load_config(Path::new("/nonexistent/tmrwdao.toml")), Err(ConfigError::Io(_))));
    }
}
