//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Default and auth chains must have an RPC endpoint
//! - Every URL must parse
//!
//! Returns all violations, not just the first.

use std::fmt;

use crate::config::schema::SkillConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &SkillConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "api.api_base", &config.api.api_base);
    check_url(&mut errors, "api.auth_base", &config.api.auth_base);

    if config.chains.rpc.is_empty() {
        errors.push(ValidationError::new("chains.rpc", "at least one chain endpoint is required"));
    }
    for (chain, url) in &config.chains.rpc {
        check_url(&mut errors, &format!("chains.rpc.{}", chain), url);
    }
    for (chain, url) in &config.chains.explorer {
        check_url(&mut errors, &format!("chains.explorer.{}", chain), url);
    }

    let chain_refs = [
        ("chains.default_dao_chain", &config.chains.default_dao_chain),
        ("chains.default_network_chain", &config.chains.default_network_chain),
        ("chains.auth_chain_id", &config.chains.auth_chain_id),
    ];
    for (field, chain) in chain_refs {
        if !config.chains.rpc.contains_key(chain.as_str()) {
            let known = config.chains.rpc.keys().cloned().collect::<Vec<_>>().join("/");
            errors.push(ValidationError::new(field, format!("'{}' must be one of {}", chain, known)));
        }
    }

    if config.chains.rpc_timeout_ms == 0 {
        errors.push(ValidationError::new("chains.rpc_timeout_ms", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&SkillConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = SkillConfig::default();
        config.api.api_base = "not a url".to_string();
        config.chains.auth_chain_id = "XYZ".to_string();
        config.chains.rpc.insert("tDVW".to_string(), "ftp://node".to_string());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(errors.len(), 3);
        assert!(fields.contains(&"api.api_base"));
        assert!(fields.contains(&"chains.auth_chain_id"));
        assert!(fields.contains(&"chains.rpc.tDVW"));
    }

    #[test]
    fn test_empty_rpc_map() {
        let mut config = SkillConfig::default();
        config.chains.rpc.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "chains.rpc"));
    }
}
