//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{NodeConfig, RPC_URL_ENV_VAR};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// `LEDGERFLOW_RPC_URL`, when set, overrides the endpoint from the file so
/// deployments can switch nodes without editing configs.
pub fn load_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: NodeConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    if let Ok(url) = std::env::var(RPC_URL_ENV_VAR) {
        config.rpc_url = url;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Semantic validation; serde handles the syntactic part.
pub fn validate_config(config: &NodeConfig) -> Result<(), ConfigError> {
    config
        .rpc_url
        .parse::<url::Url>()
        .map_err(|e| ConfigError::Invalid(format!("rpc_url '{}': {}", config.rpc_url, e)))?;

    if config.rpc_timeout_secs == 0 {
        return Err(ConfigError::Invalid("rpc_timeout_secs must be > 0".into()));
    }
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
    }
    if config.gas_price_multiplier < 1.0 {
        return Err(ConfigError::Invalid(
            "gas_price_multiplier must be >= 1.0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default() {
        assert!(validate_config(&NodeConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = NodeConfig {
            rpc_url: "not a url".into(),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let config = NodeConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }
}
