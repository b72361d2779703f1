//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ExpressConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `blockchain.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "EXPRESS_RPC_URL";
/// Overrides `listener.bind_address`.
pub const BIND_ADDRESS_ENV_VAR: &str = "EXPRESS_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ExpressConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ExpressConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load `path` if it exists, otherwise validate the built-in defaults.
pub fn load_or_default(path: &Path) -> Result<ExpressConfig, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    tracing::info!(path = %path.display(), "Config file not found, using defaults");
    let mut config = ExpressConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `EXPRESS_*` environment overrides.
pub fn apply_env_overrides(config: &mut ExpressConfig) {
    if let Ok(url) = std::env::var(RPC_URL_ENV_VAR) {
        config.blockchain.rpc_url = url;
    }
    if let Ok(addr) = std::env::var(BIND_ADDRESS_ENV_VAR) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:18888"

            [notify]
            qos = 2
            prefix_topic = "test"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.notify.qos, 2);
        assert_eq!(config.notify.prefix_topic, "test");
    }

    #[test]
    fn test_invalid_qos_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notify]\nqos = 7").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("only 0, 1, 2"));
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.relay.rpc_namespace, "newton");
    }
}
