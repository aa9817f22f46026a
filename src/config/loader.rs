//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = parse_config(
            r#"
            backends = ["http://127.0.0.1:3001", "http://127.0.0.1:3002"]
            "#,
        )
        .unwrap();

        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.health_check.interval_secs, 30);
        assert_eq!(config.health_check.timeout_secs, 2);
        assert_eq!(config.retries.max_retries, 3);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.retries.backoff_ms, 10);
    }

    #[test]
    fn test_parse_overrides() {
        let config = parse_config(
            r#"
            backends = ["http://10.0.0.1:80"]

            [listener]
            bind_address = "127.0.0.1:9000"

            [health_check]
            interval_secs = 5

            [retries]
            max_retries = 1
            max_attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.health_check.interval_secs, 5);
        assert_eq!(config.health_check.timeout_secs, 2);
        assert_eq!(config.retries.max_retries, 1);
        assert_eq!(config.retries.max_attempts, 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_config("backends = 3"), Err(ConfigError::Parse(_))));
        assert!(matches!(parse_config(""), Err(ConfigError::Validation(_))));

        let err = parse_config(r#"backends = ["bogus"]"#).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: backends[0]"));
    }

    #[test]
    fn test_validation_errors_joined() {
        let err = parse_config(
            r#"
            backends = ["http://127.0.0.1:3001", "http://127.0.0.1:3001"]

            [retries]
            max_attempts = 0
            "#,
        )
        .unwrap_err();

        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error, got {:?}", err);
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(err.to_string(), format!("Validation failed: {}, {}", errors[0], errors[1]));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/failover-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
