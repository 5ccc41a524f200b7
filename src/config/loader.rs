//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{BackendsConfig, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Startup configuration failure. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("no backends configured")]
    NoBackends,

    #[error("invalid backend URL {address:?}: {reason}")]
    InvalidBackend { address: String, reason: String },

    #[error("backend {address:?} uses unsupported scheme {scheme:?} (only http is supported)")]
    UnsupportedScheme { address: String, scheme: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Values given on the command line, applied over the file or defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub backends: Vec<String>,
}

/// Build the effective configuration: file (or defaults), then overrides,
/// then one validation pass over the result.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind) = overrides.bind_address {
        config.listener.bind_address = bind;
    }
    if !overrides.backends.is_empty() {
        config.backends = BackendsConfig(overrides.backends);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_file() {
        let path = write_temp(
            "balancer-valid",
            r#"
            backends = ["http://127.0.0.1:9001", "http://127.0.0.1:9002", "http://127.0.0.1:9003"]

            [listener]
            bind_address = "127.0.0.1:8088"
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.backends.addresses().len(), 3);
        assert_eq!(config.listener.bind_address, "127.0.0.1:8088");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_invalid_values() {
        let path = write_temp("balancer-invalid", "backends = []\n");

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &[ValidationError::NoBackends]));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn overrides_apply_over_defaults() {
        let config = resolve_config(
            None,
            Overrides {
                bind_address: Some("127.0.0.1:9090".into()),
                backends: vec!["http://10.0.0.5:80".into()],
            },
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9090");
        assert_eq!(config.backends.addresses(), ["http://10.0.0.5:80"]);
    }

    #[test]
    fn overrides_are_validated_without_a_file() {
        let err = resolve_config(
            None,
            Overrides {
                bind_address: Some(":8080".into()),
                ..Overrides::default()
            },
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Validation(ref e) if e == &[ValidationError::InvalidBindAddress(":8080".into())]
        ));
    }

    #[test]
    fn override_can_fix_invalid_file_value() {
        let path = write_temp("balancer-override", "[listener]\nbind_address = \"nope\"\n");

        let config = resolve_config(
            Some(&path),
            Overrides {
                bind_address: Some("127.0.0.1:8081".into()),
                ..Overrides::default()
            },
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8081");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/balancer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
