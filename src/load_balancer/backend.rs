//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server by its validated base URL
//! - Carry the health flag read by the selection path

use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::config::ConfigError;

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Base URL of the backend (scheme, host, optional port).
    address: Url,
    /// Health flag. Only a health checker writes it; dispatch only reads.
    healthy: AtomicBool,
}

impl Backend {
    /// Parse `address` and create a healthy backend.
    ///
    /// Only `http` URLs with a host are accepted, since the outbound
    /// connector speaks plain HTTP.
    pub fn parse(address: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(address).map_err(|e| ConfigError::InvalidBackend {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" {
            return Err(ConfigError::UnsupportedScheme {
                address: address.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidBackend {
                address: address.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self {
            address: url,
            healthy: AtomicBool::new(true),
        })
    }

    /// The backend's base URL.
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// `host[:port]` used for the upstream URI authority and `Host` header.
    pub fn authority(&self) -> String {
        match (self.address.host_str(), self.address.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => String::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Update the health flag. Lock-free for concurrent readers.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.address.as_str().trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_defaults_healthy() {
        let backend = Backend::parse("http://localhost:9001").unwrap();
        assert!(backend.is_healthy());
        assert_eq!(backend.authority(), "localhost:9001");
        assert_eq!(backend.to_string(), "http://localhost:9001");
    }

    #[test]
    fn default_port_is_omitted_from_authority() {
        let backend = Backend::parse("http://example.com/prefix").unwrap();
        assert_eq!(backend.authority(), "example.com");
    }

    #[test]
    fn health_flag_toggles() {
        let backend = Backend::parse("http://127.0.0.1:9001").unwrap();
        backend.set_healthy(false);
        assert!(!backend.is_healthy());
        backend.set_healthy(true);
        assert!(backend.is_healthy());
    }

    #[test]
    fn rejects_garbage() {
        let err = Backend::parse("not a url \x00").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidBackend { ref address, .. } if address == "not a url \x00")
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = Backend::parse("https://localhost:9443").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme { ref scheme, .. } if scheme == "https"));
    }
}
