//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every problem is
//! reported, not just the first one. Backend URLs are validated by the
//! registry constructor, which owns that rule.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    NoBackends,
    ZeroUpstreamTimeout,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {:?} is not a socket address", addr)
            }
            ValidationError::NoBackends => write!(f, "at least one backend is required"),
            ValidationError::ZeroUpstreamTimeout => {
                write!(f, "timeouts.upstream_secs must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.backends.addresses().is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
