//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend base URLs, in round-robin order.
    pub backends: BackendsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Ordered list of backend base URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BackendsConfig(pub Vec<String>);

impl Default for BackendsConfig {
    fn default() -> Self {
        Self(vec![
            "http://localhost:9001".to_string(),
            "http://localhost:9002".to_string(),
        ])
    }
}

impl BackendsConfig {
    pub fn addresses(&self) -> &[String] {
        &self.0
    }
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on one upstream exchange in seconds. `None` waits forever.
    pub upstream_secs: Option<u64>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "balancer_proxy=info,tower_http=debug".to_string(),
            json: false,
        }
    }
}
