//! Backend registry.
//!
//! # Responsibilities
//! - Own every configured backend, in configuration order
//! - Fail construction as a whole if any address is malformed
//!
//! The list is immutable after construction and shared read-only between
//! concurrent requests.

use std::sync::Arc;

use crate::config::ConfigError;
use crate::load_balancer::backend::Backend;

/// Ordered, index-stable set of backends.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: Vec<Arc<Backend>>,
}

impl BackendRegistry {
    /// Build a registry from base URLs. Stops at the first bad address.
    pub fn new<I, S>(addresses: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let backends = addresses
            .into_iter()
            .map(|address| Backend::parse(address.as_ref()).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        Ok(Self { backends })
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Backend>> {
        self.backends.iter()
    }
}
