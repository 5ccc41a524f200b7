//! Backend dispatcher.
//!
//! Pairs the registry with a selection strategy. Each dispatcher owns its
//! own cursor, so independent instances never interfere.

use std::sync::Arc;

use crate::load_balancer::{backend::Backend, registry::BackendRegistry, round_robin::RoundRobin, LoadBalancer};

#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<BackendRegistry>,
    strategy: Box<dyn LoadBalancer>,
}

impl Dispatcher {
    /// Round-robin dispatcher with a fresh cursor.
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self::with_strategy(registry, Box::new(RoundRobin::new()))
    }

    pub fn with_strategy(registry: Arc<BackendRegistry>, strategy: Box<dyn LoadBalancer>) -> Self {
        Self { registry, strategy }
    }

    /// Select the next healthy backend, or `None` when every backend is down.
    pub fn select_backend(&self) -> Option<Arc<Backend>> {
        let selected = self.strategy.next_server(self.registry.backends());
        if selected.is_none() {
            tracing::debug!(backend_count = self.registry.len(), "No healthy backends found");
            for b in self.registry.iter() {
                tracing::debug!(addr = %b, healthy = b.is_healthy(), "Backend status");
            }
        }
        selected
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }
}
