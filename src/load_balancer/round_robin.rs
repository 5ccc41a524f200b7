//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Round-robin selector.
///
/// Every candidate examined, healthy or not, advances the cursor by one. The
/// cursor is incremented before it is read, so a fresh selector starts at
/// index `1 % len`. Overflow wraps.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw cursor value, mainly for tests.
    pub fn cursor(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    fn with_cursor(start: usize) -> Self {
        Self {
            counter: AtomicUsize::new(start),
        }
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        let len = backends.len();

        for _ in 0..len {
            let index = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % len;
            let backend = &backends[index];
            if backend.is_healthy() {
                return Some(backend.clone());
            }
        }
        None
    }
}
