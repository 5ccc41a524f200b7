//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → dispatcher.rs (select_backend)
//!     → round_robin.rs (advance cursor, skip unhealthy)
//!     → registry.rs (immutable, ordered backend list)
//!     → backend.rs (address + health flag)
//!     → Some(backend) or None (503)
//! ```
//!
//! # Design Decisions
//! - Registry is read-only after construction; no locks on the request path
//! - The cursor lives in the strategy owned by each Dispatcher, not in a global
//! - Unhealthy backends are skipped, with work bounded to one full pass

use std::fmt::Debug;
use std::sync::Arc;

pub mod backend;
pub mod dispatcher;
pub mod registry;
pub mod round_robin;

pub use backend::Backend;
pub use dispatcher::Dispatcher;
pub use registry::BackendRegistry;
pub use round_robin::RoundRobin;

/// Backend selection algorithm.
pub trait LoadBalancer: Send + Sync + Debug {
    /// Pick the next backend to receive a request, or `None` if no backend
    /// is eligible.
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
