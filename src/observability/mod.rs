//! Observability subsystem.
//!
//! All subsystems emit structured `tracing` events; `logging.rs` installs the
//! subscriber. The request ID set by the HTTP layer is attached to every
//! per-request event.

pub mod logging;

pub use logging::init_logging;
