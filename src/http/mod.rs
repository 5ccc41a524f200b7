//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → load_balancer (select backend, or 503)
//!     → request.rs (URI/Host rewrite, headers.rs strips hop-by-hop)
//!     → hyper client → backend
//!     → response.rs (relay status/headers/body, or 502/504)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ForwardError;
pub use server::HttpServer;
