//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing span per request)
//!     → forward.rs (target URL, outbound request, relay)
//!     → headers.rs (strip Host and hop-by-hop headers)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod headers;
pub mod server;

pub use error::ForwardError;
pub use forward::{Forwarder, TELEGRAM_API_ORIGIN};
pub use server::HttpServer;
