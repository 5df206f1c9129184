//! Observability subsystem.
//!
//! Structured logging through `tracing`; every request runs inside a span
//! carrying its method and a token-redacted path.

pub mod logging;
