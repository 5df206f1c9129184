//! Telegram Bot API forwarder.
//!
//! Accepts any HTTP request, replays it against `https://api.telegram.org`
//! with the same method, path, query, headers and body, and relays the
//! upstream response back untouched.
//!
//! ```text
//!     Client Request   ┌──────────────────────────────────────────┐
//!     ────────────────▶│  http::server ──▶ http::forward ─────────┼──▶ api.telegram.org
//!                      │                       │                  │
//!     Client Response  │                       ▼                  │
//!     ◀────────────────┼────────────────── relay ◀────────────────┼─── upstream response
//!                      └──────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ForwarderConfig;
pub use http::{Forwarder, HttpServer, TELEGRAM_API_ORIGIN};
pub use lifecycle::Shutdown;
