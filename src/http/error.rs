//! Forwarding failures and how the server reports them.
//!
//! Upstream 4xx/5xx responses are not errors here; they are relayed like any
//! other response. Only a failed handling cycle ends up as a `ForwardError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The configured upstream origin is not an absolute http(s) URL.
    #[error("invalid upstream origin `{origin}`: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    /// The outbound HTTP client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    /// The inbound request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// Origin plus inbound path and query did not form a valid URL.
    #[error("invalid target url `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// Transport failure talking to the upstream (DNS, connect, TLS, reset).
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, self.to_string()).into_response()
    }
}
