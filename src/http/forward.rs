//! Request forwarding to the upstream API.
//!
//! # Data Flow
//! ```text
//! inbound Request<Body>
//!     → target_url (origin + path + query)
//!     → outbound reqwest request (method, filtered headers, body bytes)
//!     → upstream
//!     → relay (status, reason phrase, filtered headers, streamed body)
//!     → Response<Body>
//! ```
//!
//! # Design Decisions
//! - One upstream origin per forwarder, fixed at construction
//! - Redirects are followed by the client, never surfaced to the caller
//! - No retries: a transport failure ends the cycle as `ForwardError::Upstream`

use axum::{
    body::{Body, HttpBody},
    http::{Request, Uri},
    response::Response,
};
use futures_util::TryStreamExt;
use hyper::ext::ReasonPhrase;
use reqwest::redirect;
use url::Url;

use crate::http::error::ForwardError;
use crate::http::headers;

/// The Telegram Bot API origin every request is forwarded to.
pub const TELEGRAM_API_ORIGIN: &str = "https://api.telegram.org";

/// Redirect hops followed before giving up (the Fetch standard's ceiling).
const MAX_REDIRECTS: usize = 20;

/// Stateless forwarder bound to a single upstream origin.
///
/// Cloning is cheap: the underlying client shares its connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    origin: String,
    client: reqwest::Client,
}

impl Forwarder {
    /// Forwarder for the Telegram Bot API.
    pub fn telegram() -> Result<Self, ForwardError> {
        Self::new(TELEGRAM_API_ORIGIN)
    }

    /// Forwarder for an arbitrary absolute `http`/`https` origin.
    ///
    /// Any path on `origin` is kept as a prefix; a trailing `/` is dropped so
    /// that the inbound path can be appended as-is.
    pub fn new(origin: &str) -> Result<Self, ForwardError> {
        let invalid = |reason: &str| ForwardError::InvalidOrigin {
            origin: origin.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(origin).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("origin must not carry a query or fragment"));
        }

        let client = reqwest::Client::builder()
            .no_proxy()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The origin requests are forwarded to.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Upstream URL for an inbound request URI.
    ///
    /// Only the path and query of `uri` are used; scheme and authority (when
    /// the request arrived in absolute form) are replaced by the origin. An
    /// empty query does not produce a dangling `?`.
    pub fn target_url(&self, uri: &Uri) -> String {
        let path = uri.path();
        match uri.query() {
            Some(query) if !query.is_empty() => format!("{}{}?{}", self.origin, path, query),
            _ => format!("{}{}", self.origin, path),
        }
    }

    /// Parsed upstream URL for an inbound request URI.
    ///
    /// Parsing applies WHATWG URL serialization, so bytes such as `'` in the
    /// query leave percent-encoded (`%27`), exactly as a browser-style `URL`
    /// would send them.
    pub fn outbound_url(&self, uri: &Uri) -> Result<Url, ForwardError> {
        let target = self.target_url(uri);
        Url::parse(&target).map_err(|source| ForwardError::InvalidTarget { target, source })
    }

    /// Forward `inbound` upstream and relay whatever comes back.
    pub async fn forward(&self, inbound: Request<Body>) -> Result<Response, ForwardError> {
        let (parts, body) = inbound.into_parts();
        let url = self.outbound_url(&parts.uri)?;

        let mut outbound = self
            .client
            .request(parts.method, url)
            .headers(headers::outbound(&parts.headers));

        if !body.is_end_stream() {
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(ForwardError::Body)?;
            if !bytes.is_empty() {
                outbound = outbound.body(bytes);
            }
        }

        let upstream = outbound.send().await?;

        tracing::debug!(
            status = %upstream.status(),
            url = %upstream.url().path(),
            "Upstream responded"
        );

        Ok(relay(upstream))
    }
}

/// Rebuild the upstream response for the caller, streaming the body through.
fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = headers::relayed(upstream.headers());
    let reason = upstream.extensions().get::<ReasonPhrase>().cloned();

    let body = upstream.bytes_stream().inspect_err(|error| {
        tracing::warn!(error = %error, "Upstream body terminated early");
    });

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    if let Some(reason) = reason {
        response.extensions_mut().insert(reason);
    }
    response
}
