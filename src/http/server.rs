//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all forwarding handler
//! - Wire up middleware (request tracing)
//! - Bind server to listener
//! - Graceful shutdown on the lifecycle broadcast

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::error::ForwardError;
use crate::http::forward::Forwarder;
use crate::observability::logging::redact_path;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// HTTP server for the forwarder.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that forwards to the Telegram Bot API.
    pub fn new() -> Result<Self, ForwardError> {
        Ok(Self::with_forwarder(Forwarder::telegram()?))
    }

    /// Create a server around an already-built forwarder.
    pub fn with_forwarder(forwarder: Forwarder) -> Self {
        tracing::debug!(upstream = %forwarder.origin(), "Forwarder ready");
        let router = Self::build_router(AppState { forwarder });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "forward",
                    method = %request.method(),
                    path = %redact_path(request.uri().path()),
                )
            }))
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward the request upstream and relay the response unchanged.
async fn forward_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ForwardError> {
    tracing::debug!("Forwarding request");

    match state.forwarder.forward(request).await {
        Ok(response) => {
            tracing::debug!(status = %response.status(), "Relaying upstream response");
            Ok(response)
        }
        Err(e) => {
            tracing::error!(error = %e, "Forwarding failed");
            Err(e)
        }
    }
}
