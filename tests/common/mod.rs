//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, Response, Uri},
    Router,
};
use telegram_api_forwarder::{Forwarder, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock upstream saw for one request.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Requests received by a mock upstream, in arrival order.
pub type Recorder = Arc<Mutex<Vec<RecordedRequest>>>;

type Responder = Arc<dyn Fn(&RecordedRequest) -> Response<Body> + Send + Sync>;

/// Start a programmable upstream on an ephemeral port.
///
/// Every request is recorded before `respond` builds the reply.
pub async fn start_upstream<F>(respond: F) -> (SocketAddr, Recorder)
where
    F: Fn(&RecordedRequest) -> Response<Body> + Send + Sync + 'static,
{
    let recorder: Recorder = Arc::default();
    let responder: Responder = Arc::new(respond);

    let app = Router::new()
        .fallback(record_and_respond)
        .with_state((recorder.clone(), responder));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorder)
}

async fn record_and_respond(
    State((recorder, responder)): State<(Recorder, Responder)>,
    request: Request<Body>,
) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let recorded = RecordedRequest {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body: axum::body::to_bytes(body, usize::MAX).await.unwrap(),
    };
    let response = responder(&recorded);
    recorder.lock().unwrap().push(recorded);
    response
}

/// Start an upstream that answers every request with the bytes of `raw`.
///
/// Writes the response by hand, so status lines axum would normalize (such
/// as a non-canonical reason phrase) reach the forwarder untouched.
#[allow(dead_code)]
pub async fn start_raw_upstream(raw: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Send `request` verbatim to `addr` and return everything written back.
///
/// The request should carry `Connection: close` so the read terminates.
#[allow(dead_code)]
pub async fn send_raw(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

/// Start the forwarder, pointed at `origin`, on an ephemeral port.
///
/// The returned `Shutdown` stops the server when triggered or dropped.
pub async fn start_forwarder(origin: &str) -> (SocketAddr, Shutdown) {
    let forwarder = Forwarder::new(origin).unwrap();
    let server = HttpServer::with_forwarder(forwarder);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that talks to the forwarder directly and never follows redirects,
/// so every redirect the caller sees came from the forwarder itself.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
