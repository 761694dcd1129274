//! HTTP transport with Server-Sent Events
//!
//! `GET /sse` opens a stream that stays up until the peer leaves.
//! `POST /sse` opens the same kind of stream and answers the JSON-RPC
//! messages carried in the request body on it, then closes once every
//! response has been written.
//!
//! Response headers go out before the body is read. Every stream starts
//! with a `ping` notification and carries a keep-alive comment every
//! `KEEP_ALIVE_INTERVAL` until it is dropped.

use std::convert::Infallible;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use url::{Host, Url};

use crate::config::{transport, Config};
use crate::error::Result;
use crate::mcp::server::{McpServer, SERVER_NAME, SERVER_VERSION};
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::{methods, JsonRpcError, JsonRpcNotification, JsonRpcResponse};

type EventStream = Pin<Box<dyn Stream<Item = std::result::Result<Event, Infallible>> + Send>>;

/// Shared state of the HTTP transport
pub struct SseState<R> {
    server: Arc<McpServer<R>>,
    max_body_bytes: usize,
    keep_alive: Duration,
}

impl<R: ToolRegistry> SseState<R> {
    /// State with the production body limit and keep-alive interval
    pub fn new(server: Arc<McpServer<R>>) -> Self {
        Self {
            server,
            max_body_bytes: transport::MAX_BODY_BYTES,
            keep_alive: transport::KEEP_ALIVE_INTERVAL,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

/// Which browser origins may call the HTTP transport
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    /// An empty list selects the localhost-only policy
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if self.allowed_origins.is_empty() {
            is_localhost_origin(origin)
        } else {
            self.allowed_origins.iter().any(|o| o == origin)
        }
    }

    fn layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                origin.to_str().map(|o| self.is_allowed(o)).unwrap_or(false)
            }))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
            .max_age(Duration::from_secs(86_400))
    }
}

/// Exact host match against `localhost`, `127.0.0.1` and `::1`.
/// `localhost.example.com` or `127.0.0.1.nip.io` do not pass.
pub fn is_localhost_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip == Ipv4Addr::LOCALHOST,
        Some(Host::Ipv6(ip)) => ip == Ipv6Addr::LOCALHOST,
        None => false,
    }
}

/// Build the HTTP router
pub fn router<R: ToolRegistry>(state: SseState<R>, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/metrics", get(metrics::<R>))
        .route("/sse", get(sse_handler::<R>).post(sse_handler::<R>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors.layer()),
        )
        .with_state(Arc::new(state))
}

/// Serve the HTTP transport until Ctrl-C
pub async fn serve<R: ToolRegistry>(server: Arc<McpServer<R>>, config: &Config) -> Result<()> {
    let app = router(SseState::new(server), CorsPolicy::new(config.cors_origins.clone()));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("MCP SSE server listening on http://{}/sse", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("MCP SSE server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": SERVER_VERSION,
        "transport": "sse",
    }))
}

async fn metrics<R: ToolRegistry>(State(state): State<Arc<SseState<R>>>) -> impl IntoResponse {
    Json(state.server.metrics().snapshot())
}

async fn sse_handler<R: ToolRegistry>(
    State(state): State<Arc<SseState<R>>>,
    method: Method,
    body: Body,
) -> Sse<EventStream> {
    let (tx, rx) = mpsc::unbounded_channel();
    send_frame(&tx, &JsonRpcNotification::new(methods::PING));

    let keep_alive = state.keep_alive;
    let frames = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);

    let stream: EventStream = if method == Method::POST {
        tokio::spawn(process_body(state, body, tx));
        Box::pin(frames)
    } else {
        drop(tx);
        Box::pin(frames.chain(tokio_stream::pending()))
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(keep_alive).text("keep-alive"))
}

/// Read the POST body under the size limit and dispatch every message in it
async fn process_body<R: ToolRegistry>(
    state: Arc<SseState<R>>,
    body: Body,
    tx: mpsc::UnboundedSender<Event>,
) {
    let limit = state.max_body_bytes;
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunks = body.into_data_stream();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => {
                if buffer.len() + bytes.len() > limit {
                    warn!(limit, "Request body too large, aborting read");
                    send_frame(&tx, &body_too_large(limit));
                    return;
                }
                buffer.extend_from_slice(&bytes);
            }
            Err(e) => {
                debug!(error = %e, "Request body read failed");
                return;
            }
        }
    }

    if buffer.len() > limit {
        send_frame(&tx, &body_too_large(limit));
        return;
    }

    let text = String::from_utf8_lossy(&buffer);
    for message in parse_post_body(&text) {
        match message {
            Ok(value) => {
                let server = state.server.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(response) = server.handle_value(value).await {
                        send_frame(&tx, &response);
                    }
                });
            }
            Err(e) => send_frame(
                &tx,
                &JsonRpcResponse::error(None, JsonRpcError::parse_error(format!("Parse error: {}", e))),
            ),
        }
    }
}

fn body_too_large(limit: usize) -> JsonRpcResponse {
    JsonRpcResponse::error(
        None,
        JsonRpcError::invalid_request(format!("Request body exceeds {} bytes", limit)),
    )
}

/// Split a POST body into JSON-RPC messages.
///
/// Lines prefixed with `data:` are parsed one by one. Unless one of them
/// parsed, the whole body is also tried as a single JSON document.
pub fn parse_post_body(body: &str) -> Vec<std::result::Result<Value, serde_json::Error>> {
    let mut messages: Vec<_> = body
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .map(serde_json::from_str)
        .collect();

    if !messages.iter().any(|m| m.is_ok()) {
        messages.push(serde_json::from_str(body.trim()));
    }
    messages
}

/// Queue a frame; a closed peer is not an error
fn send_frame<T: Serialize>(tx: &mpsc::UnboundedSender<Event>, message: &T) {
    match Event::default().json_data(message) {
        Ok(event) => {
            if tx.send(event).is_err() {
                debug!("SSE peer disconnected, dropping frame");
            }
        }
        Err(e) => warn!(error = %e, "Failed to encode SSE frame"),
    }
}
