//! HTTP entry point for the protocol endpoint.
//!
//! The dispatcher is deliberately thin: it extracts the `mcp-session-id`
//! header and hands the parsed body to the protocol server. All wire-level
//! decoding happens in the per-session transport.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::mcp::server::McpServer;
use crate::mcp::transport::TransportReply;
use crate::{AppError, Result};

/// Request/response header carrying the session token.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Build the protocol router.
#[must_use]
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_post).delete(handle_delete))
        .route("/health", get(health))
        .with_state(server)
}

/// Extract a non-empty session token from the request headers.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
}

/// Handler for `POST /mcp` — the protocol endpoint.
async fn handle_post(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = session_token(&headers);
    debug!(session_id = token.unwrap_or("-"), "request under POST /mcp");

    match server.handle(token, body).await {
        Ok(TransportReply::Message { session_id, body }) => {
            let mut response = Json(body).into_response();
            if let Some(token) = session_id {
                if let Ok(value) = HeaderValue::from_str(&token) {
                    response.headers_mut().insert(SESSION_HEADER, value);
                }
            }
            response
        }
        Ok(TransportReply::Accepted) => StatusCode::ACCEPTED.into_response(),
        Err(err) => {
            // Binding violations and similar server-side faults; nothing the
            // client can recover from.
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Handler for `DELETE /mcp` — explicit session close.
async fn handle_delete(State(server): State<Arc<McpServer>>, headers: HeaderMap) -> StatusCode {
    match session_token(&headers) {
        Some(token) if server.close_session(token) => StatusCode::NO_CONTENT,
        _ => StatusCode::NOT_FOUND,
    }
}

/// Serve the protocol endpoint on `addr` until the token fires.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener fails to bind or the server
/// loop fails.
pub async fn serve(server: Arc<McpServer>, addr: SocketAddr, ct: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind {addr}: {err}")))?;

    info!(%addr, "starting streamable HTTP transport");

    axum::serve(listener, router(server))
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Config(format!("server error: {err}")))?;

    info!("streamable HTTP transport shut down");
    Ok(())
}
