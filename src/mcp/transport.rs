//! Streamable HTTP transport: per-session protocol framing.
//!
//! A transport is the live channel bound to exactly one session. It outlives
//! individual HTTP requests — every request carrying the same session token
//! is framed and dispatched through the same transport instance, in arrival
//! order. The transport owns all wire-level decoding and encoding; the
//! protocol server only ever sees typed handler calls.

use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::mcp::server::McpServer;
use crate::mcp::session::SessionRegistry;
use crate::protocol::jsonrpc::{self, JsonRpcRequest};
use crate::protocol::{InitializeParams, ResourceReadParams};
use crate::{AppError, Result};

/// Lifecycle state of a session-bound transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport allocated, handshake not yet performed.
    Created,
    /// Initialize handshake completed; session is discoverable.
    Initialized,
    /// Session ended; the transport accepts no further calls.
    Closed,
}

/// Outcome of framing one HTTP request through a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportReply {
    /// JSON body to return with HTTP 200. `session_id` is set on a
    /// successful initialize response so the dispatcher can echo the token
    /// in the `mcp-session-id` response header.
    Message {
        /// Token to expose in the response header, if any.
        session_id: Option<String>,
        /// Encoded JSON-RPC response body.
        body: Value,
    },
    /// Accepted without a body (HTTP 202) — notifications.
    Accepted,
}

impl TransportReply {
    fn message(session_id: Option<String>, body: Value) -> Self {
        Self::Message { session_id, body }
    }
}

/// Per-session transport for the `POST /mcp` endpoint.
pub struct StreamableHttpTransport {
    session_id: String,
    registry: Arc<SessionRegistry>,
    state: Mutex<SessionState>,
    server: OnceLock<Weak<McpServer>>,
    // Serializes message handling for this session; requests on distinct
    // sessions run in parallel.
    serialize: tokio::sync::Mutex<()>,
    created_at: DateTime<Utc>,
}

impl StreamableHttpTransport {
    /// Allocate a transport for `session_id`, holding a handle to the
    /// registry for lifecycle signaling.
    pub(crate) fn new(session_id: String, registry: Arc<SessionRegistry>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            registry,
            state: Mutex::new(SessionState::Created),
            server: OnceLock::new(),
            serialize: tokio::sync::Mutex::new(()),
            created_at: Utc::now(),
        })
    }

    /// The opaque token identifying this session.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind this transport to its protocol server.
    ///
    /// Must happen exactly once, before any message is dispatched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the transport is already bound;
    /// re-binding is a programming error and never silently succeeds.
    pub fn bind(&self, server: &Arc<McpServer>) -> Result<()> {
        self.server
            .set(Arc::downgrade(server))
            .map_err(|_| AppError::Transport("transport is already bound to a server".into()))
    }

    /// Frame one parsed HTTP request body through this transport.
    ///
    /// Decodes the JSON-RPC message, dispatches it against the bound server,
    /// and encodes the response. Handler failures become JSON-RPC error
    /// bodies; they never tear the session down.
    pub async fn handle_request(self: &Arc<Self>, body: Value) -> TransportReply {
        let _guard = self.serialize.lock().await;

        let request: JsonRpcRequest = match serde_json::from_value(body) {
            Ok(request) => request,
            Err(err) => {
                return TransportReply::message(
                    None,
                    error_body(&Value::Null, jsonrpc::PARSE_ERROR, &format!("parse error: {err}")),
                );
            }
        };

        if request.jsonrpc != jsonrpc::JSONRPC_VERSION {
            let id = request.id.clone().unwrap_or(Value::Null);
            return TransportReply::message(
                None,
                error_body(&id, jsonrpc::INVALID_REQUEST, "unsupported jsonrpc version"),
            );
        }

        match request.id {
            None => self.handle_notification(&request.method),
            Some(id) => self.handle_call(id, &request.method, request.params).await,
        }
    }

    /// End this session: mark the transport closed and drop the registry
    /// mapping. Idempotent.
    pub fn close(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == SessionState::Closed {
                return;
            }
            *state = SessionState::Closed;
        }
        self.registry.session_closed(&self.session_id);
        let age = Utc::now() - self.created_at;
        info!(
            session_id = %self.session_id,
            age_seconds = age.num_seconds(),
            "session closed"
        );
    }

    fn handle_notification(&self, method: &str) -> TransportReply {
        match method {
            "notifications/initialized" => {
                debug!(session_id = %self.session_id, "client initialization acknowledged");
            }
            other => {
                debug!(session_id = %self.session_id, method = other, "ignoring client notification");
            }
        }
        TransportReply::Accepted
    }

    async fn handle_call(
        self: &Arc<Self>,
        id: Value,
        method: &str,
        params: Option<Value>,
    ) -> TransportReply {
        if method == "initialize" {
            return match self.initialize(params) {
                Ok(result) => TransportReply::message(
                    Some(self.session_id.clone()),
                    success_body(&id, result),
                ),
                Err(err) => TransportReply::message(None, failure_body(&id, &err)),
            };
        }

        match self.state() {
            SessionState::Initialized => {}
            SessionState::Created => {
                let err =
                    AppError::Transport("session is not initialized; send initialize first".into());
                return TransportReply::message(None, failure_body(&id, &err));
            }
            SessionState::Closed => {
                let err = AppError::Transport("session is closed".into());
                return TransportReply::message(None, failure_body(&id, &err));
            }
        }

        match self.dispatch(method, params).await {
            Ok(result) => TransportReply::message(None, success_body(&id, result)),
            Err(err) => TransportReply::message(None, failure_body(&id, &err)),
        }
    }

    /// Perform the initialize handshake: negotiate the protocol version,
    /// register this transport with the session registry, and advance the
    /// state machine.
    fn initialize(self: &Arc<Self>, params: Option<Value>) -> Result<Value> {
        match self.state() {
            SessionState::Created => {}
            SessionState::Initialized => {
                return Err(AppError::Transport("session is already initialized".into()));
            }
            SessionState::Closed => {
                return Err(AppError::Transport("session is closed".into()));
            }
        }

        let params: InitializeParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|err| AppError::InvalidParams(format!("initialize: {err}")))?;

        let server = self.server()?;
        let result = server.initialize(&params)?;

        self.registry.session_initialized(&self.session_id, self)?;
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = SessionState::Initialized;
        info!(session_id = %self.session_id, "session initialized");

        serde_json::to_value(result).map_err(AppError::from)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let server = self.server()?;
        match method {
            "ping" => Ok(json!({})),
            "resources/list" => {
                serde_json::to_value(server.list_resources()).map_err(AppError::from)
            }
            "resources/templates/list" => {
                serde_json::to_value(server.list_resource_templates()).map_err(AppError::from)
            }
            "resources/read" => {
                let params: ResourceReadParams =
                    serde_json::from_value(params.unwrap_or(Value::Null))
                        .map_err(|err| AppError::InvalidParams(format!("resources/read: {err}")))?;
                debug!(session_id = %self.session_id, uri = %params.uri, "resources/read");
                let result = server.read_resource(&params.uri).await?;
                serde_json::to_value(result).map_err(AppError::from)
            }
            other => Err(AppError::MethodNotFound(other.to_owned())),
        }
    }

    fn server(&self) -> Result<Arc<McpServer>> {
        self.server
            .get()
            .ok_or_else(|| AppError::Transport("transport is not bound to a server".into()))?
            .upgrade()
            .ok_or_else(|| AppError::Transport("protocol server has shut down".into()))
    }
}

fn success_body(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": jsonrpc::JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

fn error_body(id: &Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": jsonrpc::JSONRPC_VERSION,
        "id": id,
        "error": { "code": code, "message": message },
    })
}

fn failure_body(id: &Value, err: &AppError) -> Value {
    error_body(id, err.jsonrpc_code(), &err.to_string())
}
