//! Protocol server: capability table and per-session message routing.
//!
//! The server is constructed once per process with its identity, the fully
//! built capability registry, and the session registry. It never inspects
//! message bodies itself — wire-level decoding and encoding belong to the
//! per-session transport; the server owns the capability table and the
//! connect-once invariant.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::mcp::resources::CapabilityRegistry;
use crate::mcp::session::SessionRegistry;
use crate::mcp::transport::TransportReply;
use crate::protocol::{
    InitializeParams, InitializeResult, ResourceReadResult, ResourceTemplatesListResult,
    ResourcesCapability, ResourcesListResult, ServerCapabilities, ServerInfo,
    SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::{AppError, Result};

/// Capability-aware protocol server.
pub struct McpServer {
    info: ServerInfo,
    resources: CapabilityRegistry,
    sessions: Arc<SessionRegistry>,
}

impl McpServer {
    /// Build the server from its identity, capability registry, and session
    /// registry.
    #[must_use]
    pub fn new(
        info: ServerInfo,
        resources: CapabilityRegistry,
        sessions: Arc<SessionRegistry>,
    ) -> Arc<Self> {
        Arc::new(Self {
            info,
            resources,
            sessions,
        })
    }

    /// The session registry this server routes through.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Route one inbound request body to the right transport.
    ///
    /// Resolves the transport for `session_token`; an absent or unrecognized
    /// token degrades to creation of a new session, whose transport is bound
    /// to this server before any message is dispatched on it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` only for a binding violation on a newly
    /// created transport; all protocol-level failures are encoded into the
    /// reply body instead.
    pub async fn handle(
        self: &Arc<Self>,
        session_token: Option<&str>,
        body: Value,
    ) -> Result<TransportReply> {
        let transport = match session_token.and_then(|token| self.sessions.lookup(token)) {
            Some(transport) => transport,
            None => {
                let transport = self.sessions.create();
                transport.bind(self)?;
                debug!(session_id = %transport.session_id(), "bound transport for new session");
                transport
            }
        };

        Ok(transport.handle_request(body).await)
    }

    /// Close the session identified by `session_token`.
    ///
    /// Returns `true` if a live session was torn down.
    pub fn close_session(&self, session_token: &str) -> bool {
        match self.sessions.lookup(session_token) {
            Some(transport) => {
                transport.close();
                true
            }
            None => false,
        }
    }

    /// Handle the initialize handshake for one session.
    pub(crate) fn initialize(&self, params: &InitializeParams) -> Result<InitializeResult> {
        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            return Err(AppError::InvalidParams(format!(
                "unsupported protocol version: {}",
                params.protocol_version
            )));
        }

        Ok(InitializeResult {
            protocol_version: params.protocol_version.clone(),
            capabilities: ServerCapabilities {
                resources: Some(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: Some(false),
                }),
            },
            server_info: self.info.clone(),
        })
    }

    /// Handle `resources/list`.
    pub(crate) fn list_resources(&self) -> ResourcesListResult {
        ResourcesListResult {
            resources: self.resources.list(),
        }
    }

    /// Handle `resources/templates/list`.
    pub(crate) fn list_resource_templates(&self) -> ResourceTemplatesListResult {
        ResourceTemplatesListResult {
            resource_templates: self.resources.list_templates(),
        }
    }

    /// Handle `resources/read`: resolve the URI and wrap the handler value
    /// in the result envelope.
    pub(crate) async fn read_resource(&self, uri: &str) -> Result<ResourceReadResult> {
        let contents = self.resources.read(uri).await?;
        Ok(ResourceReadResult {
            contents: vec![contents],
        })
    }
}
