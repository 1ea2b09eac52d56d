//! Session registry: the token → transport mapping and its lifecycle.
//!
//! Sessions are identified by opaque, server-generated tokens. The registry
//! is the single owner of the mapping; its only mutation paths are
//! [`SessionRegistry::session_initialized`] and
//! [`SessionRegistry::session_closed`], both invoked by the transport's own
//! lifecycle handling. A freshly created transport is not discoverable via
//! [`SessionRegistry::lookup`] until its initialize handshake completes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use uuid::Uuid;

use crate::mcp::transport::StreamableHttpTransport;
use crate::{AppError, Result};

/// Concurrent map of live sessions.
///
/// Reads and writes go through a single lock; the lock is never held across
/// an await point.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<StreamableHttpTransport>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the transport registered for `token`.
    ///
    /// Returns `None` for empty, unknown, or not-yet-initialized tokens.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<Arc<StreamableHttpTransport>> {
        if token.is_empty() {
            return None;
        }
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Allocate a new transport with a freshly generated session token.
    ///
    /// The transport is not discoverable by [`lookup`](Self::lookup) until
    /// its initialize handshake registers it, so the caller must hold the
    /// returned reference for the duration of the current request.
    #[must_use]
    pub fn create(self: &Arc<Self>) -> Arc<StreamableHttpTransport> {
        let token = self.fresh_token();
        debug!(session_id = %token, "allocated transport");
        StreamableHttpTransport::new(token, Arc::clone(self))
    }

    /// Number of initialized, live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session is currently live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generate a token that does not collide with any live session.
    ///
    /// A UUID v4 carries 122 bits of entropy; a collision with a live
    /// session is regenerated away rather than overwriting it.
    fn fresh_token(&self) -> String {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        loop {
            let token = Uuid::new_v4().to_string();
            if !sessions.contains_key(&token) {
                return token;
            }
        }
    }

    /// Register an initialized transport under its token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the token is already registered;
    /// the existing session is never overwritten.
    pub(crate) fn session_initialized(
        &self,
        token: &str,
        transport: &Arc<StreamableHttpTransport>,
    ) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(token) {
            return Err(AppError::Transport(format!(
                "session token '{token}' is already registered"
            )));
        }
        sessions.insert(token.to_owned(), Arc::clone(transport));
        Ok(())
    }

    /// Remove a closed session's mapping.
    pub(crate) fn session_closed(&self, token: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}
