//! Error types shared across the application.

use std::fmt::{Display, Formatter};

use crate::protocol::jsonrpc;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Wire framing or session lifecycle violation.
    Transport(String),
    /// Capability registration failure at construction time.
    Registration(String),
    /// Requested capability URI matches nothing.
    NotFound(String),
    /// Unknown protocol method.
    MethodNotFound(String),
    /// Malformed request parameters.
    InvalidParams(String),
    /// External task API failure.
    Upstream(String),
    /// JSON serialization failure.
    Json(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// Broken internal invariant.
    Internal(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Registration(msg) => write!(f, "registration: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::MethodNotFound(msg) => write!(f, "method not found: {msg}"),
            Self::InvalidParams(msg) => write!(f, "invalid params: {msg}"),
            Self::Upstream(msg) => write!(f, "upstream: {msg}"),
            Self::Json(msg) => write!(f, "json: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Internal(msg) => write!(f, "internal: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl AppError {
    /// JSON-RPC error code carried by the wire-level error response.
    #[must_use]
    pub fn jsonrpc_code(&self) -> i32 {
        match self {
            Self::Transport(_) => jsonrpc::INVALID_REQUEST,
            Self::NotFound(_) => jsonrpc::RESOURCE_NOT_FOUND,
            Self::MethodNotFound(_) => jsonrpc::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => jsonrpc::INVALID_PARAMS,
            Self::Upstream(_) => jsonrpc::SERVER_ERROR,
            _ => jsonrpc::INTERNAL_ERROR,
        }
    }
}
