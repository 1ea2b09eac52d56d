#![forbid(unsafe_code)]

//! Session-oriented MCP server exposing an external task API as read-only
//! resources over Streamable HTTP.

pub mod config;
pub mod errors;
pub mod mcp;
pub mod protocol;
pub mod tasks;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
