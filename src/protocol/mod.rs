//! Wire protocol types: JSON-RPC 2.0 framing and MCP message shapes.

pub mod jsonrpc;
pub mod mcp;

pub use jsonrpc::{JsonRpcError, JsonRpcErrorResponse, JsonRpcRequest, JsonRpcResponse};
pub use mcp::{
    ClientInfo, InitializeParams, InitializeResult, Resource, ResourceContents, ResourceReadParams,
    ResourceReadResult, ResourceTemplate, ResourceTemplatesListResult, ResourcesCapability,
    ResourcesListResult, ServerCapabilities, ServerInfo, MCP_PROTOCOL_VERSION, MIME_JSON,
    SUPPORTED_PROTOCOL_VERSIONS,
};
