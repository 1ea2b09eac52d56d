//! MCP protocol message shapes.
//!
//! Model Context Protocol revision 2025-06-18.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Preferred MCP protocol version.
pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

/// Protocol versions this server accepts during the initialize handshake.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// MIME type tag carried by every resource result in this system.
pub const MIME_JSON: &str = "application/json";

/// Initialize request parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by the client.
    pub protocol_version: String,
    /// Client capabilities (opaque to this server).
    #[serde(default)]
    pub capabilities: Value,
    /// Client identity.
    pub client_info: Option<ClientInfo>,
}

/// Client identity advertised in the handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
}

/// Initialize response result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version the server will speak for this session.
    pub protocol_version: String,
    /// Server capabilities.
    pub capabilities: ServerCapabilities,
    /// Server identity.
    pub server_info: ServerInfo,
}

/// Capability set declared by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Resources capability; the only one this server declares.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
}

/// Resources capability flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    /// Whether resource subscriptions are supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// Whether the resource list can change at runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Server identity advertised in the handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

/// Fixed resource descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Exact URI the resource answers.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of the resource contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Resource template descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    /// URI pattern with `{name}` placeholders.
    pub uri_template: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of the resource contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// `resources/list` result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourcesListResult {
    /// Registered fixed resources, in registration order.
    pub resources: Vec<Resource>,
}

/// `resources/templates/list` result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplatesListResult {
    /// Registered resource templates, in registration order.
    pub resource_templates: Vec<ResourceTemplate>,
}

/// `resources/read` parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceReadParams {
    /// Resource URI to read.
    pub uri: String,
}

/// `resources/read` result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceReadResult {
    /// Resource contents.
    pub contents: Vec<ResourceContents>,
}

/// The uniform result envelope around every capability value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// The requested URI, echoed back.
    pub uri: String,
    /// MIME type tag; fixed at `application/json` in this system.
    pub mime_type: String,
    /// JSON-serialized payload text.
    pub text: String,
}
