use serde_json::{json, Value};

use task_relay::protocol::jsonrpc::{
    self, JsonRpcError, JsonRpcErrorResponse, JsonRpcRequest, JsonRpcResponse,
};

#[test]
fn parses_request_with_numeric_id() {
    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "resources/read",
        "params": { "uri": "tasks://all" }
    }))
    .expect("parses");

    assert_eq!(request.jsonrpc, "2.0");
    assert_eq!(request.id, Some(json!(7)));
    assert_eq!(request.method, "resources/read");
    assert!(!request.is_notification());
}

#[test]
fn parses_notification_without_id() {
    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }))
    .expect("parses");

    assert!(request.is_notification());
    assert!(request.params.is_none());
}

#[test]
fn request_constructor_sets_version() {
    let request = JsonRpcRequest::new(json!(1), "ping", None);
    assert_eq!(request.jsonrpc, jsonrpc::JSONRPC_VERSION);
    assert_eq!(request.id, Some(json!(1)));
}

#[test]
fn success_response_serializes_without_error_field() {
    let response = JsonRpcResponse::new(json!(1), json!({"ok": true}));
    let value = serde_json::to_value(&response).expect("serializes");
    assert_eq!(value["jsonrpc"], "2.0");
    assert_eq!(value["result"]["ok"], true);
    assert!(value.get("error").is_none());
}

#[test]
fn error_response_carries_code_and_message() {
    let response = JsonRpcErrorResponse::new(
        Value::Null,
        JsonRpcError::new(jsonrpc::PARSE_ERROR, "parse error"),
    );
    let value = serde_json::to_value(&response).expect("serializes");
    assert_eq!(value["id"], Value::Null);
    assert_eq!(value["error"]["code"], -32700);
    assert_eq!(value["error"]["message"], "parse error");
    assert!(value["error"].get("data").is_none());
}

#[test]
fn error_codes_match_specification() {
    assert_eq!(jsonrpc::PARSE_ERROR, -32700);
    assert_eq!(jsonrpc::INVALID_REQUEST, -32600);
    assert_eq!(jsonrpc::METHOD_NOT_FOUND, -32601);
    assert_eq!(jsonrpc::INVALID_PARAMS, -32602);
    assert_eq!(jsonrpc::INTERNAL_ERROR, -32603);
    assert_eq!(jsonrpc::RESOURCE_NOT_FOUND, -32002);
}
