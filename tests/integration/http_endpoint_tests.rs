//! HTTP endpoint tests driving the dispatcher over a real socket.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use task_relay::mcp::http::{self, SESSION_HEADER};
use task_relay::mcp::resources::all_tasks::AllTasksResource;
use task_relay::mcp::resources::tasks_by_status::TasksByStatusResource;
use task_relay::mcp::resources::{CapabilityRegistry, FixedResource, TemplatedResource};
use task_relay::mcp::server::McpServer;
use task_relay::mcp::session::SessionRegistry;
use task_relay::protocol::ServerInfo;
use task_relay::tasks::client::TaskClient;

async fn spawn_task_api() -> SocketAddr {
    async fn tasks(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({ "data": [], "received": params }))
    }

    let app = Router::new().route("/tasks", get(tasks));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock api");
    });
    addr
}

/// Spawn the full protocol endpoint and return its base URL.
async fn spawn_endpoint() -> String {
    let api_addr = spawn_task_api().await;
    let client = Arc::new(TaskClient::new(format!("http://{api_addr}")));
    let fixed: Vec<Arc<dyn FixedResource>> =
        vec![Arc::new(AllTasksResource::new(Arc::clone(&client)))];
    let templated: Vec<Arc<dyn TemplatedResource>> =
        vec![Arc::new(TasksByStatusResource::new(client))];
    let resources = CapabilityRegistry::new(fixed, templated).expect("registry");
    let server = McpServer::new(
        ServerInfo {
            name: "task-relay".into(),
            version: "0.0.0".into(),
        },
        resources,
        Arc::new(SessionRegistry::new()),
    );

    let app = http::router(server);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind endpoint");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve endpoint");
    });
    format!("http://{addr}")
}

fn initialize_body() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "0.0.0" }
        }
    })
}

/// POST the initialize handshake and return the assigned session token.
async fn initialize(client: &reqwest::Client, base: &str) -> String {
    let response = client
        .post(format!("{base}/mcp"))
        .json(&initialize_body())
        .send()
        .await
        .expect("initialize request");
    assert_eq!(response.status(), 200);
    response
        .headers()
        .get(SESSION_HEADER)
        .expect("session header")
        .to_str()
        .expect("ascii token")
        .to_owned()
}

#[tokio::test]
async fn health_endpoint_answers() {
    let base = spawn_endpoint().await;
    let body = reqwest::get(format!("{base}/health"))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn initialize_sets_session_header() {
    let base = spawn_endpoint().await;
    let client = reqwest::Client::new();

    let token = initialize(&client, &base).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn read_resource_over_http() {
    let base = spawn_endpoint().await;
    let client = reqwest::Client::new();
    let token = initialize(&client, &base).await;

    let response = client
        .post(format!("{base}/mcp"))
        .header(SESSION_HEADER, token.as_str())
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "resources/read",
            "params": { "uri": "tasks://status/todo" }
        }))
        .send()
        .await
        .expect("read request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("json body");
    let contents = &body["result"]["contents"][0];
    assert_eq!(contents["uri"], "tasks://status/todo");
    assert_eq!(contents["mimeType"], "application/json");

    let payload: Value =
        serde_json::from_str(contents["text"].as_str().expect("text")).expect("payload");
    assert_eq!(payload["received"]["status"], "todo");
}

#[tokio::test]
async fn notification_returns_accepted() {
    let base = spawn_endpoint().await;
    let client = reqwest::Client::new();
    let token = initialize(&client, &base).await;

    let response = client
        .post(format!("{base}/mcp"))
        .header(SESSION_HEADER, token.as_str())
        .json(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .send()
        .await
        .expect("notification request");
    assert_eq!(response.status(), 202);
}

#[tokio::test]
async fn delete_closes_session_and_stale_token_gets_new_session() {
    let base = spawn_endpoint().await;
    let client = reqwest::Client::new();
    let token = initialize(&client, &base).await;

    let response = client
        .delete(format!("{base}/mcp"))
        .header(SESSION_HEADER, token.as_str())
        .send()
        .await
        .expect("delete request");
    assert_eq!(response.status(), 204);

    // A second delete misses.
    let response = client
        .delete(format!("{base}/mcp"))
        .header(SESSION_HEADER, token.as_str())
        .send()
        .await
        .expect("second delete");
    assert_eq!(response.status(), 404);

    // The stale token behaves as if no session existed.
    let response = client
        .post(format!("{base}/mcp"))
        .header(SESSION_HEADER, token.as_str())
        .json(&initialize_body())
        .send()
        .await
        .expect("re-initialize");
    assert_eq!(response.status(), 200);
    let fresh = response
        .headers()
        .get(SESSION_HEADER)
        .expect("session header")
        .to_str()
        .expect("ascii token")
        .to_owned();
    assert_ne!(fresh, token);
}

#[tokio::test]
async fn delete_without_token_misses() {
    let base = spawn_endpoint().await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{base}/mcp"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(response.status(), 404);
}
