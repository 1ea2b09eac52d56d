use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};

use task_relay::mcp::resources::CapabilityRegistry;
use task_relay::mcp::server::McpServer;
use task_relay::mcp::session::SessionRegistry;
use task_relay::mcp::transport::{SessionState, TransportReply};
use task_relay::protocol::ServerInfo;
use task_relay::AppError;

fn build_server() -> Arc<McpServer> {
    let resources = CapabilityRegistry::new(vec![], vec![]).expect("empty registry");
    McpServer::new(
        ServerInfo {
            name: "test".into(),
            version: "0.0.0".into(),
        },
        resources,
        Arc::new(SessionRegistry::new()),
    )
}

fn initialize_request() -> Value {
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

/// Run the initialize handshake and return the assigned session token.
async fn initialize(server: &Arc<McpServer>) -> String {
    match server
        .handle(None, initialize_request())
        .await
        .expect("handle succeeds")
    {
        TransportReply::Message {
            session_id: Some(token),
            body,
        } => {
            assert!(body.get("result").is_some(), "initialize result expected");
            token
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[test]
fn created_tokens_are_distinct() {
    let sessions = Arc::new(SessionRegistry::new());
    let mut tokens = HashSet::new();
    for _ in 0..64 {
        let transport = sessions.create();
        assert!(tokens.insert(transport.session_id().to_owned()));
    }
    assert_eq!(tokens.len(), 64);
    // None of them completed the handshake, so none are discoverable.
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn concurrent_creates_produce_distinct_transports() {
    let server = build_server();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let server = Arc::clone(&server);
        handles.push(tokio::spawn(async move { initialize(&server).await }));
    }

    let mut tokens = HashSet::new();
    for handle in handles {
        let token = handle.await.expect("task joins");
        assert!(tokens.insert(token), "duplicate session token");
    }
    assert_eq!(server.sessions().len(), 16);
}

#[test]
fn lookup_empty_token_is_absent() {
    let sessions = Arc::new(SessionRegistry::new());
    assert!(sessions.lookup("").is_none());
}

#[test]
fn lookup_unknown_token_is_absent() {
    let sessions = Arc::new(SessionRegistry::new());
    assert!(sessions.lookup("no-such-session").is_none());
}

#[tokio::test]
async fn transport_not_discoverable_before_initialize() {
    let server = build_server();
    let transport = server.sessions().create();
    assert_eq!(transport.state(), SessionState::Created);
    assert!(server.sessions().lookup(transport.session_id()).is_none());
}

#[tokio::test]
async fn transport_discoverable_after_initialize() {
    let server = build_server();
    let token = initialize(&server).await;

    let transport = server
        .sessions()
        .lookup(&token)
        .expect("session registered after initialize");
    assert_eq!(transport.session_id(), token);
    assert_eq!(transport.state(), SessionState::Initialized);
}

#[tokio::test]
async fn double_bind_fails_fast() {
    let server = build_server();
    let transport = server.sessions().create();

    transport.bind(&server).expect("first bind succeeds");
    let err = transport.bind(&server).expect_err("second bind fails");
    assert!(matches!(err, AppError::Transport(_)));
}

#[tokio::test]
async fn close_removes_session_from_registry() {
    let server = build_server();
    let token = initialize(&server).await;
    assert_eq!(server.sessions().len(), 1);

    assert!(server.close_session(&token));
    assert!(server.sessions().lookup(&token).is_none());
    assert!(server.sessions().is_empty());

    // Closing again is a no-op miss.
    assert!(!server.close_session(&token));
}

#[tokio::test]
async fn stale_token_behaves_like_no_session() {
    let server = build_server();
    let first = initialize(&server).await;
    assert!(server.close_session(&first));

    // A request carrying the stale token gets a brand-new session.
    match server
        .handle(Some(&first), initialize_request())
        .await
        .expect("handle succeeds")
    {
        TransportReply::Message {
            session_id: Some(second),
            ..
        } => assert_ne!(first, second),
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn requests_on_same_session_share_one_transport() {
    let server = build_server();
    let token = initialize(&server).await;

    let first = server.sessions().lookup(&token).expect("registered");
    let second = server.sessions().lookup(&token).expect("still registered");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(server.sessions().len(), 1);
}
