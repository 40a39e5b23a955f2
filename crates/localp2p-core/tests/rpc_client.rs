mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{peer, refused_endpoint, FakeDaemon};
use localp2p_core::rpc::TransportKind;
use localp2p_core::{RpcClient, RpcError};

#[tokio::test]
async fn test_request_envelope_shape() {
    let daemon = FakeDaemon::start().await;
    daemon.reply("send", json!({ "result": "Message sent" }));

    daemon.client().send("peer-1", "hello").await.unwrap();

    assert_eq!(
        daemon.requests(),
        vec![json!({ "method": "send", "params": { "to": "peer-1", "content": "hello" } })]
    );
}

#[tokio::test]
async fn test_discover_decodes_peers_in_order() {
    let daemon = FakeDaemon::start().await;
    daemon.reply(
        "discover",
        json!({ "result": [peer("b", "Bravo", "10.0.0.3", 8080), peer("a", "Alpha", "10.0.0.2", 9090)] }),
    );

    let peers = daemon.client().discover().await.unwrap();
    let names: Vec<&str> = peers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bravo", "Alpha"]);
    assert_eq!(peers[1].port, 9090);
}

#[tokio::test]
async fn test_omitted_result_is_empty_list() {
    let daemon = FakeDaemon::start().await;
    daemon.reply("connections", json!({}));

    assert!(daemon.client().connections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_application_error_is_verbatim() {
    let daemon = FakeDaemon::start().await;
    daemon.reply("connect", json!({ "error": "Invalid parameters" }));

    match daemon.client().connect("10.0.0.2", 9090).await {
        Err(RpcError::Application(message)) => assert_eq!(message, "Invalid parameters"),
        other => panic!("unexpected {:?}", other),
    }
    // Not retried
    assert_eq!(daemon.methods(), vec!["connect"]);
}

#[tokio::test]
async fn test_unknown_method_reports_daemon_error() {
    let daemon = FakeDaemon::start().await;
    let err = daemon.client().call("ping", json!({})).await.unwrap_err();
    assert_eq!(err.to_string(), "Unknown method");
}

#[tokio::test]
async fn test_non_envelope_body_is_transport_error() {
    let daemon = FakeDaemon::start().await;
    daemon.reply_raw("discover", StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n");

    let err = daemon.client().discover().await.unwrap_err();
    assert!(matches!(
        err,
        RpcError::Transport { kind: TransportKind::MalformedResponse, .. }
    ));
    assert!(err.to_string().contains("405"));
}

#[tokio::test]
async fn test_wrong_result_shape_is_transport_error() {
    let daemon = FakeDaemon::start().await;
    daemon.reply("connections", json!({ "result": "not a list" }));

    let err = daemon.client().connections().await.unwrap_err();
    assert!(err.is_transport());
    assert!(!err.is_connection_refused());
}

#[tokio::test]
async fn test_refused_connection() {
    let client = RpcClient::with_endpoint(&refused_endpoint()).unwrap();
    let err = client.discover().await.unwrap_err();
    assert!(err.is_connection_refused(), "got {:?}", err);
}
