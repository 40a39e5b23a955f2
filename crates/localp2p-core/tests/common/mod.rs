//! In-process stand-in for the daemon's `/rpc` endpoint.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use localp2p_core::RpcClient;

#[derive(Clone)]
enum Reply {
    Envelope(Value),
    Raw(StatusCode, String),
}

#[derive(Default)]
struct Shared {
    replies: Mutex<HashMap<String, Reply>>,
    received: Mutex<Vec<Value>>,
}

pub struct FakeDaemon {
    pub endpoint: String,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl FakeDaemon {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .route("/rpc", post(handle_rpc))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{}/rpc", addr),
            shared,
            server,
        }
    }

    /// Answer `method` with the given `{result, error}` envelope
    pub fn reply(&self, method: &str, envelope: Value) -> &Self {
        self.shared
            .replies
            .lock()
            .unwrap()
            .insert(method.to_string(), Reply::Envelope(envelope));
        self
    }

    /// Answer `method` with an arbitrary body
    pub fn reply_raw(&self, method: &str, status: StatusCode, body: &str) -> &Self {
        self.shared
            .replies
            .lock()
            .unwrap()
            .insert(method.to_string(), Reply::Raw(status, body.to_string()));
        self
    }

    pub fn client(&self) -> RpcClient {
        RpcClient::with_endpoint(&self.endpoint).unwrap()
    }

    /// Every request body received, in order
    pub fn requests(&self) -> Vec<Value> {
        self.shared.received.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle_rpc(
    State(shared): State<Arc<Shared>>,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    shared.received.lock().unwrap().push(request);

    let reply = shared.replies.lock().unwrap().get(&method).cloned();
    let (status, body) = match reply {
        Some(Reply::Envelope(envelope)) => (StatusCode::OK, envelope.to_string()),
        Some(Reply::Raw(status, body)) => (status, body),
        None => (StatusCode::OK, json!({ "error": "Unknown method" }).to_string()),
    };
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

pub fn peer(id: &str, name: &str, address: &str, port: u16) -> Value {
    json!({
        "ID": id,
        "Name": name,
        "Address": address,
        "Port": port,
        "LastSeen": "2024-05-01T12:30:00Z",
    })
}

/// An endpoint nothing listens on
pub fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/rpc", port)
}
