//! Wire contract for daemon calls
//!
//! Every call is an HTTP POST of `{method, params}` answered with
//! `{result?, error?}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RpcError;

/// Request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: serde_json::json!({}),
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Response envelope as the daemon sends it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Collapse the envelope into a tagged result.
    ///
    /// A non-empty `error` wins regardless of `result`. A missing or null
    /// `result` becomes an empty list, which is how the daemon encodes
    /// "nothing found".
    pub fn into_result(self) -> Result<serde_json::Value, RpcError> {
        match self.error {
            Some(message) if !message.is_empty() => Err(RpcError::Application(message)),
            _ => Ok(match self.result {
                None | Some(serde_json::Value::Null) => serde_json::Value::Array(Vec::new()),
                Some(value) => value,
            }),
        }
    }
}

// Method names
pub mod methods {
    pub const DISCOVER: &str = "discover";
    pub const CONNECT: &str = "connect";
    pub const CONNECTIONS: &str = "connections";
    pub const SEND: &str = "send";
}

/// A peer seen by the daemon's discovery, as listed by `discover`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Peer {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectParams {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendParams {
    pub to: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::new(methods::DISCOVER);
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"method":"discover","params":{}}"#);
    }

    #[test]
    fn test_error_wins_over_result() {
        let resp: Response =
            serde_json::from_str(r#"{"result":"Connected successfully","error":"peer unreachable"}"#)
                .unwrap();
        match resp.into_result() {
            Err(RpcError::Application(message)) => assert_eq!(message, "peer unreachable"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_result_defaults_to_empty_list() {
        let resp: Response = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.into_result().unwrap(), serde_json::json!([]));

        let resp: Response = serde_json::from_str(r#"{"result":null,"error":""}"#).unwrap();
        assert_eq!(resp.into_result().unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_peer_uses_daemon_field_names() {
        let peer: Peer = serde_json::from_str(
            r#"{"ID":"n-1","Name":"A","Address":"10.0.0.2","Port":9090,"LastSeen":"2024-05-01T12:30:00.123456+02:00"}"#,
        )
        .unwrap();
        assert_eq!(peer.id, "n-1");
        assert_eq!(peer.address, "10.0.0.2");
        assert_eq!(peer.port, 9090);
        assert_eq!(peer.last_seen.to_rfc3339(), "2024-05-01T10:30:00.123456+00:00");
    }
}
