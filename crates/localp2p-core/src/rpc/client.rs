//! HTTP client for the daemon's `/rpc` endpoint
//!
//! Provides a type-safe interface over the four methods the CLI consumes.

use std::error::Error as StdError;
use std::io::ErrorKind;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::protocol::*;
use super::{RpcError, TransportKind};
use crate::config::AppConfig;
use crate::Result;

/// Client for the daemon's RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RpcClient {
    /// Client for `http://localhost:<rpc_port>/rpc`
    pub fn new(rpc_port: u16) -> Result<Self> {
        Self::with_endpoint(&format!("http://localhost:{}/rpc", rpc_port))
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.rpc_port)
    }

    /// Client for an arbitrary endpoint URL
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        // Transport timeouts are left at reqwest's defaults
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// List peers the daemon has discovered, in daemon order
    pub async fn discover(&self) -> std::result::Result<Vec<Peer>, RpcError> {
        let result = self.call(methods::DISCOVER, serde_json::json!({})).await?;
        decode(methods::DISCOVER, result)
    }

    /// Ask the daemon to connect to a peer
    pub async fn connect(&self, address: &str, port: u16) -> std::result::Result<(), RpcError> {
        let params = ConnectParams {
            address: address.to_string(),
            port,
        };
        self.call(methods::CONNECT, to_params(&params)?).await?;
        Ok(())
    }

    /// Identifiers of the peers the daemon currently holds connections to
    pub async fn connections(&self) -> std::result::Result<Vec<String>, RpcError> {
        let result = self.call(methods::CONNECTIONS, serde_json::json!({})).await?;
        decode(methods::CONNECTIONS, result)
    }

    /// Send a message to a connected peer
    pub async fn send(&self, to: &str, content: &str) -> std::result::Result<(), RpcError> {
        let params = SendParams {
            to: to.to_string(),
            content: content.to_string(),
        };
        self.call(methods::SEND, to_params(&params)?).await?;
        Ok(())
    }

    /// Send a request and classify the response
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, RpcError> {
        debug!("RPC {} -> {}", method, self.endpoint);

        let request = Request::new(method).with_params(params);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| transport_error(&e))?;

        let envelope: Response = serde_json::from_slice(&body).map_err(|e| {
            RpcError::transport(
                TransportKind::MalformedResponse,
                format!("malformed response from daemon (HTTP {}): {}", status, e),
            )
        })?;

        let result = envelope.into_result();
        if let Err(RpcError::Application(message)) = &result {
            debug!("RPC {} returned error: {}", method, message);
        }
        result
    }
}

fn to_params<T: serde::Serialize>(params: &T) -> std::result::Result<serde_json::Value, RpcError> {
    serde_json::to_value(params)
        .map_err(|e| RpcError::transport(TransportKind::Other, format!("invalid params: {}", e)))
}

fn decode<T: DeserializeOwned>(
    method: &str,
    result: serde_json::Value,
) -> std::result::Result<T, RpcError> {
    serde_json::from_value(result).map_err(|e| {
        RpcError::transport(
            TransportKind::MalformedResponse,
            format!("unexpected result for {}: {}", method, e),
        )
    })
}

fn transport_error(err: &reqwest::Error) -> RpcError {
    RpcError::transport(classify(err), error_chain(err))
}

/// Map a reqwest failure onto the transport taxonomy.
///
/// Connection refusal is detected from the underlying io error, which sits
/// a few layers down the source chain.
fn classify(err: &reqwest::Error) -> TransportKind {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == ErrorKind::ConnectionRefused {
                return TransportKind::ConnectionRefused;
            }
        }
        source = cause.source();
    }

    if err.is_timeout() {
        TransportKind::Timeout
    } else if err.is_decode() || err.is_body() {
        TransportKind::MalformedResponse
    } else if err.is_connect() {
        if error_chain(err).to_lowercase().contains("refused") {
            TransportKind::ConnectionRefused
        } else {
            TransportKind::Connect
        }
    } else {
        TransportKind::Other
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let client = RpcClient::from_config(&AppConfig::default()).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:9090/rpc");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        assert!(RpcClient::with_endpoint("not a url").is_err());
    }

    #[tokio::test]
    async fn test_refused_connection_is_classified() {
        // Grab a free port, then close it so nothing listens there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = RpcClient::with_endpoint(&format!("http://127.0.0.1:{}/rpc", port)).unwrap();
        let err = client.connections().await.unwrap_err();
        assert!(err.is_connection_refused(), "got {:?}", err);
    }
}
