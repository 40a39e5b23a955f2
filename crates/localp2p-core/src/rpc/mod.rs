//! RPC client for the local daemon
//!
//! Carries the daemon's `{method, params}` / `{result, error}` protocol over
//! HTTP and turns every outcome into either a value or a classified
//! [`RpcError`].

mod client;
mod protocol;

pub use client::RpcClient;
pub use protocol::*;

use std::fmt;

use thiserror::Error;

/// Why a call never produced a daemon answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Nothing is listening on the RPC port
    ConnectionRefused,
    Timeout,
    /// The daemon answered with something that is not an RPC envelope
    MalformedResponse,
    Connect,
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::ConnectionRefused => "connection refused",
            TransportKind::Timeout => "timed out",
            TransportKind::MalformedResponse => "malformed response",
            TransportKind::Connect => "connect failed",
            TransportKind::Other => "request failed",
        };
        f.write_str(name)
    }
}

/// Failure of a single RPC call. Never retried.
#[derive(Error, Debug)]
pub enum RpcError {
    /// The HTTP exchange itself failed
    #[error("{message}")]
    Transport { kind: TransportKind, message: String },

    /// The daemon answered with a non-empty `error` field
    #[error("{0}")]
    Application(String),
}

impl RpcError {
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        RpcError::Transport {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport { .. })
    }

    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            RpcError::Transport {
                kind: TransportKind::ConnectionRefused,
                ..
            }
        )
    }
}
