//! Command flows
//!
//! Each flow turns a possibly under-specified request into discovery calls,
//! prompts and one final daemon call. Flows never print; they return an
//! outcome or a [`CommandError`] for the caller to render.

mod error;

pub use error::{CommandError, Step, DAEMON_HINT};

use std::future::Future;

use tracing::debug;

use crate::config::ConfigStore;
use crate::prompt::{non_empty, select_choice, Choice, Prompter};
use crate::rpc::{Peer, RpcClient};

/// Result of [`Dispatcher::connect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected { address: String, port: u16 },
    /// Discovery was needed and found nobody; nothing was prompted
    NoPeers,
}

/// Result of [`Dispatcher::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { to: String, content: String },
    /// A target was needed and the daemon holds no connections
    NoConnections,
}

pub struct Dispatcher<P> {
    rpc: RpcClient,
    prompter: P,
}

impl<P: Prompter> Dispatcher<P> {
    pub fn new(rpc: RpcClient, prompter: P) -> Self {
        Self { rpc, prompter }
    }

    /// Dispatcher talking to the RPC port from `store`
    pub fn from_config(store: &ConfigStore, prompter: P) -> crate::Result<Self> {
        Ok(Self::new(RpcClient::from_config(store.config())?, prompter))
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Peers known to the daemon, in daemon order. Empty is not an error.
    pub async fn discover(&self) -> Result<Vec<Peer>, CommandError> {
        self.tracked("Discovering peers...", self.rpc.discover())
            .await
            .map_err(CommandError::rpc(Step::Discover))
    }

    /// Connect to `address:port`, choosing from discovered peers when either
    /// part is missing.
    pub async fn connect(
        &self,
        address: Option<String>,
        port: Option<u16>,
    ) -> Result<ConnectOutcome, CommandError> {
        let address = address.filter(|a| !a.trim().is_empty());

        let (address, port) = match (address, port) {
            (Some(address), Some(port)) => (address, port),
            _ => {
                let peers = self.discover().await?;
                if peers.is_empty() {
                    return Ok(ConnectOutcome::NoPeers);
                }

                let choices: Vec<Choice<(String, u16)>> = peers
                    .into_iter()
                    .map(|peer| {
                        Choice::new(
                            format!("{} ({}:{})", peer.name, peer.address, peer.port),
                            (peer.address, peer.port),
                        )
                    })
                    .collect();
                select_choice(&self.prompter, "Select a peer to connect to:", &choices).await?
            }
        };

        debug!("Connecting to {}:{}", address, port);
        let label = format!("Connecting to {}:{}...", address, port);
        self.tracked(&label, self.rpc.connect(&address, port))
            .await
            .map_err(CommandError::rpc(Step::Connect))?;

        Ok(ConnectOutcome::Connected { address, port })
    }

    /// Send `message` to `to`, choosing the target among active connections
    /// and prompting for the text when either is missing.
    pub async fn send(
        &self,
        message: Option<String>,
        to: Option<String>,
    ) -> Result<SendOutcome, CommandError> {
        let to = match to.filter(|t| !t.trim().is_empty()) {
            Some(to) => to,
            None => {
                let connections = self
                    .tracked("Getting connected peers...", self.rpc.connections())
                    .await
                    .map_err(CommandError::rpc(Step::Connections))?;
                if connections.is_empty() {
                    return Ok(SendOutcome::NoConnections);
                }

                let choices: Vec<Choice<String>> = connections
                    .into_iter()
                    .map(|id| Choice::new(id.clone(), id))
                    .collect();
                select_choice(&self.prompter, "Select a peer to send message to:", &choices)
                    .await?
            }
        };

        let content = match message.filter(|m| non_empty(m).is_ok()) {
            Some(message) => message,
            None => {
                self.prompter
                    .get_text("Enter your message:", non_empty)
                    .await?
            }
        };

        let label = format!("Sending message to {}...", to);
        self.tracked(&label, self.rpc.send(&to, &content))
            .await
            .map_err(CommandError::rpc(Step::Send))?;

        Ok(SendOutcome::Sent { to, content })
    }

    /// Identifiers of active connections, in daemon order
    pub async fn status(&self) -> Result<Vec<String>, CommandError> {
        self.rpc
            .connections()
            .await
            .map_err(CommandError::rpc(Step::Status))
    }

    async fn tracked<T>(&self, message: &str, call: impl Future<Output = T>) -> T {
        self.prompter.begin_activity(message);
        let out = call.await;
        self.prompter.end_activity();
        out
    }
}
