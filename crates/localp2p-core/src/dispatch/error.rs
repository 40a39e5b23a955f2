use thiserror::Error;

use crate::prompt::PromptError;
use crate::rpc::RpcError;

/// Shown whenever the daemon could not be reached
pub const DAEMON_HINT: &str = "Tip: Make sure the LocalP2P core is running\nRun: localp2p start";

/// The daemon call a command was making when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Discover,
    Connect,
    Connections,
    Send,
    Status,
}

impl Step {
    /// Leading text of the message shown when this step fails with `source`
    pub fn prefix(&self, source: &RpcError) -> &'static str {
        match (source, self) {
            (RpcError::Application(_), Step::Connect) => "Connection failed",
            (RpcError::Application(_), Step::Send) => "Failed to send message",
            (RpcError::Application(_), _) => "Error",
            (RpcError::Transport { .. }, Step::Discover) => "Failed to discover peers",
            (RpcError::Transport { .. }, Step::Connect) => "Failed to connect",
            (RpcError::Transport { .. }, Step::Connections) => "Failed to get connections",
            (RpcError::Transport { .. }, Step::Send) => "Failed to send message",
            (RpcError::Transport { .. }, Step::Status) => "Core is not running",
        }
    }
}

/// Terminal failure of one command, ready to be shown to the operator
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{}: {source}", .step.prefix(.source))]
    Rpc {
        step: Step,
        #[source]
        source: RpcError,
    },

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl CommandError {
    pub fn rpc(step: Step) -> impl FnOnce(RpcError) -> CommandError {
        move |source| CommandError::Rpc { step, source }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Prompt(PromptError::Cancelled))
    }

    /// Follow-up advice, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CommandError::Rpc { step: Step::Status, source } if source.is_transport() => {
                Some(DAEMON_HINT)
            }
            CommandError::Rpc { source, .. } if source.is_connection_refused() => Some(DAEMON_HINT),
            _ => None,
        }
    }

    /// The message and its hint as one block of text
    pub fn report(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n{}", self, hint),
            None => self.to_string(),
        }
    }
}
