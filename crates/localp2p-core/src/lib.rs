pub mod config;
pub mod dispatch;
pub mod error;
pub mod prompt;
pub mod rpc;
pub mod supervisor;

pub use config::{AppConfig, ConfigKey, ConfigStore};
pub use dispatch::{CommandError, ConnectOutcome, Dispatcher, SendOutcome};
pub use error::{Error, Result};
pub use prompt::{Prompter, ScriptedPrompter};
pub use rpc::{Peer, RpcClient, RpcError};
pub use supervisor::{DaemonExit, DaemonProcess, SupervisorError};
