use std::path::PathBuf;

use anyhow::Result;
use colored::*;
use tokio::sync::mpsc;
use tracing::debug;

use localp2p_core::supervisor::{daemon_args, termination_requests, BUILD_HINT};
use localp2p_core::{ConfigStore, DaemonProcess};

/// Run the core in the foreground until it exits.
///
/// Returns the core's exit code, or `None` if it never started.
pub async fn run(
    store: &ConfigStore,
    port: Option<u16>,
    rpc_port: Option<u16>,
    binary: Option<PathBuf>,
) -> Result<Option<i32>> {
    let config = store.config();
    let rpc_port = rpc_port.unwrap_or(config.rpc_port);
    let port = port.unwrap_or(config.core_port);
    let binary = binary.unwrap_or_else(|| PathBuf::from(&config.core_binary_path));

    println!("{}", "Starting LocalP2P core...".blue());
    // The core takes its listen port from its own config file
    debug!("Core port {} is not passed to {}", port, binary.display());

    let process = match DaemonProcess::spawn(&binary, &daemon_args(rpc_port)) {
        Ok(process) => process,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            let mut hint = BUILD_HINT.lines();
            if let Some(first) = hint.next() {
                println!("{}", first.yellow());
            }
            for line in hint {
                println!("{}", line.dimmed());
            }
            return Ok(None);
        }
    };

    let mut signals = termination_requests();
    let (forward_tx, forward_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        while signals.recv().await.is_some() {
            println!("{}", "\nShutting down...".yellow());
            if forward_tx.send(()).await.is_err() {
                break;
            }
        }
    });

    match process.supervise(forward_rx).await {
        Ok(exit) => {
            println!("{}", format!("Core exited with code {}", exit.code).yellow());
            Ok(Some(exit.code))
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            Ok(None)
        }
    }
}
