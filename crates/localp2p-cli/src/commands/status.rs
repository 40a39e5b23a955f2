use anyhow::Result;
use colored::*;

use localp2p_core::ConfigStore;

pub async fn run(store: &ConfigStore) -> Result<()> {
    let dispatcher = super::dispatcher(store)?;

    let connections = match dispatcher.status().await {
        Ok(connections) => connections,
        Err(e) => {
            super::report(&e);
            return Ok(());
        }
    };

    println!("{}", format!("Active connections: {}", connections.len()).green());
    if !connections.is_empty() {
        println!("{}", "─".repeat(30).dimmed());
        for (index, peer) in connections.iter().enumerate() {
            println!("{}. {}", index + 1, peer.cyan());
        }
    }

    Ok(())
}
