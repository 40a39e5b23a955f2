use anyhow::Result;
use colored::*;

use localp2p_core::{ConfigStore, SendOutcome};

pub async fn run(store: &ConfigStore, message: Option<String>, to: Option<String>) -> Result<()> {
    let dispatcher = super::dispatcher(store)?;

    match dispatcher.send(message, to).await {
        Ok(SendOutcome::Sent { to, content }) => {
            println!("{}", format!("✓ Message sent to {}", to).green());
            println!("{}", format!("\"{}\"", content).dimmed());
        }
        Ok(SendOutcome::NoConnections) => {
            println!("{}", "No active connections".yellow());
            println!("{}", "Use \"localp2p connect\" to connect to a peer first".dimmed());
        }
        Err(e) => super::report(&e),
    }

    Ok(())
}
