use anyhow::Result;
use colored::*;

use localp2p_core::{ConfigStore, ConnectOutcome};

pub async fn run(store: &ConfigStore, address: Option<String>, port: Option<u16>) -> Result<()> {
    let dispatcher = super::dispatcher(store)?;

    match dispatcher.connect(address, port).await {
        Ok(ConnectOutcome::Connected { address, port }) => {
            println!("{}", format!("✓ Connected to {}:{}", address, port).green());
        }
        Ok(ConnectOutcome::NoPeers) => println!("{}", "No peers discovered".yellow()),
        Err(e) => super::report(&e),
    }

    Ok(())
}
