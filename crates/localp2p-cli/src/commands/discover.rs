use anyhow::Result;
use chrono::Local;
use colored::*;

use localp2p_core::{ConfigStore, Peer};

pub async fn run(store: &ConfigStore) -> Result<()> {
    let dispatcher = super::dispatcher(store)?;

    match dispatcher.discover().await {
        Ok(peers) if peers.is_empty() => println!("{}", "No peers discovered".yellow()),
        Ok(peers) => print_peers(&peers),
        Err(e) => super::report(&e),
    }

    Ok(())
}

fn print_peers(peers: &[Peer]) {
    println!("{}", format!("\nFound {} peer(s):", peers.len()).green());
    println!("{}", "─".repeat(60).dimmed());

    for (index, peer) in peers.iter().enumerate() {
        println!("{}. {} ({})", index + 1, peer.name.cyan(), peer.id.dimmed());
        println!("   {} {}:{}", "Address:".dimmed(), peer.address, peer.port);
        println!(
            "   {} {}",
            "Last seen:".dimmed(),
            peer.last_seen.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        println!();
    }
}
