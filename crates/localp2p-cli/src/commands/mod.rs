pub mod config;
pub mod connect;
pub mod discover;
pub mod send;
pub mod start;
pub mod status;

use anyhow::Result;
use clap::CommandFactory;
use colored::*;

use localp2p_core::{CommandError, ConfigStore, Dispatcher};

use crate::terminal::TerminalPrompter;

/// Dispatcher bound to the configured daemon and this terminal
fn dispatcher(store: &ConfigStore) -> Result<Dispatcher<TerminalPrompter>> {
    Ok(Dispatcher::from_config(store, TerminalPrompter::new())?)
}

/// Print a failed command: the message, then any hint
pub fn report(err: &CommandError) {
    if err.is_cancelled() {
        println!("{}", "Cancelled".yellow());
        return;
    }

    eprintln!("{}", err.to_string().red());
    if let Some(hint) = err.hint() {
        println!();
        for line in hint.lines() {
            println!("{}", line.yellow());
        }
    }
}

/// Print an error that escaped a command handler
pub fn print_failure(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red(), err);
}

/// Help text plus the quick-start walkthrough
pub fn usage() -> Result<()> {
    crate::Cli::command().print_help()?;
    println!();
    println!("{}", "Quick start:".dimmed());
    println!("{}", "  1. localp2p start    # Start the core service".dimmed());
    println!("{}", "  2. localp2p discover # Find peers".dimmed());
    println!("{}", "  3. localp2p connect  # Connect to a peer".dimmed());
    println!("{}", "  4. localp2p send     # Send a message".dimmed());
    Ok(())
}
