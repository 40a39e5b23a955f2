use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use localp2p_core::ConfigStore;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "localp2p")]
#[command(author, version, about = "LocalP2P - Secure local network communication")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the per-user one
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the LocalP2P core daemon
    Start {
        /// Core service port
        #[arg(short, long)]
        port: Option<u16>,
        /// RPC server port
        #[arg(short, long)]
        rpc_port: Option<u16>,
        /// Core binary to run
        #[arg(short, long, value_name = "PATH")]
        binary: Option<PathBuf>,
    },
    /// Discover peers on the local network
    Discover,
    /// Connect to a peer
    Connect {
        /// Peer IP address
        #[arg(short, long)]
        address: Option<String>,
        /// Peer port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send a message to a connected peer
    Send {
        /// Message to send
        message: Option<String>,
        /// Target peer ID
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Show current status and connections
    Status,
    /// Read or change client settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the whole configuration
    Show,
    /// Print one setting
    Get {
        /// rpcPort, corePort, coreBinaryPath or autoStart
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// rpcPort, corePort, coreBinaryPath or autoStart
        key: String,
        value: String,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let Some(command) = cli.command else {
        commands::usage()?;
        return Ok(());
    };

    // Load configuration
    let mut store = match cli.config {
        Some(path) => ConfigStore::open(path),
        None => ConfigStore::load_default(),
    };

    let result = match command {
        Commands::Start {
            port,
            rpc_port,
            binary,
        } => match commands::start::run(&store, port, rpc_port, binary).await {
            // The daemon's own exit code becomes ours
            Ok(Some(code)) if code != 0 => std::process::exit(code),
            other => other.map(|_| ()),
        },
        Commands::Discover => commands::discover::run(&store).await,
        Commands::Connect { address, port } => commands::connect::run(&store, address, port).await,
        Commands::Send { message, to } => commands::send::run(&store, message, to).await,
        Commands::Status => commands::status::run(&store).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&store),
            ConfigAction::Get { key } => commands::config::get(&store, &key),
            ConfigAction::Set { key, value } => commands::config::set(&mut store, &key, &value),
            ConfigAction::Path => commands::config::path(&store),
        },
    };

    if let Err(e) = result {
        commands::print_failure(&e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_takes_positional_message() {
        let cli = Cli::try_parse_from(["localp2p", "send", "hello world", "--to", "peer-1"]).unwrap();
        match cli.command {
            Some(Commands::Send { message, to }) => {
                assert_eq!(message.as_deref(), Some("hello world"));
                assert_eq!(to.as_deref(), Some("peer-1"));
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_start_ports_are_optional() {
        let cli = Cli::try_parse_from(["localp2p", "start", "-r", "9191"]).unwrap();
        match cli.command {
            Some(Commands::Start { port, rpc_port, binary }) => {
                assert_eq!(port, None);
                assert_eq!(rpc_port, Some(9191));
                assert!(binary.is_none());
            }
            _ => panic!("expected start"),
        }
    }

    #[test]
    fn test_connect_rejects_bad_port() {
        assert!(Cli::try_parse_from(["localp2p", "connect", "-p", "notaport"]).is_err());
    }

    #[test]
    fn test_no_command_is_allowed() {
        let cli = Cli::try_parse_from(["localp2p"]).unwrap();
        assert!(cli.command.is_none());
    }
}
