//! bootlaunch CLI
//!
//! Single binary for all bootlaunch operations:
//! - Run the staged launch sequence
//! - Wake remote machines over the LAN
//! - Watch the discovery protocol
//! - Maintain the launch list and settings file

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bl_core::config::default_config_path;
use bl_orchestrator::RunOutcome;
use bl_protocol::NodeMode;
use bootlaunch::commands::{
    config_init, config_path, config_show, discover_command, items_command, run_command,
    wake_command, ItemsAction,
};
use bootlaunch::output::print_error;

#[derive(Parser)]
#[command(name = "bootlaunch")]
#[command(author, version, about = "Staged startup launcher with LAN discovery and Wake-on-LAN")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the launch sequence
    Run {
        /// Override the configured node mode (Master or Slave)
        #[arg(short, long)]
        mode: Option<NodeMode>,
    },

    /// Send Wake-on-LAN to a named machine, or to all selected ones
    Wake {
        /// Machine name from the settings file
        name: Option<String>,
        /// Wake every machine marked as selected
        #[arg(long)]
        all_selected: bool,
        /// List the configured machines instead of waking anything
        #[arg(long)]
        list: bool,
    },

    /// Listen for peer heartbeats and print the node table
    Discover {
        /// How long to listen, in seconds
        #[arg(long, default_value_t = 6)]
        listen_secs: u64,
        /// Broadcast a heartbeat immediately instead of waiting a tick
        #[arg(long)]
        announce_now: bool,
    },

    /// List or edit the launch sequence
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the settings file path
    Path,
    /// Create a default settings file
    Init,
    /// Show the current settings
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Run { mode } => match run_command(&config, mode).await {
            Ok(RunOutcome::Completed) => {}
            Ok(RunOutcome::Cancelled) => std::process::exit(1),
            Ok(RunOutcome::Aborted) => std::process::exit(2),
            Err(e) => {
                print_error(&format!("{:#}", e));
                std::process::exit(2);
            }
        },

        Commands::Wake {
            name,
            all_selected,
            list,
        } => {
            wake_command(&config, name.as_deref(), all_selected, list).await?;
        }

        Commands::Discover {
            listen_secs,
            announce_now,
        } => {
            discover_command(&config, listen_secs, announce_now).await?;
        }

        Commands::Items { action } => {
            items_command(&config, action)?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Path => config_path(&config),
            ConfigAction::Init => config_init(&config)?,
            ConfigAction::Show => config_show(&config)?,
        },
    }

    Ok(())
}
