//! Discover command implementation

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use bl_core::config::{load_config, Settings};
use bl_core::machine_name;
use bl_discovery::{DiscoveryService, NodeTable};

use crate::output::{format_nodes, print_info};

/// Listen for heartbeats for a while and print every node seen.
///
/// Works without a settings file; defaults are used when none exists.
pub async fn discover_command(
    config_path: &Path,
    listen_secs: u64,
    announce_now: bool,
) -> Result<()> {
    let settings: Settings = if config_path.exists() {
        load_config(config_path)
            .with_context(|| format!("loading settings from {}", config_path.display()))?
    } else {
        Settings::default()
    };

    let (obs_tx, mut obs_rx) = mpsc::channel(64);
    let mode = settings.mode;
    let handle = DiscoveryService::spawn(
        settings.discovery.clone(),
        machine_name(),
        Arc::new(move || mode),
        obs_tx,
    )
    .await
    .context("starting discovery service")?;

    if announce_now {
        handle.force_broadcast();
    }

    print_info(&format!(
        "Listening for nodes on UDP {} for {}s…",
        handle.port(),
        listen_secs
    ));

    let table = NodeTable::new();
    let deadline = tokio::time::sleep(Duration::from_secs(listen_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            obs = obs_rx.recv() => match obs {
                Some(obs) => table.apply(&obs),
                None => break,
            },
        }
    }

    handle.shutdown().await;
    println!("{}", format_nodes(&table.snapshot()));
    Ok(())
}
