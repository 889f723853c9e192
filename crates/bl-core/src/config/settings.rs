//! Persistent settings: the launch list, wake targets, and service tunables

use bl_protocol::{NodeMode, DISCOVERY_PORT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{renumber, LaunchItem, RemoteMachine};

/// Everything the orchestrator and services read at the start of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Role of this node; masters wake peers before launching
    pub mode: NodeMode,
    /// Ordered launch sequence
    pub launch_items: Vec<LaunchItem>,
    /// Wake-on-LAN targets
    pub remote_machines: Vec<RemoteMachine>,
    /// Discovery service tunables
    pub discovery: DiscoveryConfig,
    /// Wake coordinator tunables
    pub wake: WakeConfig,
}

impl Settings {
    /// Launch items sorted by `order`, ready for a run. Also repairs any
    /// numbering gaps picked up from hand-edited config files.
    pub fn items_in_order(&self) -> Vec<LaunchItem> {
        let mut items = self.launch_items.clone();
        items.sort_by_key(|i| i.order);
        renumber(&mut items);
        items
    }

    /// Machines included in the wake batch
    pub fn selected_machines(&self) -> Vec<RemoteMachine> {
        self.remote_machines
            .iter()
            .filter(|m| m.is_selected)
            .cloned()
            .collect()
    }
}

/// Discovery service tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// UDP port for heartbeat broadcast and listening
    pub port: u16,
    /// Seconds between heartbeats
    pub heartbeat_interval_secs: u64,
    /// Whether the periodic heartbeat starts enabled
    pub heartbeat_enabled: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DISCOVERY_PORT,
            heartbeat_interval_secs: 5,
            heartbeat_enabled: true,
        }
    }
}

impl DiscoveryConfig {
    /// Heartbeat period as a `Duration`
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

/// Wake coordinator tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeConfig {
    /// Send-and-confirm attempts per machine
    pub retries: u32,
    /// Seconds to wait after each send before checking reachability
    pub retry_delay_secs: u64,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_secs: 5,
        }
    }
}

impl WakeConfig {
    /// Per-attempt wait as a `Duration`
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, save_config};

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.mode, NodeMode::Slave);
        assert_eq!(settings.discovery.port, DISCOVERY_PORT);
        assert_eq!(settings.discovery.heartbeat_interval_secs, 5);
        assert!(settings.discovery.heartbeat_enabled);
        assert_eq!(settings.wake.retries, 3);
        assert_eq!(settings.wake.retry_delay_secs, 5);
    }

    #[test]
    fn test_items_in_order_sorts_and_renumbers() {
        let mut settings = Settings::default();
        for (order, name) in [(9, "c"), (2, "a"), (5, "b")] {
            settings.launch_items.push(LaunchItem {
                order,
                display_name: Some(name.to_string()),
                ..Default::default()
            });
        }

        let items = settings.items_in_order();
        let names: Vec<String> = items.iter().map(|i| i.label()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(items.iter().map(|i| i.order).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_selected_machines() {
        let mut settings = Settings::default();
        settings.remote_machines = vec![
            RemoteMachine {
                name: "nas".to_string(),
                mac_address: "AA-BB-CC-DD-EE-FF".to_string(),
                is_selected: true,
                ..Default::default()
            },
            RemoteMachine {
                name: "htpc".to_string(),
                is_selected: false,
                ..Default::default()
            },
        ];
        let selected = settings.selected_machines();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "nas");
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.mode = NodeMode::Master;
        settings.launch_items.push(LaunchItem {
            order: 1,
            path: Some("/usr/bin/vlc".into()),
            delay_ms: 2500,
            start_minimized: true,
            ..Default::default()
        });

        save_config(&path, &settings).unwrap();
        let loaded: Settings = load_config(&path).unwrap();

        assert_eq!(loaded.mode, NodeMode::Master);
        assert_eq!(loaded.launch_items.len(), 1);
        assert_eq!(loaded.launch_items[0].delay_ms, 2500);
        assert!(loaded.launch_items[0].start_minimized);
    }
}
