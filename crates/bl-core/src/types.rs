//! Core domain types

use bl_protocol::NodeMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Grace period before the minimize watcher starts looking for a window
pub const DEFAULT_MINIMIZE_INITIAL_DELAY_MS: u64 = 5000;

/// One configured step of the launch sequence: a program to start, or a
/// process to kill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchItem {
    /// Execution order, dense 1..N within a sequence
    pub order: i32,
    /// Path to the executable or script; absent only for kill items
    pub path: Option<PathBuf>,
    /// Friendly name for logs and status output
    pub display_name: Option<String>,
    /// Wait after launching this item before starting the next, in milliseconds
    pub delay_ms: u64,
    /// Extra command-line arguments
    pub arguments: Option<String>,
    /// Working directory override; defaults to the executable's directory
    pub working_directory: Option<PathBuf>,
    /// Hint the program to start with a minimized window
    pub start_minimized: bool,
    /// Actively minimize the window once it appears
    pub force_minimize: bool,
    /// The program hides to the tray on its own once started
    pub start_to_tray: bool,
    /// Launch indirectly through a shell relay instead of directly
    pub use_command_relay: bool,
    /// The program should close to tray rather than exit
    pub close_to_tray: bool,
    /// Request elevated rights for this item
    pub run_as_admin: bool,
    /// Kill a running process instead of launching anything
    pub kill_instead_of_launch: bool,
    /// Process name to kill; derived from `path`'s file stem when absent
    pub kill_process_name: Option<String>,
    /// Override for the minimize watcher's initial grace period
    pub minimize_initial_delay_ms: Option<u64>,
}

impl LaunchItem {
    /// Name shown in logs and status lines: the explicit display name, the
    /// kill target, or the path's file stem.
    pub fn label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        if let Some(target) = self.kill_target() {
            return target;
        }
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(unnamed)".to_string())
    }

    /// Status-line label with the pending action: "Launch X" or "Kill X".
    pub fn action_label(&self) -> String {
        let verb = if self.kill_instead_of_launch { "Kill" } else { "Launch" };
        format!("{} {}", verb, self.label())
    }

    /// Process name this item terminates: the explicit name, else the path's
    /// file stem. `None` when neither is available.
    pub fn kill_target(&self) -> Option<String> {
        if let Some(name) = self.kill_process_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.trim().to_string());
        }
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
    }

    /// Grace period before window discovery starts. Unset or zero falls back
    /// to the global default.
    pub fn minimize_initial_delay(&self) -> Duration {
        let ms = match self.minimize_initial_delay_ms {
            Some(ms) if ms > 0 => ms,
            _ => DEFAULT_MINIMIZE_INITIAL_DELAY_MS,
        };
        Duration::from_millis(ms)
    }

    /// Whether any minimize behavior was requested
    pub fn wants_minimize(&self) -> bool {
        self.start_minimized || self.force_minimize
    }
}

/// Renumber `order` densely as 1..N, preserving current list order.
/// Applied after every reorder or removal so orders never grow gaps.
pub fn renumber(items: &mut [LaunchItem]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.order = i as i32 + 1;
    }
}

/// Move the item at `index` one position up. No-op at the top.
pub fn move_up(items: &mut Vec<LaunchItem>, index: usize) {
    if index > 0 && index < items.len() {
        items.swap(index, index - 1);
        renumber(items);
    }
}

/// Move the item at `index` one position down. No-op at the bottom.
pub fn move_down(items: &mut Vec<LaunchItem>, index: usize) {
    if index + 1 < items.len() {
        items.swap(index, index + 1);
        renumber(items);
    }
}

/// Remove the item at `index` and close the numbering gap.
pub fn remove(items: &mut Vec<LaunchItem>, index: usize) -> Option<LaunchItem> {
    if index >= items.len() {
        return None;
    }
    let removed = items.remove(index);
    renumber(items);
    Some(removed)
}

/// A Wake-on-LAN target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteMachine {
    /// Friendly name
    pub name: String,
    /// IPv4 address used for unicast wake and echo confirmation; may be empty
    pub ip_address: String,
    /// Hardware address as entered; validated when a wake is attempted
    pub mac_address: String,
    /// Included in the wake batch
    pub is_selected: bool,
}

/// A peer seen via the discovery protocol.
///
/// Entries are mutated in place on every re-observation and never evicted;
/// `last_seen` lets a presentation layer grey out stale rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredNode {
    /// Machine name, the case-insensitive primary key
    pub name: String,
    /// Role from the most recent heartbeat
    pub mode: NodeMode,
    /// MAC from the most recent heartbeat
    pub mac_address: String,
    /// Every IPv4 address ever reported for this name, insertion-ordered
    pub all_ips: Vec<String>,
    /// Unix millis of the most recent observation
    pub last_seen: u64,
    /// Whether this entry is the local machine itself
    pub is_self: bool,
}
