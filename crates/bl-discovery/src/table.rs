//! Discovered-node table
//!
//! Single logical writer: whoever drains the observation channel applies
//! entries here. Readers can snapshot at any time.

use dashmap::DashMap;

use bl_core::time::current_time_millis;
use bl_core::DiscoveredNode;

use crate::service::NodeObservation;

/// Table of every peer seen on the network, keyed by lowercased name.
/// Entries persist for the process lifetime; staleness is visible via
/// `last_seen` but never drives removal.
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: DashMap<String, DiscoveredNode>,
}

impl NodeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one observation: refresh mode, MAC, `last_seen` and the self
    /// flag; append the IP if it has not been seen for this name before.
    /// Known IPs are never removed.
    pub fn apply(&self, obs: &NodeObservation) {
        let key = obs.name.to_lowercase();
        let now = current_time_millis();

        let mut entry = self.nodes.entry(key).or_insert_with(|| DiscoveredNode {
            name: obs.name.clone(),
            mode: obs.mode,
            mac_address: obs.mac.clone(),
            all_ips: Vec::new(),
            last_seen: now,
            is_self: obs.is_self,
        });

        entry.mode = obs.mode;
        entry.is_self = obs.is_self;
        entry.last_seen = now;
        if !obs.mac.is_empty() {
            entry.mac_address = obs.mac.clone();
        }
        if !obs.ip.is_empty() && !entry.all_ips.contains(&obs.ip) {
            entry.all_ips.push(obs.ip.clone());
        }
    }

    /// Number of known nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been seen yet
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up one node by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<DiscoveredNode> {
        self.nodes.get(&name.to_lowercase()).map(|n| n.clone())
    }

    /// All known nodes, sorted by name
    pub fn snapshot(&self) -> Vec<DiscoveredNode> {
        let mut nodes: Vec<DiscoveredNode> =
            self.nodes.iter().map(|entry| entry.value().clone()).collect();
        nodes.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        nodes
    }
}
