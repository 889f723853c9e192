//! bl-discovery: LAN peer discovery for bootlaunch
//!
//! Runs two independent loops: a periodic heartbeat broadcast announcing
//! this node's identity, and a listener that turns received heartbeats into
//! per-IP observations. The discovered-node table is maintained by whoever
//! consumes the observation channel, not by the service itself.

pub mod netinfo;
pub mod service;
pub mod table;

pub use service::{DiscoveryHandle, DiscoveryService, NodeObservation};
pub use table::NodeTable;
