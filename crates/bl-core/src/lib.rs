//! bl-core: Core domain types and configuration for bootlaunch
//!
//! This crate provides the launch-item model, settings storage, the status
//! event channel, and small host queries shared by the discovery service,
//! the orchestrator, and the CLI.

pub mod config;
pub mod elevation;
pub mod error;
pub mod status;
pub mod time;
pub mod types;

pub use error::BlError;
pub use status::{StatusEvent, StatusReceiver, StatusSender};
pub use types::{DiscoveredNode, LaunchItem, RemoteMachine};

/// Name of the local machine, used for the discovery heartbeat and for
/// self-detection of received packets.
pub fn machine_name() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}
