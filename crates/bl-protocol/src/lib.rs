//! bl-protocol: Wire formats for bootlaunch
//!
//! This crate defines the two datagram formats the rest of the workspace
//! puts on the network: the pipe-delimited discovery heartbeat broadcast
//! and the Wake-on-LAN magic packet. It performs no I/O itself.

pub mod discovery;
pub mod error;
pub mod mac;
pub mod wol;

pub use discovery::{Heartbeat, NodeMode, DISCOVERY_PORT, MAGIC_HEADER, PROTOCOL_VERSION};
pub use error::ProtocolError;
pub use mac::MacAddress;
pub use wol::{magic_packet, MAGIC_PACKET_LEN, WAKE_PORT};
