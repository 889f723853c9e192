//! Protocol error types

use thiserror::Error;

/// Errors that can occur while building wire payloads
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// MAC address did not reduce to exactly 12 hex digits
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),
}
