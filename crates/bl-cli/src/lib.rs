//! bl-cli: Command-line interface for bootlaunch
//!
//! Provides the `bootlaunch` binary for running the launch sequence,
//! waking machines, watching discovery, and maintaining the config.

pub mod commands;
pub mod output;
