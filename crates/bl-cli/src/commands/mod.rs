//! Command implementations for the `bootlaunch` binary

mod config;
mod discover;
mod items;
mod run;
mod wake;

pub use config::{config_init, config_path, config_show};
pub use discover::discover_command;
pub use items::{items_command, ItemsAction};
pub use run::run_command;
pub use wake::wake_command;

use bl_core::{StatusEvent, StatusReceiver};

use crate::output::print_info;

/// Print status events as they arrive until the channel closes.
///
/// Countdown refreshes are folded into the next-app line; the bare
/// countdown events exist for richer status surfaces and are dropped here.
pub(crate) fn spawn_status_printer(mut rx: StatusReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                StatusEvent::Header(text) => println!("=== {} ===", text),
                StatusEvent::SequenceStatus(text) => print_info(&text),
                StatusEvent::AudioStatus(text) => print_info(&text),
                StatusEvent::NextApp { label, seconds } if !label.is_empty() => {
                    println!("  next: {} in {}s", label, seconds);
                }
                StatusEvent::NextApp { .. } | StatusEvent::Countdown(_) => {}
                StatusEvent::Activity(line) => println!("  {}", line),
                StatusEvent::WakeTarget { ip, mac } => {
                    let where_to = if ip.is_empty() { "broadcast only" } else { ip.as_str() };
                    println!("  waking {} ({})", mac, where_to);
                }
            }
        }
    })
}
