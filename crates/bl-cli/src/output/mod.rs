//! Output formatting utilities for the CLI
//!
//! Tables for launch items, remote machines, and discovered nodes, plus
//! colored one-line status messages.

use tabled::{settings::Style, Table, Tabled};

use bl_core::time::current_time_millis;
use bl_core::{DiscoveredNode, LaunchItem, RemoteMachine};

/// Format the configured launch sequence as an ASCII table
///
/// Items are shown in execution order with their per-item delay and the
/// behavior flags that are set.
pub fn format_items(items: &[LaunchItem]) -> String {
    if items.is_empty() {
        return "No launch items defined".to_string();
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "#")]
        order: i32,
        #[tabled(rename = "ACTION")]
        action: String,
        #[tabled(rename = "PATH")]
        path: String,
        #[tabled(rename = "DELAY")]
        delay: String,
        #[tabled(rename = "FLAGS")]
        flags: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|i| ItemRow {
            order: i.order,
            action: i.action_label(),
            path: i
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            delay: format!("{:.1}s", i.delay_ms as f64 / 1000.0),
            flags: item_flags(i),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn item_flags(item: &LaunchItem) -> String {
    let mut flags = Vec::new();
    if item.run_as_admin {
        flags.push("admin");
    }
    if item.use_command_relay {
        flags.push("relay");
    }
    if item.start_minimized {
        flags.push("min");
    }
    if item.force_minimize {
        flags.push("force-min");
    }
    if item.start_to_tray {
        flags.push("tray");
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(",")
    }
}

/// Format the configured Wake-on-LAN targets as an ASCII table
pub fn format_machines(machines: &[RemoteMachine]) -> String {
    if machines.is_empty() {
        return "No remote machines configured".to_string();
    }

    #[derive(Tabled)]
    struct MachineRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "IP")]
        ip: String,
        #[tabled(rename = "MAC")]
        mac: String,
        #[tabled(rename = "SELECTED")]
        selected: String,
    }

    let rows: Vec<MachineRow> = machines
        .iter()
        .map(|m| MachineRow {
            name: m.name.clone(),
            ip: dash_if_empty(&m.ip_address),
            mac: dash_if_empty(&m.mac_address),
            selected: if m.is_selected { "yes" } else { "no" }.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format the discovery node table as an ASCII table
///
/// Nodes are shown with every address they have ever reported and the
/// age of their most recent heartbeat.
pub fn format_nodes(nodes: &[DiscoveredNode]) -> String {
    if nodes.is_empty() {
        return "No nodes seen".to_string();
    }

    #[derive(Tabled)]
    struct NodeRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "MODE")]
        mode: String,
        #[tabled(rename = "MAC")]
        mac: String,
        #[tabled(rename = "ADDRESSES")]
        addresses: String,
        #[tabled(rename = "LAST SEEN")]
        last_seen: String,
    }

    let now = current_time_millis();
    let rows: Vec<NodeRow> = nodes
        .iter()
        .map(|n| NodeRow {
            name: if n.is_self {
                format!("{} (this machine)", n.name)
            } else {
                n.name.clone()
            },
            mode: n.mode.to_string(),
            mac: dash_if_empty(&n.mac_address),
            addresses: n.all_ips.join(", "),
            last_seen: ago(now, n.last_seen),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn dash_if_empty(s: &str) -> String {
    if s.trim().is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

fn ago(now_millis: u64, then_millis: u64) -> String {
    let secs = now_millis.saturating_sub(then_millis) / 1000;
    if secs == 0 {
        "just now".to_string()
    } else {
        format!("{}s ago", secs)
    }
}

/// Print a success message with a green checkmark
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message with a red cross
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message with a yellow marker
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print("! "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message with a blue marker
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Blue),
        Print("› "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
