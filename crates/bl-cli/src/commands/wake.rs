//! Wake command implementation

use std::path::Path;

use anyhow::{bail, Context, Result};

use bl_core::config::{load_config, Settings};
use bl_core::{RemoteMachine, StatusSender};
use bl_orchestrator::{SequenceSignals, WakeCoordinator};

use super::spawn_status_printer;
use crate::output::{format_machines, print_error, print_success, print_warning};

/// Send Wake-on-LAN outside of a sequence run, to one named machine or
/// to everything selected in the settings. With `list`, just print the
/// configured targets instead.
pub async fn wake_command(
    config_path: &Path,
    name: Option<&str>,
    all_selected: bool,
    list: bool,
) -> Result<()> {
    let settings: Settings = load_config(config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    if list {
        println!("{}", format_machines(&settings.remote_machines));
        return Ok(());
    }

    let targets: Vec<RemoteMachine> = match name {
        Some(name) => {
            let machine = settings
                .remote_machines
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(name))
                .with_context(|| format!("no remote machine named {:?}", name))?;
            // An explicit request overrides the selection checkbox.
            let mut machine = machine.clone();
            machine.is_selected = true;
            vec![machine]
        }
        None if all_selected => settings.selected_machines(),
        None => bail!("specify a machine name, --all-selected, or --list"),
    };

    let (status, rx) = StatusSender::channel();
    let printer = spawn_status_printer(rx);

    let signals = SequenceSignals::new();
    let coordinator = WakeCoordinator::new(settings.wake.clone());
    let outcome = coordinator.wake_batch(&targets, &signals, &status).await;

    drop(status);
    let _ = printer.await;

    if outcome.attempted == 0 {
        print_warning("No machines with a MAC address to wake.");
    } else if outcome.woken == outcome.attempted {
        print_success(&format!(
            "Woke {}/{} machine(s)",
            outcome.woken, outcome.attempted
        ));
    } else {
        print_error(&format!(
            "Woke {}/{} machine(s); the rest never answered",
            outcome.woken, outcome.attempted
        ));
    }

    Ok(())
}
