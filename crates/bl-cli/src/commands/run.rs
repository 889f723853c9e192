//! Run command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use bl_core::config::{load_config, Settings};
use bl_core::StatusSender;
use bl_orchestrator::{
    LaunchExecutor, RunOutcome, RunPlan, SequenceController, SequenceSignals, WakeCoordinator,
};
use bl_protocol::NodeMode;

use super::spawn_status_printer;
use crate::output::print_warning;

/// Execute the launch sequence from the settings file.
///
/// Ctrl+C requests a cooperative stop; the run ends at the next poll
/// point without launching the pending item.
pub async fn run_command(config_path: &Path, mode: Option<NodeMode>) -> Result<RunOutcome> {
    let settings: Settings = load_config(config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    let items = settings.items_in_order();
    if items.is_empty() {
        print_warning("No launch items defined. Nothing to run.");
        return Ok(RunOutcome::Completed);
    }

    let plan = RunPlan {
        items,
        mode: mode.unwrap_or(settings.mode),
        machines: settings.remote_machines.clone(),
    };

    let (status, rx) = StatusSender::channel();
    let printer = spawn_status_printer(rx);

    let signals = Arc::new(SequenceSignals::new());
    {
        let signals = Arc::clone(&signals);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received; stopping sequence");
                signals.request_stop();
            }
        });
    }

    let launcher = Arc::new(LaunchExecutor::new(status.clone()));
    let controller = SequenceController::new(
        launcher,
        WakeCoordinator::new(settings.wake.clone()),
        signals,
        status,
    );

    let outcome = supervise(controller, plan).await;
    let _ = printer.await;

    Ok(outcome)
}

/// Run the controller on its own task so a panic escaping the run is
/// contained and reported as `Aborted` instead of tearing down the
/// process. When the task ends the controller is dropped, which closes
/// the status channel so the printer drains and exits.
async fn supervise(controller: SequenceController, plan: RunPlan) -> RunOutcome {
    match tokio::spawn(async move { controller.run(&plan).await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Sequence run died unexpectedly: {}", e);
            RunOutcome::Aborted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::LaunchItem;
    use bl_orchestrator::Launcher;

    struct PanickingLauncher;
    impl Launcher for PanickingLauncher {
        fn execute(&self, _item: &LaunchItem) {
            panic!("launcher blew up");
        }
    }

    #[tokio::test]
    async fn test_panicking_run_is_reported_as_aborted() {
        let (status, rx) = StatusSender::channel();
        let controller = SequenceController::new(
            Arc::new(PanickingLauncher),
            WakeCoordinator::new(Default::default()),
            Arc::new(SequenceSignals::new()),
            status,
        );
        let plan = RunPlan {
            items: vec![LaunchItem {
                display_name: Some("boom".to_string()),
                order: 1,
                ..Default::default()
            }],
            mode: NodeMode::Slave,
            machines: Vec::new(),
        };

        let outcome = supervise(controller, plan).await;
        assert_eq!(outcome, RunOutcome::Aborted);
        // The channel closed when the controller dropped with the task.
        drop(rx);
    }
}
