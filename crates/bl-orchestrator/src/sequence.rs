//! Sequence controller
//!
//! Runs the ordered launch list through time. Each item is executed
//! fire-and-forget, then the controller waits out the item's delay in a
//! per-second countdown that polls the run signals. Cancellation wins over
//! everything; skip-next-app retargets the pending item; skip-delay cuts
//! the wait short without changing the target.

use std::sync::Arc;
use std::time::Duration;

use bl_protocol::NodeMode;
use bl_core::{LaunchItem, RemoteMachine, StatusSender};

use crate::executor::Launcher;
use crate::signals::SequenceSignals;
use crate::wake::WakeCoordinator;

/// Everything one run needs, captured up front so mid-run config edits
/// cannot affect an execution already in flight.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Launch items, any order; the controller sorts by `order`
    pub items: Vec<LaunchItem>,
    /// Role at the moment the run started
    pub mode: NodeMode,
    /// Wake targets considered when the mode is Master
    pub machines: Vec<RemoteMachine>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every item ran (or was deliberately skipped past)
    Completed,
    /// A stop or force-shutdown request ended the run early
    Cancelled,
    /// The run future died unexpectedly. The controller never produces
    /// this itself; the caller supervising the run does when a panic
    /// escapes it.
    Aborted,
}

/// Drives one run at a time. Re-entry is the caller's problem; the
/// signals are reset at the start of each run, so overlapping runs would
/// corrupt each other's flags.
pub struct SequenceController {
    launcher: Arc<dyn Launcher>,
    wake: WakeCoordinator,
    signals: Arc<SequenceSignals>,
    status: StatusSender,
}

impl SequenceController {
    pub fn new(
        launcher: Arc<dyn Launcher>,
        wake: WakeCoordinator,
        signals: Arc<SequenceSignals>,
        status: StatusSender,
    ) -> Self {
        Self {
            launcher,
            wake,
            signals,
            status,
        }
    }

    /// Signals shared with whoever delivers user interrupts
    pub fn signals(&self) -> Arc<SequenceSignals> {
        Arc::clone(&self.signals)
    }

    /// Run the plan to completion or cancellation. Never fails: item
    /// failures are logged by the executor and the sequence advances.
    pub async fn run(&self, plan: &RunPlan) -> RunOutcome {
        self.signals.reset();

        if plan.items.is_empty() {
            tracing::info!("No launch items defined; nothing to run");
            self.status.sequence_status("Nothing to run.");
            return RunOutcome::Completed;
        }

        let mut items = plan.items.clone();
        items.sort_by_key(|i| i.order);

        tracing::info!("Starting sequence with {} item(s)", items.len());
        self.status.header("bootlaunch sequence");
        self.status.sequence_status("Starting up…");

        match plan.mode {
            NodeMode::Master => {
                tracing::info!("Mode: Master. Sending Wake-on-LAN to selected machines");
                self.wake
                    .wake_batch(&plan.machines, &self.signals, &self.status)
                    .await;
            }
            NodeMode::Slave => {
                tracing::info!("Mode: Slave. Skipping Wake-on-LAN");
                self.status
                    .sequence_status("Slave mode – skipping Wake-on-LAN.");
            }
        }

        self.status.sequence_status("Running launch sequence…");
        let outcome = self.run_items(&items).await;
        self.signals.set_current_index(-1);
        outcome
    }

    async fn run_items(&self, items: &[LaunchItem]) -> RunOutcome {
        let mut index = 0usize;

        while index < items.len() {
            if self.signals.cancel_requested() {
                return self.cancelled("before launching next app");
            }

            self.signals.set_current_index(index as i64);
            let current = &items[index];

            let verb = if current.kill_instead_of_launch {
                "Killing"
            } else {
                "Launching"
            };
            tracing::info!("{} app: {}", verb, current.label());
            self.status.activity(format!("{}: {}", verb, current.label()));

            self.launcher.execute(current);

            let mut seconds_left = current.delay_ms / 1000;
            let mut next_index = index + 1;

            if next_index >= items.len() {
                // Last item; its delay has nothing to wait for.
                break;
            }

            // A skip-delay pressed outside a wait does not carry into it.
            self.signals.take_skip_delay();

            while seconds_left > 0 {
                if self.signals.cancel_requested() {
                    return self.cancelled("during delay");
                }

                if self.signals.take_skip_next_app() {
                    let skipped = &items[next_index];
                    if next_index + 1 < items.len() {
                        tracing::info!("Skip to next; will not launch: {}", skipped.label());
                        self.status.activity(format!("Skip app: {}", skipped.label()));
                        next_index += 1;
                    } else {
                        tracing::info!("Skip to next; last app skipped: {}", skipped.label());
                        self.status
                            .activity(format!("Skip last app: {}", skipped.label()));
                        self.status.next_app("None (sequence end)", 0);
                        self.status.countdown(0);
                        self.status.sequence_status("Sequence ended (no more apps).");
                        return RunOutcome::Completed;
                    }
                }

                let next_item = &items[next_index];
                self.status.next_app(next_item.action_label(), seconds_left);
                self.status.countdown(seconds_left);

                let apps_left = items.len() - (next_index + 1);
                self.status.sequence_status(if apps_left > 0 {
                    format!(
                        "Waiting before next app… ({} app(s) left after this)",
                        apps_left
                    )
                } else {
                    "Waiting before final app…".to_string()
                });

                if self.signals.take_skip_delay() {
                    tracing::info!("Delay skipped by user");
                    self.status
                        .activity("Delay skipped – launching next app now.");
                    break;
                }

                tokio::time::sleep(Duration::from_secs(1)).await;
                seconds_left -= 1;
            }

            index = next_index;
        }

        if self.signals.cancel_requested() {
            // Cancel arrived after the final launch but before we got here.
            return self.cancelled("at end");
        }

        self.status.sequence_status("All done.");
        self.status.activity("Sequence complete.");
        self.status.next_app("", 0);
        self.status.countdown(0);
        RunOutcome::Completed
    }

    fn cancelled(&self, when: &str) -> RunOutcome {
        tracing::info!("Sequence cancelled {}", when);
        self.status.sequence_status("Sequence cancelled.");
        self.status.next_app("", 0);
        self.status.countdown(0);
        self.status.activity("Sequence stopped by user.");
        RunOutcome::Cancelled
    }
}
