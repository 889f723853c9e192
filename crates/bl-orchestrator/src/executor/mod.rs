//! Launch executor
//!
//! Given one launch item, decides *how* to start or terminate the program:
//! kill path, empty-path no-op, then the elevation matrix. Fire-and-forget
//! throughout — nothing here ever propagates an error to the sequence, and
//! a failed item never stops the run.

mod minimize;
mod spawn;

pub use minimize::{SystemWindows, WindowControl, WindowRef};

use std::sync::Arc;

use sysinfo::{ProcessesToUpdate, System};

use bl_core::elevation::host_is_elevated;
use bl_core::{LaunchItem, StatusSender};

/// Executes one launch item. The seam the sequence controller drives;
/// tests substitute a recorder.
pub trait Launcher: Send + Sync {
    /// Start or kill the item's program. Must be called from a tokio
    /// runtime context (the minimize watcher is spawned as a task).
    fn execute(&self, item: &LaunchItem);
}

/// The real executor
pub struct LaunchExecutor {
    status: StatusSender,
    windows: Arc<dyn WindowControl>,
}

impl LaunchExecutor {
    /// Executor backed by the host window system
    pub fn new(status: StatusSender) -> Self {
        Self::with_window_control(status, Arc::new(SystemWindows))
    }

    /// Executor with explicit window control (used by tests)
    pub fn with_window_control(status: StatusSender, windows: Arc<dyn WindowControl>) -> Self {
        Self { status, windows }
    }

    /// Terminate every running process matching the item's kill target.
    fn kill_item(&self, item: &LaunchItem) {
        let Some(target) = item.kill_target() else {
            tracing::warn!("Kill item has no process name; skipping");
            self.status.activity("Kill item has no process name.".to_string());
            return;
        };

        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let mut killed = 0usize;
        for process in system.processes().values() {
            let name = process.name().to_string_lossy();
            if !process_name_matches(&name, &target) {
                continue;
            }
            if process.kill() {
                killed += 1;
            } else {
                tracing::warn!("Failed to kill {} (pid {})", name, process.pid());
            }
        }

        tracing::info!("Killed {} instance(s) of {}", killed, target);
        self.status
            .activity(format!("Killed {} instance(s) of {}.", killed, target));
    }

    fn launch_item(&self, item: &LaunchItem) {
        let label = item.label();

        let Some(path) = item.path.as_deref().filter(|p| !p.as_os_str().is_empty()) else {
            tracing::info!("Skipped item with empty path");
            self.status.activity("Skipped item with empty path.".to_string());
            return;
        };

        let workdir = spawn::working_dir(item, path);
        let host_elevated = host_is_elevated();
        let has_args = item
            .arguments
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());

        tracing::debug!(
            "Launching {}: elevated={} admin={} relay={} minimize={}",
            label,
            host_elevated,
            item.run_as_admin,
            item.use_command_relay,
            item.wants_minimize()
        );

        let spawned = if host_elevated {
            if item.run_as_admin {
                // Child inherits our elevated context.
                spawn::direct(item, path, &workdir)
            } else if spawn::is_directly_executable(path)
                && !has_args
                && !item.use_command_relay
                && !item.wants_minimize()
            {
                // Safe to drop privileges: plain executable, nothing that
                // needs a real process handle.
                spawn::deescalated(path, &workdir)
            } else {
                // Arguments or minimize flags need a direct handle; the
                // child inherits elevation in this case.
                spawn::direct(item, path, &workdir)
            }
        } else if item.run_as_admin {
            spawn::elevated(item, path, &workdir)
        } else if item.use_command_relay {
            spawn::relay(item, path, &workdir)
        } else {
            spawn::direct(item, path, &workdir)
        };

        match spawned {
            Ok(Some(pid)) if item.wants_minimize() => {
                minimize::spawn_watcher(
                    Arc::clone(&self.windows),
                    pid,
                    label,
                    item.minimize_initial_delay(),
                );
            }
            Ok(Some(_)) | Ok(None) => {
                if item.wants_minimize() {
                    // Indirect spawn paths give us no target handle to watch.
                    tracing::debug!("No process handle for {}; minimize skipped", label);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to start {}: {}", label, e);
                self.status.activity(format!("Failed to start {}: {}", label, e));
            }
        }
    }
}

impl Launcher for LaunchExecutor {
    fn execute(&self, item: &LaunchItem) {
        if item.kill_instead_of_launch {
            self.kill_item(item);
        } else {
            self.launch_item(item);
        }
    }
}

/// Process-name match for the kill path, tolerant of a trailing `.exe`
/// on either side and of case.
fn process_name_matches(process_name: &str, target: &str) -> bool {
    fn stem(s: &str) -> &str {
        // Host process names are arbitrary UTF-8, so the cut point must
        // land on a char boundary before slicing.
        let cut = s.len().saturating_sub(4);
        if s.len() > 4 && s.is_char_boundary(cut) && s[cut..].eq_ignore_ascii_case(".exe") {
            &s[..cut]
        } else {
            s
        }
    }
    stem(process_name).eq_ignore_ascii_case(stem(target))
}
