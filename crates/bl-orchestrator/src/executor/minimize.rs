//! Post-launch minimize watcher
//!
//! Window discovery has unpredictable latency, so the watcher runs as a
//! detached task per launched item: wait out a grace period, then poll for
//! the process's main window and minimize it on first sight. It gives up
//! silently when the window never appears or the process exits first, and
//! never blocks the sequence.

use std::sync::Arc;
use std::time::Duration;

/// Opaque window handle as the platform layer reports it
pub type WindowRef = isize;

/// Poll cadence while looking for the window
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Extra time past the initial grace period before giving up
const EXTRA_BUDGET: Duration = Duration::from_secs(15);

/// Narrow capability interface over the host's window system
pub trait WindowControl: Send + Sync + 'static {
    /// Main (visible, unowned) window of the given process, if any
    fn find_main_window(&self, pid: u32) -> Option<WindowRef>;
    /// Minimize the window; false when the request was refused
    fn minimize(&self, window: WindowRef) -> bool;
    /// Whether the process still exists
    fn process_alive(&self, pid: u32) -> bool;
}

/// Spawn the detached watcher for one launched process.
pub fn spawn_watcher(
    control: Arc<dyn WindowControl>,
    pid: u32,
    label: String,
    initial_delay: Duration,
) {
    tokio::spawn(watch_and_minimize(control, pid, label, initial_delay));
}

/// Watcher body; total budget is `initial_delay + 15s` from start.
pub(crate) async fn watch_and_minimize(
    control: Arc<dyn WindowControl>,
    pid: u32,
    label: String,
    initial_delay: Duration,
) {
    let budget = initial_delay + EXTRA_BUDGET;
    let started = tokio::time::Instant::now();

    tokio::time::sleep(initial_delay).await;

    while started.elapsed() < budget {
        if !control.process_alive(pid) {
            tracing::debug!("{} ({}) exited before a window appeared", label, pid);
            return;
        }
        if let Some(window) = control.find_main_window(pid) {
            if control.minimize(window) {
                tracing::info!("Minimized {} ({})", label, pid);
            } else {
                tracing::debug!("Minimize request refused for {} ({})", label, pid);
            }
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    tracing::debug!("No window found for {} ({}) within {:?}", label, pid, budget);
}

/// Window control backed by the host's window system.
///
/// Only Windows exposes a usable "main window of pid" query; elsewhere the
/// watcher finds nothing and gives up quietly, which is the specified
/// fallback behavior.
pub struct SystemWindows;

impl WindowControl for SystemWindows {
    #[cfg(windows)]
    fn find_main_window(&self, pid: u32) -> Option<WindowRef> {
        platform::find_main_window(pid)
    }

    #[cfg(not(windows))]
    fn find_main_window(&self, _pid: u32) -> Option<WindowRef> {
        None
    }

    #[cfg(windows)]
    fn minimize(&self, window: WindowRef) -> bool {
        platform::minimize(window)
    }

    #[cfg(not(windows))]
    fn minimize(&self, _window: WindowRef) -> bool {
        false
    }

    fn process_alive(&self, pid: u32) -> bool {
        use sysinfo::{Pid, ProcessesToUpdate, System};

        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);
        system.process(pid).is_some()
    }
}

#[cfg(windows)]
mod platform {
    use windows_sys::Win32::Foundation::{BOOL, HWND, LPARAM};
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindow, GetWindowThreadProcessId, IsWindowVisible, ShowWindowAsync,
        GW_OWNER, SW_SHOWMINIMIZED,
    };

    struct Search {
        pid: u32,
        found: isize,
    }

    unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let search = &mut *(lparam as *mut Search);
        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, &mut pid);
        if pid == search.pid && IsWindowVisible(hwnd) != 0 && GetWindow(hwnd, GW_OWNER) == 0 {
            search.found = hwnd as isize;
            return 0;
        }
        1
    }

    pub fn find_main_window(pid: u32) -> Option<isize> {
        let mut search = Search { pid, found: 0 };
        unsafe {
            EnumWindows(Some(enum_proc), &mut search as *mut Search as LPARAM);
        }
        (search.found != 0).then_some(search.found)
    }

    pub fn minimize(window: isize) -> bool {
        unsafe { ShowWindowAsync(window as HWND, SW_SHOWMINIMIZED as i32) != 0 }
    }
}
