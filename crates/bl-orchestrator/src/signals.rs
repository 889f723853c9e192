//! Run-control signals
//!
//! All cancellation in the sequence engine is cooperative: a presentation
//! layer sets a flag here and the controller consumes it at its next poll
//! point. One instance is shared between the controller and whoever exposes
//! the "skip"/"stop" controls; every flag is cleared when a run starts, so
//! state never leaks across runs.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Shared control flags plus the controller's current position.
///
/// Only one run may be active at a time; the flags assume a single logical
/// "run" context consuming them.
#[derive(Debug)]
pub struct SequenceSignals {
    cancel: AtomicBool,
    force_shutdown: AtomicBool,
    skip_delay: AtomicBool,
    skip_next_app: AtomicBool,
    current_index: AtomicI64,
}

impl SequenceSignals {
    /// Create signals in the idle state
    pub fn new() -> Self {
        Self {
            cancel: AtomicBool::new(false),
            force_shutdown: AtomicBool::new(false),
            skip_delay: AtomicBool::new(false),
            skip_next_app: AtomicBool::new(false),
            current_index: AtomicI64::new(-1),
        }
    }

    /// Clear every flag and reset the index. Called on entry to each run.
    pub fn reset(&self) {
        self.cancel.store(false, Ordering::SeqCst);
        self.force_shutdown.store(false, Ordering::SeqCst);
        self.skip_delay.store(false, Ordering::SeqCst);
        self.skip_next_app.store(false, Ordering::SeqCst);
        self.current_index.store(-1, Ordering::SeqCst);
    }

    /// Stop the sequence at the next poll point
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Stop the sequence and ask the host application to exit
    pub fn request_force_shutdown(&self) {
        self.force_shutdown.store(true, Ordering::SeqCst);
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Skip the remaining delay; the pending item still launches
    pub fn request_skip_delay(&self) {
        self.skip_delay.store(true, Ordering::SeqCst);
    }

    /// Skip the app about to be launched; its wait is not shortened
    pub fn request_skip_next_app(&self) {
        self.skip_next_app.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Whether the host application should exit after the run
    pub fn force_shutdown_requested(&self) -> bool {
        self.force_shutdown.load(Ordering::SeqCst)
    }

    /// Consume the skip-delay flag
    pub fn take_skip_delay(&self) -> bool {
        self.skip_delay.swap(false, Ordering::SeqCst)
    }

    /// Consume the skip-next-app flag
    pub fn take_skip_next_app(&self) -> bool {
        self.skip_next_app.swap(false, Ordering::SeqCst)
    }

    /// Index of the item currently executing, or -1 when idle
    pub fn current_index(&self) -> i64 {
        self.current_index.load(Ordering::SeqCst)
    }

    pub(crate) fn set_current_index(&self, index: i64) {
        self.current_index.store(index, Ordering::SeqCst);
    }
}

impl Default for SequenceSignals {
    fn default() -> Self {
        Self::new()
    }
}
