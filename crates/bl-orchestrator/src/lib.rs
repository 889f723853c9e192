//! bl-orchestrator: the launch sequence engine
//!
//! Drives an ordered list of launch items through time: optionally wakes
//! remote machines first, then launches or kills each item with a
//! cancellable per-second countdown in between. Status flows out through
//! the `bl-core` status channel; control flows in through
//! [`SequenceSignals`].

pub mod executor;
pub mod sequence;
pub mod signals;
pub mod wake;

pub use executor::{LaunchExecutor, Launcher};
pub use sequence::{RunOutcome, RunPlan, SequenceController};
pub use signals::SequenceSignals;
pub use wake::{BatchOutcome, IcmpPinger, Pinger, UdpWakeTransport, WakeCoordinator, WakeTransport};
