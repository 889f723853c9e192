//! Timing behavior of the sequence controller under virtual time.
//!
//! All tests run with the tokio clock paused, so countdown waits elapse
//! instantly and launch instants can be asserted exactly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use bl_core::config::WakeConfig;
use bl_core::{LaunchItem, StatusSender};
use bl_orchestrator::{
    Launcher, RunOutcome, RunPlan, SequenceController, SequenceSignals, WakeCoordinator,
};
use bl_protocol::NodeMode;

struct RecordingLauncher {
    launches: Mutex<Vec<(String, Instant)>>,
}

impl RecordingLauncher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            launches: Mutex::new(Vec::new()),
        })
    }

    fn launched(&self) -> Vec<(String, Instant)> {
        self.launches.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn execute(&self, item: &LaunchItem) {
        self.launches
            .lock()
            .unwrap()
            .push((item.label(), Instant::now()));
    }
}

fn item(name: &str, order: i32, delay_ms: u64) -> LaunchItem {
    LaunchItem {
        display_name: Some(name.to_string()),
        order,
        delay_ms,
        ..Default::default()
    }
}

fn plan(items: Vec<LaunchItem>) -> RunPlan {
    RunPlan {
        items,
        mode: NodeMode::Slave,
        machines: Vec::new(),
    }
}

fn controller(launcher: Arc<RecordingLauncher>) -> SequenceController {
    let (status, _rx) = StatusSender::channel();
    SequenceController::new(
        launcher,
        WakeCoordinator::new(WakeConfig::default()),
        Arc::new(SequenceSignals::new()),
        status,
    )
}

#[tokio::test(start_paused = true)]
async fn zero_delays_run_back_to_back() {
    let launcher = RecordingLauncher::new();
    let controller = controller(launcher.clone());
    let start = Instant::now();

    let outcome = controller
        .run(&plan(vec![item("a", 1, 0), item("b", 2, 0), item("c", 3, 0)]))
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    let launched = launcher.launched();
    assert_eq!(
        launched.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
    for (_, at) in &launched {
        assert_eq!(*at - start, Duration::ZERO);
    }
}

#[tokio::test(start_paused = true)]
async fn delays_are_honored_to_the_second() {
    let launcher = RecordingLauncher::new();
    let controller = controller(launcher.clone());
    let start = Instant::now();

    let outcome = controller
        .run(&plan(vec![item("a", 1, 2_000), item("b", 2, 3_000), item("c", 3, 0)]))
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    let launched = launcher.launched();
    assert_eq!(launched[0].1 - start, Duration::ZERO);
    assert_eq!(launched[1].1 - start, Duration::from_secs(2));
    assert_eq!(launched[2].1 - start, Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn cancel_during_wait_never_launches_pending_item() {
    let launcher = RecordingLauncher::new();
    let controller = controller(launcher.clone());
    let signals = controller.signals();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        signals.request_stop();
    });

    let outcome = controller
        .run(&plan(vec![item("a", 1, 10_000), item("b", 2, 0)]))
        .await;

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(
        launcher
            .launched()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>(),
        vec!["a"]
    );
}

#[tokio::test(start_paused = true)]
async fn skip_next_app_retargets_without_shortening_the_wait() {
    let launcher = RecordingLauncher::new();
    let controller = controller(launcher.clone());
    let signals = controller.signals();
    let start = Instant::now();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        signals.request_skip_next_app();
    });

    let outcome = controller
        .run(&plan(vec![
            item("a", 1, 2_000),
            item("b", 2, 0),
            item("c", 3, 0),
        ]))
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    let launched = launcher.launched();
    // "b" was skipped entirely; "c" still waited out a's full delay.
    assert_eq!(
        launched.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );
    assert_eq!(launched[1].1 - start, Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn skip_delay_launches_next_item_early() {
    let launcher = RecordingLauncher::new();
    let controller = controller(launcher.clone());
    let signals = controller.signals();
    let start = Instant::now();

    // Delays [0s, 2s, 0s]; skip-delay arrives 0.5s into the second wait
    // and is consumed at the next 1s tick, so item 3 launches at ~1s
    // instead of 2s.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        signals.request_skip_delay();
    });

    let outcome = controller
        .run(&plan(vec![
            item("a", 1, 0),
            item("b", 2, 2_000),
            item("c", 3, 0),
        ]))
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    let launched = launcher.launched();
    assert_eq!(
        launched.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
    assert_eq!(launched[1].1 - start, Duration::ZERO);
    assert_eq!(launched[2].1 - start, Duration::from_secs(1));
}
