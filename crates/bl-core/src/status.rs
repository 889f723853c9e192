//! Status and activity channel
//!
//! The orchestrator never talks to a UI directly. Everything a presentation
//! layer would show — status lines, the pending-item label, countdown ticks,
//! the append-only activity log — flows through this channel as events. The
//! CLI consumes it; a GUI could consume the same stream.

use tokio::sync::mpsc;

/// One update for whatever presentation layer is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Title text for the status surface
    Header(String),
    /// Current state of the sequence as a whole
    SequenceStatus(String),
    /// Label and remaining seconds for the pending item
    NextApp { label: String, seconds: u64 },
    /// Countdown refresh for the current wait
    Countdown(u64),
    /// Audio collaborator status, set before the first item runs
    AudioStatus(String),
    /// Append-only activity log line
    Activity(String),
    /// A wake packet is about to be sent to this target
    WakeTarget { ip: String, mac: String },
}

/// Receiving half of the status channel
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusEvent>;

/// Sending half of the status channel.
///
/// Cloneable and cheap. Sends never fail visibly: a dropped receiver means
/// the run is headless, which is fine.
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl StatusSender {
    /// Create a connected sender/receiver pair
    pub fn channel() -> (StatusSender, StatusReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (StatusSender { tx }, rx)
    }

    /// Send a raw event
    pub fn send(&self, event: StatusEvent) {
        let _ = self.tx.send(event);
    }

    /// Set the header text
    pub fn header(&self, text: impl Into<String>) {
        self.send(StatusEvent::Header(text.into()));
    }

    /// Set the sequence status line
    pub fn sequence_status(&self, text: impl Into<String>) {
        self.send(StatusEvent::SequenceStatus(text.into()));
    }

    /// Set the pending item label and its remaining countdown
    pub fn next_app(&self, label: impl Into<String>, seconds: u64) {
        self.send(StatusEvent::NextApp {
            label: label.into(),
            seconds,
        });
    }

    /// Refresh the countdown display
    pub fn countdown(&self, seconds: u64) {
        self.send(StatusEvent::Countdown(seconds));
    }

    /// Set the audio collaborator status line
    pub fn audio_status(&self, text: impl Into<String>) {
        self.send(StatusEvent::AudioStatus(text.into()));
    }

    /// Append an activity log line
    pub fn activity(&self, text: impl Into<String>) {
        self.send(StatusEvent::Activity(text.into()));
    }

    /// Announce an imminent wake send
    pub fn wake_target(&self, ip: impl Into<String>, mac: impl Into<String>) {
        self.send(StatusEvent::WakeTarget {
            ip: ip.into(),
            mac: mac.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (tx, mut rx) = StatusSender::channel();

        tx.sequence_status("Starting up…");
        tx.next_app("Launch vlc", 3);
        tx.activity("Launching: vlc");

        assert_eq!(
            rx.recv().await.unwrap(),
            StatusEvent::SequenceStatus("Starting up…".to_string())
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StatusEvent::NextApp {
                label: "Launch vlc".to_string(),
                seconds: 3
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StatusEvent::Activity("Launching: vlc".to_string())
        );
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_is_silent() {
        let (tx, rx) = StatusSender::channel();
        drop(rx);
        // Must not panic or error
        tx.sequence_status("nobody listening");
    }
}
