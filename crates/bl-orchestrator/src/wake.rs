//! Wake-on-LAN coordinator
//!
//! Sends magic packets with retry and optional reachability confirmation.
//! Packet transport and the echo probe sit behind traits so the retry
//! logic is testable without a network.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use bl_core::config::WakeConfig;
use bl_core::{RemoteMachine, StatusSender};
use bl_protocol::{magic_packet, MacAddress, WAKE_PORT};

use crate::signals::SequenceSignals;

/// Bound on a single echo probe
const ECHO_TIMEOUT: Duration = Duration::from_secs(1);

/// Sends wake datagrams
#[async_trait]
pub trait WakeTransport: Send + Sync {
    /// Broadcast the packet to 255.255.255.255
    async fn send_broadcast(&self, packet: &[u8]) -> std::io::Result<()>;
    /// Unicast the packet to a specific address
    async fn send_unicast(&self, packet: &[u8], ip: IpAddr) -> std::io::Result<()>;
}

/// Real UDP transport. A socket is bound per send, matching the
/// short-lived-socket pattern of the protocol's common implementations.
pub struct UdpWakeTransport;

#[async_trait]
impl WakeTransport for UdpWakeTransport {
    async fn send_broadcast(&self, packet: &[u8]) -> std::io::Result<()> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        socket.set_broadcast(true)?;
        socket
            .send_to(packet, (Ipv4Addr::BROADCAST, WAKE_PORT))
            .await?;
        Ok(())
    }

    async fn send_unicast(&self, packet: &[u8], ip: IpAddr) -> std::io::Result<()> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        socket.send_to(packet, (ip, WAKE_PORT)).await?;
        Ok(())
    }
}

/// Probes whether a woken machine has come up
#[async_trait]
pub trait Pinger: Send + Sync {
    /// One echo with a bounded timeout; true means the host answered
    async fn echo(&self, ip: IpAddr, timeout: Duration) -> bool;
}

/// ICMP echo probe
pub struct IcmpPinger;

#[async_trait]
impl Pinger for IcmpPinger {
    async fn echo(&self, ip: IpAddr, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, surge_ping::ping(ip, &[0u8; 8])).await,
            Ok(Ok(_))
        )
    }
}

/// Aggregate result of a wake batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Machines presumed woken
    pub woken: usize,
    /// Machines the batch tried (selected with a non-empty MAC)
    pub attempted: usize,
    /// The batch was cut short by a stop request
    pub cancelled: bool,
}

/// Wake-on-LAN coordinator with retry/confirmation semantics
pub struct WakeCoordinator {
    transport: Box<dyn WakeTransport>,
    pinger: Box<dyn Pinger>,
    config: WakeConfig,
}

impl WakeCoordinator {
    /// Coordinator with the real UDP transport and ICMP probe
    pub fn new(config: WakeConfig) -> Self {
        Self::with_parts(Box::new(UdpWakeTransport), Box::new(IcmpPinger), config)
    }

    /// Coordinator with explicit transport and probe (used by tests)
    pub fn with_parts(
        transport: Box<dyn WakeTransport>,
        pinger: Box<dyn Pinger>,
        config: WakeConfig,
    ) -> Self {
        Self {
            transport,
            pinger,
            config,
        }
    }

    /// Wake one machine. Returns true when the machine is presumed awake:
    /// either an echo reply arrived, or no IP was given and the first
    /// send-and-wait cycle completed. Send errors are transient; they are
    /// logged and the retry loop continues.
    pub async fn wake(
        &self,
        mac: &MacAddress,
        ip: Option<IpAddr>,
        signals: Option<&SequenceSignals>,
    ) -> bool {
        let packet = magic_packet(mac);

        for attempt in 1..=self.config.retries.max(1) {
            if signals.is_some_and(|s| s.cancel_requested()) {
                tracing::info!("Wake of {} cancelled on attempt {}", mac, attempt);
                return false;
            }

            if let Err(e) = self.transport.send_broadcast(&packet).await {
                tracing::warn!("Wake broadcast failed (attempt {}): {}", attempt, e);
            }
            if let Some(ip) = ip {
                if let Err(e) = self.transport.send_unicast(&packet, ip).await {
                    tracing::warn!("Wake unicast to {} failed (attempt {}): {}", ip, attempt, e);
                }
            }

            // Give the adapter time to power the machine up.
            tokio::time::sleep(self.config.retry_delay()).await;

            match ip {
                Some(ip) => {
                    if self.pinger.echo(ip, ECHO_TIMEOUT).await {
                        tracing::info!("{} answered echo after attempt {}", ip, attempt);
                        return true;
                    }
                }
                // No address to confirm against: one send is all we can do.
                None => return true,
            }
        }

        false
    }

    /// Wake every machine in the batch, sequentially. One machine is fully
    /// retried before the next begins. A stop request aborts the batch
    /// before the next machine and inside each retry loop.
    pub async fn wake_batch(
        &self,
        machines: &[RemoteMachine],
        signals: &SequenceSignals,
        status: &StatusSender,
    ) -> BatchOutcome {
        let selected: Vec<&RemoteMachine> = machines
            .iter()
            .filter(|m| m.is_selected && !m.mac_address.trim().is_empty())
            .collect();

        if selected.is_empty() {
            tracing::info!("No remote machines selected for Wake-on-LAN");
            status.sequence_status("No machines selected for Wake-on-LAN.");
            return BatchOutcome {
                woken: 0,
                attempted: 0,
                cancelled: false,
            };
        }

        status.sequence_status(format!(
            "Sending Wake-on-LAN to {} machine(s)…",
            selected.len()
        ));

        let mut woken = 0;
        for machine in &selected {
            if signals.cancel_requested() {
                tracing::info!("Wake-on-LAN cancelled during batch");
                status.sequence_status("Wake-on-LAN cancelled.");
                return BatchOutcome {
                    woken,
                    attempted: selected.len(),
                    cancelled: true,
                };
            }

            status.wake_target(&machine.ip_address, &machine.mac_address);

            let mac: MacAddress = match machine.mac_address.parse() {
                Ok(mac) => mac,
                Err(e) => {
                    // Validation failure: surfaced per machine, never fatal
                    // to the batch.
                    tracing::warn!("Skipping {}: {}", machine.name, e);
                    status.activity(format!("{}: {}", machine.name, e));
                    continue;
                }
            };
            let ip = machine.ip_address.trim().parse::<IpAddr>().ok();

            if self.wake(&mac, ip, Some(signals)).await {
                woken += 1;
                tracing::info!("WOL success: {} ({})", machine.name, machine.ip_address);
                status.activity(format!("Woke {}.", machine.name));
            } else if signals.cancel_requested() {
                status.sequence_status("Wake-on-LAN cancelled.");
                return BatchOutcome {
                    woken,
                    attempted: selected.len(),
                    cancelled: true,
                };
            } else {
                tracing::warn!(
                    "WOL likely failed: {} ({}) MAC={}",
                    machine.name,
                    machine.ip_address,
                    machine.mac_address
                );
                status.activity(format!("{} did not respond.", machine.name));
            }
        }

        if woken == selected.len() {
            status.sequence_status(format!("Wake-on-LAN OK ({}/{}).", woken, selected.len()));
        } else {
            status.sequence_status(format!(
                "Wake-on-LAN partial: {}/{} machine(s) responded.",
                woken,
                selected.len()
            ));
        }

        BatchOutcome {
            woken,
            attempted: selected.len(),
            cancelled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingTransport {
        broadcasts: AtomicUsize,
        unicasts: AtomicUsize,
    }

    #[async_trait]
    impl WakeTransport for Arc<RecordingTransport> {
        async fn send_broadcast(&self, packet: &[u8]) -> std::io::Result<()> {
            assert_eq!(packet.len(), 102);
            self.broadcasts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_unicast(&self, packet: &[u8], _ip: IpAddr) -> std::io::Result<()> {
            assert_eq!(packet.len(), 102);
            self.unicasts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ScriptedPinger {
        /// Echo succeeds starting with this 1-based probe, 0 = never
        answer_from: usize,
        probes: AtomicUsize,
    }

    impl ScriptedPinger {
        fn never() -> Self {
            Self {
                answer_from: 0,
                probes: AtomicUsize::new(0),
            }
        }

        fn answers_on(attempt: usize) -> Self {
            Self {
                answer_from: attempt,
                probes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Pinger for Arc<ScriptedPinger> {
        async fn echo(&self, _ip: IpAddr, _timeout: Duration) -> bool {
            let probe = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
            self.answer_from != 0 && probe >= self.answer_from
        }
    }

    fn coordinator(
        transport: Arc<RecordingTransport>,
        pinger: Arc<ScriptedPinger>,
    ) -> WakeCoordinator {
        WakeCoordinator::with_parts(
            Box::new(transport),
            Box::new(pinger),
            WakeConfig {
                retries: 3,
                retry_delay_secs: 5,
            },
        )
    }

    fn mac() -> MacAddress {
        "01-23-45-67-89-AB".parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ip_returns_true_after_one_cycle() {
        let transport = Arc::new(RecordingTransport::default());
        let pinger = Arc::new(ScriptedPinger::never());
        let coordinator = coordinator(Arc::clone(&transport), Arc::clone(&pinger));

        let start = Instant::now();
        let woken = coordinator.wake(&mac(), None, None).await;

        assert!(woken);
        assert_eq!(transport.broadcasts.load(Ordering::SeqCst), 1);
        assert_eq!(transport.unicasts.load(Ordering::SeqCst), 0);
        assert_eq!(pinger.probes.load(Ordering::SeqCst), 0);
        // Exactly one send-and-wait cycle
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_ip_fails_after_all_retries() {
        let transport = Arc::new(RecordingTransport::default());
        let pinger = Arc::new(ScriptedPinger::never());
        let coordinator = coordinator(Arc::clone(&transport), Arc::clone(&pinger));

        let ip: IpAddr = "192.168.1.50".parse().unwrap();
        let woken = coordinator.wake(&mac(), Some(ip), None).await;

        assert!(!woken);
        assert_eq!(transport.broadcasts.load(Ordering::SeqCst), 3);
        assert_eq!(transport.unicasts.load(Ordering::SeqCst), 3);
        assert_eq!(pinger.probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_echo_success_ends_retry_loop_early() {
        let transport = Arc::new(RecordingTransport::default());
        let pinger = Arc::new(ScriptedPinger::answers_on(2));
        let coordinator = coordinator(Arc::clone(&transport), Arc::clone(&pinger));

        let ip: IpAddr = "192.168.1.50".parse().unwrap();
        let woken = coordinator.wake(&mac(), Some(ip), None).await;

        assert!(woken);
        assert_eq!(transport.broadcasts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_surfaces_invalid_mac_and_continues() {
        let transport = Arc::new(RecordingTransport::default());
        let pinger = Arc::new(ScriptedPinger::never());
        let coordinator = coordinator(Arc::clone(&transport), Arc::clone(&pinger));

        let machines = vec![
            RemoteMachine {
                name: "bad".to_string(),
                mac_address: "no-hex-here".to_string(),
                is_selected: true,
                ..Default::default()
            },
            RemoteMachine {
                name: "good".to_string(),
                mac_address: "01-23-45-67-89-AB".to_string(),
                is_selected: true,
                ..Default::default()
            },
            RemoteMachine {
                name: "unselected".to_string(),
                mac_address: "01-23-45-67-89-AB".to_string(),
                is_selected: false,
                ..Default::default()
            },
        ];

        let signals = SequenceSignals::new();
        let (status, mut rx) = StatusSender::channel();
        let outcome = coordinator.wake_batch(&machines, &signals, &status).await;

        // "bad" is attempted but fails validation; "good" has no IP so one
        // send counts as woken; "unselected" is ignored entirely.
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.woken, 1);
        assert!(!outcome.cancelled);
        assert_eq!(transport.broadcasts.load(Ordering::SeqCst), 1);

        let mut saw_invalid_mac = false;
        while let Ok(event) = rx.try_recv() {
            if let bl_core::StatusEvent::Activity(line) = event {
                saw_invalid_mac |= line.starts_with("bad:");
            }
        }
        assert!(saw_invalid_mac);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_stops_on_cancel() {
        let transport = Arc::new(RecordingTransport::default());
        let pinger = Arc::new(ScriptedPinger::never());
        let coordinator = coordinator(Arc::clone(&transport), Arc::clone(&pinger));

        let machine = |name: &str| RemoteMachine {
            name: name.to_string(),
            mac_address: "01-23-45-67-89-AB".to_string(),
            is_selected: true,
            ..Default::default()
        };
        let machines = vec![machine("first"), machine("second")];

        let signals = SequenceSignals::new();
        signals.request_stop();
        let (status, _rx) = StatusSender::channel();

        let outcome = coordinator.wake_batch(&machines, &signals, &status).await;

        assert!(outcome.cancelled);
        assert_eq!(outcome.woken, 0);
        assert_eq!(transport.broadcasts.load(Ordering::SeqCst), 0);
    }
}
