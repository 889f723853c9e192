//! Discovery service: heartbeat sender and packet listener
//!
//! Both loops run until the handle is shut down. They share no state with
//! the orchestrator beyond the read-only mode callback and the outbound
//! observation channel.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use bl_core::config::DiscoveryConfig;
use bl_protocol::{Heartbeat, NodeMode};

use crate::netinfo;

/// Callback supplying the node's current mode; owned by the caller
pub type ModeFn = Arc<dyn Fn() -> NodeMode + Send + Sync>;

/// One peer sighting, raised once per IP a heartbeat reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeObservation {
    /// Peer machine name
    pub name: String,
    /// One address the peer reported
    pub ip: String,
    /// Role the peer announced
    pub mode: NodeMode,
    /// MAC the peer announced
    pub mac: String,
    /// Whether the packet came from this machine itself (by name, not IP)
    pub is_self: bool,
}

/// Spawns and owns the two discovery loops
pub struct DiscoveryService;

impl DiscoveryService {
    /// Bind the sockets and start both loops.
    ///
    /// `observations` receives one entry per IP per received heartbeat.
    /// Port 0 binds an ephemeral listener port, reported by
    /// [`DiscoveryHandle::port`].
    pub async fn spawn(
        config: DiscoveryConfig,
        machine_name: String,
        mode_fn: ModeFn,
        observations: mpsc::Sender<NodeObservation>,
    ) -> std::io::Result<DiscoveryHandle> {
        let listener = UdpSocket::bind(("0.0.0.0", config.port)).await?;
        let port = listener.local_addr()?.port();

        let sender = UdpSocket::bind(("0.0.0.0", 0)).await?;
        sender.set_broadcast(true)?;

        let cancel = CancellationToken::new();
        let heartbeat_enabled = Arc::new(AtomicBool::new(config.heartbeat_enabled));
        let (force_tx, force_rx) = mpsc::channel(4);

        let listen_task = tokio::spawn(listen_loop(
            listener,
            machine_name.clone(),
            observations,
            cancel.clone(),
        ));
        let heartbeat_task = tokio::spawn(heartbeat_loop(
            sender,
            port,
            machine_name,
            mode_fn,
            config.heartbeat_interval(),
            Arc::clone(&heartbeat_enabled),
            force_rx,
            cancel.clone(),
        ));

        Ok(DiscoveryHandle {
            port,
            heartbeat_enabled,
            force_tx,
            cancel,
            tasks: vec![listen_task, heartbeat_task],
        })
    }
}

/// Control handle for a running discovery service
pub struct DiscoveryHandle {
    port: u16,
    heartbeat_enabled: Arc<AtomicBool>,
    force_tx: mpsc::Sender<()>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl DiscoveryHandle {
    /// Actual listener port (useful when spawned with port 0)
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Enable or disable the periodic heartbeat. Takes effect on the next tick.
    pub fn set_heartbeat_enabled(&self, enabled: bool) {
        self.heartbeat_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Send one heartbeat immediately, regardless of the timer or the toggle.
    pub fn force_broadcast(&self) {
        let _ = self.force_tx.try_send(());
    }

    /// Stop both loops and wait for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

async fn listen_loop(
    socket: UdpSocket,
    machine_name: String,
    observations: mpsc::Sender<NodeObservation>,
    cancel: CancellationToken,
) {
    let mut buf = [0u8; 2048];

    loop {
        let (len, from) = tokio::select! {
            _ = cancel.cancelled() => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok(received) => received,
                Err(e) => {
                    tracing::debug!("Discovery receive error: {}", e);
                    continue;
                }
            },
        };

        let Ok(payload) = std::str::from_utf8(&buf[..len]) else {
            continue;
        };
        let Some(heartbeat) = Heartbeat::parse(payload) else {
            continue;
        };

        tracing::trace!("Heartbeat from {}: {} ({})", from, heartbeat.name, heartbeat.mode);

        let is_self = heartbeat.name.eq_ignore_ascii_case(&machine_name);
        for ip in &heartbeat.all_ips {
            let observation = NodeObservation {
                name: heartbeat.name.clone(),
                ip: ip.clone(),
                mode: heartbeat.mode,
                mac: heartbeat.mac.clone(),
                is_self,
            };
            if observations.send(observation).await.is_err() {
                // Consumer is gone; no reason to keep listening.
                return;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn heartbeat_loop(
    socket: UdpSocket,
    port: u16,
    machine_name: String,
    mode_fn: ModeFn,
    interval: std::time::Duration,
    enabled: Arc<AtomicBool>,
    mut force_rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        let forced = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => false,
            Some(()) = force_rx.recv() => true,
        };

        if !forced && !enabled.load(Ordering::Relaxed) {
            continue;
        }

        let payload = build_heartbeat(&machine_name, &mode_fn).encode();
        if let Err(e) = socket
            .send_to(payload.as_bytes(), (Ipv4Addr::BROADCAST, port))
            .await
        {
            tracing::debug!("Heartbeat send failed: {}", e);
        }
    }
}

/// Assemble this node's announcement from the live adapter state.
fn build_heartbeat(machine_name: &str, mode_fn: &ModeFn) -> Heartbeat {
    let ips = netinfo::usable_ipv4_addresses();
    let primary = ips.first().copied();
    let primary_ip = primary
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let mac = netinfo::mac_for_ip(primary).unwrap_or_else(|| netinfo::UNKNOWN_MAC.to_string());

    // Even with no usable addresses, announce the placeholder so the node
    // still shows up for peers.
    let mut all_ips: Vec<String> = ips.iter().map(|ip| ip.to_string()).collect();
    if all_ips.is_empty() {
        all_ips.push(primary_ip.clone());
    }

    Heartbeat {
        name: machine_name.to_string(),
        mode: (mode_fn)(),
        primary_ip,
        mac,
        all_ips,
    }
}
