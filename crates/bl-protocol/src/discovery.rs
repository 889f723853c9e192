//! Discovery heartbeat wire format
//!
//! Heartbeats are single UDP datagrams of pipe-delimited UTF-8 text:
//!
//! - v3: `MAGIC|3|name|mode|primaryIp|mac|ip1;ip2;...`
//! - v2 (legacy): `MAGIC|2|name|mode|ip|mac` (MAC optional)
//!
//! Anything that does not match a known layout is dropped without error;
//! arbitrary broadcast noise on a shared port is expected, not exceptional.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed header every discovery datagram must start with
pub const MAGIC_HEADER: &str = "BOOTLAUNCHER_DISCOVERY";

/// Version this node sends. Older v2 packets are still accepted.
pub const PROTOCOL_VERSION: u8 = 3;

/// UDP port discovery traffic uses
pub const DISCOVERY_PORT: u16 = 49525;

/// Operating role a node announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeMode {
    /// Coordinates the launch sequence and wakes peers
    Master,
    /// Waits to be woken; never sends Wake-on-LAN
    Slave,
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeMode::Master => write!(f, "Master"),
            NodeMode::Slave => write!(f, "Slave"),
        }
    }
}

impl FromStr for NodeMode {
    type Err = std::convert::Infallible;

    /// Anything that is not exactly "Master" is treated as a slave.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Master" {
            Ok(NodeMode::Master)
        } else {
            Ok(NodeMode::Slave)
        }
    }
}

impl Default for NodeMode {
    fn default() -> Self {
        NodeMode::Slave
    }
}

/// One parsed heartbeat announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    /// Machine name of the sender
    pub name: String,
    /// Role the sender is currently operating in
    pub mode: NodeMode,
    /// First usable IPv4 address of the sender
    pub primary_ip: String,
    /// MAC of the adapter owning the primary IP, as the sender formatted it
    pub mac: String,
    /// All usable IPv4 addresses, in sender order
    pub all_ips: Vec<String>,
}

impl Heartbeat {
    /// Encode as a v3 datagram payload.
    pub fn encode(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            MAGIC_HEADER,
            PROTOCOL_VERSION,
            self.name,
            self.mode,
            self.primary_ip,
            self.mac,
            self.all_ips.join(";"),
        )
    }

    /// Parse a received datagram payload.
    ///
    /// Returns `None` for anything malformed: wrong magic header, too few
    /// fields for the claimed version, or an unknown version whose field
    /// count matches no known layout.
    pub fn parse(payload: &str) -> Option<Heartbeat> {
        let parts: Vec<&str> = payload.split('|').collect();
        if parts.len() < 5 || parts[0] != MAGIC_HEADER {
            return None;
        }

        match parts[1] {
            "3" => {
                if parts.len() < 7 {
                    return None;
                }
                let primary_ip = parts[4].to_string();
                let mut all_ips: Vec<String> = parts[6]
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if all_ips.is_empty() && !primary_ip.is_empty() {
                    all_ips.push(primary_ip.clone());
                }
                Some(Heartbeat {
                    name: parts[2].to_string(),
                    mode: parts[3].parse().unwrap_or_default(),
                    primary_ip,
                    mac: parts[5].to_string(),
                    all_ips,
                })
            }
            // v2 and anything older that still carries five fields:
            // MAGIC|ver|name|mode|ip[|mac]
            _ => {
                let ip = parts[4].to_string();
                Some(Heartbeat {
                    name: parts[2].to_string(),
                    mode: parts[3].parse().unwrap_or_default(),
                    primary_ip: ip.clone(),
                    mac: parts.get(5).map(|s| s.to_string()).unwrap_or_default(),
                    all_ips: vec![ip],
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_v3_multiple_ips() {
        let hb = Heartbeat::parse(
            "BOOTLAUNCHER_DISCOVERY|3|NODE1|Master|10.0.0.5|AA-BB-CC-DD-EE-FF|10.0.0.5;192.168.1.5",
        )
        .unwrap();

        assert_eq!(hb.name, "NODE1");
        assert_eq!(hb.mode, NodeMode::Master);
        assert_eq!(hb.mac, "AA-BB-CC-DD-EE-FF");
        assert_eq!(hb.all_ips, vec!["10.0.0.5", "192.168.1.5"]);
    }

    #[test]
    fn test_parse_v3_empty_ip_list_falls_back_to_primary() {
        let hb =
            Heartbeat::parse("BOOTLAUNCHER_DISCOVERY|3|NODE1|Slave|10.0.0.5|AA-BB-CC-DD-EE-FF|")
                .unwrap();
        assert_eq!(hb.all_ips, vec!["10.0.0.5"]);
    }

    #[test]
    fn test_parse_v2_legacy() {
        let with_mac =
            Heartbeat::parse("BOOTLAUNCHER_DISCOVERY|2|OLDNODE|Slave|192.168.0.9|AA-BB-CC-DD-EE-FF")
                .unwrap();
        assert_eq!(with_mac.all_ips, vec!["192.168.0.9"]);
        assert_eq!(with_mac.mac, "AA-BB-CC-DD-EE-FF");

        let without_mac =
            Heartbeat::parse("BOOTLAUNCHER_DISCOVERY|2|OLDNODE|Master|192.168.0.9").unwrap();
        assert_eq!(without_mac.mode, NodeMode::Master);
        assert_eq!(without_mac.mac, "");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Heartbeat::parse("").is_none());
        assert!(Heartbeat::parse("SOMETHING_ELSE|3|NODE1|Master|10.0.0.5|MAC|ips").is_none());
        assert!(Heartbeat::parse("BOOTLAUNCHER_DISCOVERY|3|NODE1").is_none());
        // v3 claimed but too few fields
        assert!(Heartbeat::parse("BOOTLAUNCHER_DISCOVERY|3|NODE1|Master|10.0.0.5").is_none());
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        let hb = Heartbeat {
            name: "DESKTOP".to_string(),
            mode: NodeMode::Master,
            primary_ip: "10.1.2.3".to_string(),
            mac: "00-11-22-33-44-55".to_string(),
            all_ips: vec!["10.1.2.3".to_string(), "172.16.0.4".to_string()],
        };
        assert_eq!(Heartbeat::parse(&hb.encode()).unwrap(), hb);
    }

    #[test]
    fn test_mode_parse_defaults_to_slave() {
        assert_eq!("Master".parse::<NodeMode>().unwrap(), NodeMode::Master);
        assert_eq!("Slave".parse::<NodeMode>().unwrap(), NodeMode::Slave);
        assert_eq!("anything".parse::<NodeMode>().unwrap(), NodeMode::Slave);
    }
}
