//! Local network adapter inspection
//!
//! Heartbeats announce every usable IPv4 address of this host plus the MAC
//! of the adapter owning the primary one. "Usable" excludes loopback,
//! link-local (169.254/16) and the 0/8 range.

use std::net::{IpAddr, Ipv4Addr};
use sysinfo::Networks;

/// Placeholder sent when no adapter MAC could be determined
pub const UNKNOWN_MAC: &str = "00-00-00-00-00-00";

fn is_usable(ip: &Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_link_local() && ip.octets()[0] != 0
}

fn interface_ipv4s(data: &sysinfo::NetworkData) -> Vec<Ipv4Addr> {
    data.ip_networks()
        .iter()
        .filter_map(|net| match net.addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .collect()
}

/// All usable IPv4 addresses of this host, insertion-ordered and deduplicated.
pub fn usable_ipv4_addresses() -> Vec<Ipv4Addr> {
    let networks = Networks::new_with_refreshed_list();
    let mut result = Vec::new();

    for (_name, data) in networks.iter() {
        for ip in interface_ipv4s(data) {
            if is_usable(&ip) && !result.contains(&ip) {
                result.push(ip);
            }
        }
    }

    result
}

/// MAC address of the adapter owning `ip`, formatted `AA-BB-CC-DD-EE-FF`.
/// Falls back to the first adapter with a usable IPv4 address, then `None`.
pub fn mac_for_ip(ip: Option<Ipv4Addr>) -> Option<String> {
    let networks = Networks::new_with_refreshed_list();

    let mut fallback = None;
    for (_name, data) in networks.iter() {
        let ips = interface_ipv4s(data);
        let mac = data.mac_address();
        if mac.0 == [0u8; 6] {
            continue;
        }
        if let Some(target) = ip {
            if ips.contains(&target) {
                return Some(format_mac(&mac.0));
            }
        }
        if fallback.is_none() && ips.iter().any(is_usable) {
            fallback = Some(format_mac(&mac.0));
        }
    }

    fallback
}

fn format_mac(bytes: &[u8; 6]) -> String {
    format!(
        "{:02X}-{:02X}-{:02X}-{:02X}-{:02X}-{:02X}",
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
    )
}
