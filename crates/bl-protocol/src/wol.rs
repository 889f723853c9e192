//! Wake-on-LAN magic packet construction

use crate::mac::MacAddress;

/// UDP port magic packets are sent to (discard protocol, by convention)
pub const WAKE_PORT: u16 = 9;

/// Magic packet size: 6 sync bytes plus 16 repetitions of the MAC
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

/// Build the 102-byte magic packet for the given hardware address:
/// six `0xFF` bytes followed by the MAC repeated 16 times.
pub fn magic_packet(mac: &MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
    for repetition in 0..16 {
        let start = 6 + repetition * 6;
        packet[start..start + 6].copy_from_slice(mac.as_bytes());
    }
    packet
}
