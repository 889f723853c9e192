//! Hardware address parsing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// A 6-byte hardware (MAC) address.
///
/// Parsing is deliberately permissive about delimiters: `01:23:45:67:89:AB`,
/// `01-23-45-67-89-AB` and `0123456789AB` all denote the same address. Every
/// non-hex character is stripped first; exactly 12 hex digits must remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl FromStr for MacAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.chars().filter(|c| c.is_ascii_hexdigit()).collect();
        if hex.len() != 12 {
            return Err(ProtocolError::InvalidMac(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| ProtocolError::InvalidMac(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}-{:02X}-{:02X}-{:02X}-{:02X}-{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equivalent_formats() {
        let colons: MacAddress = "01:23:45:67:89:AB".parse().unwrap();
        let dashes: MacAddress = "01-23-45-67-89-AB".parse().unwrap();
        let bare: MacAddress = "0123456789AB".parse().unwrap();
        let lower: MacAddress = "0123456789ab".parse().unwrap();

        assert_eq!(colons, dashes);
        assert_eq!(colons, bare);
        assert_eq!(colons, lower);
        assert_eq!(colons.as_bytes(), &[0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!("01:23:45:67:89".parse::<MacAddress>().is_err());
        assert!("01:23:45:67:89:AB:CD".parse::<MacAddress>().is_err());
        assert!("".parse::<MacAddress>().is_err());
        assert!("not a mac".parse::<MacAddress>().is_err());
        // 12 characters but not all hex
        assert!("0123456789AG".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.to_string(), "AA-BB-CC-DD-EE-FF");
        assert_eq!(mac.to_string().parse::<MacAddress>().unwrap(), mac);
    }
}
