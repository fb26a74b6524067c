//! 16-bit node addresses.
//!
//! `0xFFFF` is reserved as the broadcast address: a frame sent to it is
//! accepted by every node on the medium, including the sender itself when
//! the medium is looped back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A node identifier on the shared medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Address(u16);

/// Reserved all-ones address accepted by every node.
pub const BROADCAST: Address = Address::BROADCAST;

impl Address {
    /// Reserved all-ones address accepted by every node.
    pub const BROADCAST: Address = Address(0xFFFF);

    /// Address reported by a MAC that was never configured.
    pub const UNSET: Address = Address(0);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub const fn is_broadcast(self) -> bool {
        self.0 == Self::BROADCAST.0
    }

    /// Bitwise complement. Never equal to `self`.
    pub const fn complement(self) -> Self {
        Self(!self.0)
    }

    /// Big-endian wire bytes.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

/// Returns true if a node owning `own` should accept a frame addressed to `recipient`.
#[inline]
pub fn accepts(own: Address, recipient: Address) -> bool {
    recipient == own || recipient.is_broadcast()
}

impl From<u16> for Address {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Address> for u16 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Error returned when parsing an address from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address {input:?} (expected 0..=65535, 0x0000..=0xffff, or \"broadcast\")")]
pub struct ParseAddressError {
    input: String,
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let text = s.trim();
        let err = || ParseAddressError {
            input: s.to_string(),
        };

        if text.eq_ignore_ascii_case("broadcast") {
            return Ok(Self::BROADCAST);
        }

        let parsed = match text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
        {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => text.parse::<u16>(),
        };

        parsed.map(Self).map_err(|_| err())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Int(u16),
    Text(String),
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match AddressRepr::deserialize(deserializer)? {
            AddressRepr::Int(raw) => Ok(Self(raw)),
            AddressRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_is_all_ones() {
        assert_eq!(BROADCAST.get(), 0xFFFF);
        assert!(BROADCAST.is_broadcast());
        assert!(!Address::new(0x1234).is_broadcast());
    }

    #[test]
    fn complement_never_matches() {
        for raw in [0u16, 1, 0x1234, 0x7FFF, 0xFFFE, 0xFFFF] {
            let addr = Address::new(raw);
            assert_ne!(addr, addr.complement());
            assert_eq!(addr.complement().complement(), addr);
        }
    }

    #[test]
    fn accepts_own_and_broadcast_only() {
        let own = Address::new(0x00AB);
        assert!(accepts(own, own));
        assert!(accepts(own, BROADCAST));
        assert!(!accepts(own, Address::new(0x00AC)));
        assert!(!accepts(own, own.complement()));
    }

    #[test]
    fn parse_decimal_hex_and_keyword() {
        assert_eq!("4660".parse::<Address>().unwrap(), Address::new(0x1234));
        assert_eq!("0x1234".parse::<Address>().unwrap(), Address::new(0x1234));
        assert_eq!(" 0XFFFE ".parse::<Address>().unwrap(), Address::new(0xFFFE));
        assert_eq!("Broadcast".parse::<Address>().unwrap(), BROADCAST);
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert!("65536".parse::<Address>().is_err());
        assert!("0x10000".parse::<Address>().is_err());
        assert!("node-7".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn display_is_fixed_width_hex() {
        assert_eq!(Address::new(0x12).to_string(), "0x0012");
        assert_eq!(BROADCAST.to_string(), "0xffff");
    }

    #[test]
    fn serde_accepts_integers_and_strings() {
        let from_int: Address = serde_json::from_str("4660").unwrap();
        let from_hex: Address = serde_json::from_str("\"0x1234\"").unwrap();
        assert_eq!(from_int, from_hex);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "4660");
        assert!(serde_json::from_str::<Address>("70000").is_err());
    }
}
