//! MAC address normalization and OUI extraction.
//!
//! Lease servers write hardware addresses in several spellings
//! (`00-1A-1E-AA-BB-CC`, `00:1a:1e:aa:bb:cc`, `001a.1eaa.bbcc`). Everything
//! downstream works on the lower-case, colon-separated form.

use std::fmt;
use std::str::FromStr;

use pnet::util::MacAddr;

/// Lower-cases and rewrites hyphen separators to colons.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('-', ":")
}

/// Parses a six-group MAC, or twelve hex digits optionally dotted in threes.
pub fn parse_mac(raw: &str) -> Option<MacAddr> {
    let normalized = normalize(raw);
    if normalized.contains(':') {
        return MacAddr::from_str(&normalized).ok();
    }

    let digits: String = normalized.chars().filter(|c| *c != '.').collect();
    if digits.len() != 12 || !digits.is_ascii() {
        return None;
    }
    let mut octets = [0u8; 6];
    for (idx, slot) in octets.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&digits[idx * 2..idx * 2 + 2], 16).ok()?;
    }
    let [a, b, c, d, e, f] = octets;
    Some(MacAddr::new(a, b, c, d, e, f))
}

/// The first three octets of a MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oui(pub [u8; 3]);

impl Oui {
    /// Extracts the OUI from any of the supported MAC spellings.
    ///
    /// Only the leading three octets need to be well formed; the remainder of
    /// the address is not inspected.
    pub fn from_mac_str(raw: &str) -> Option<Self> {
        let normalized = normalize(raw);
        let groups: Vec<&str> = normalized.split(':').collect();
        if groups.len() >= 3 {
            return Self::from_groups(&groups[..3]);
        }
        let digits: String = normalized.chars().filter(|c| *c != '.').collect();
        if digits.len() >= 6 && digits.is_ascii() {
            return Self::from_hex_digits(&digits[..6]);
        }
        None
    }

    pub fn from_mac(mac: MacAddr) -> Self {
        Self([mac.0, mac.1, mac.2])
    }

    fn from_groups(groups: &[&str]) -> Option<Self> {
        let mut octets = [0u8; 3];
        for (slot, group) in octets.iter_mut().zip(groups) {
            if group.is_empty() || group.len() > 2 {
                return None;
            }
            *slot = u8::from_str_radix(group, 16).ok()?;
        }
        Some(Self(octets))
    }

    fn from_hex_digits(digits: &str) -> Option<Self> {
        let mut octets = [0u8; 3];
        for (idx, slot) in octets.iter_mut().enumerate() {
            *slot = u8::from_str_radix(digits.get(idx * 2..idx * 2 + 2)?, 16).ok()?;
        }
        Some(Self(octets))
    }
}

impl FromStr for Oui {
    type Err = String;

    /// Accepts `00:1a:1e`, `00-1A-1E` and `001A1E`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mac_str(s).ok_or_else(|| format!("invalid OUI: {s}"))
    }
}

impl fmt::Display for Oui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}")
    }
}
