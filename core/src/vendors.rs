//! Vendor classification.
//!
//! A device is classified by walking an ordered chain of [`VendorStrategy`]
//! implementations and stopping at the first one that names a vendor:
//!
//! 1. [`strategy::ClientIdMac`]: a six-group client identifier is a MAC address.
//! 2. [`strategy::ClientIdPayload`]: a longer client identifier is hex-encoded
//!    text, possibly starting with a vendor name; otherwise its first six groups
//!    are used as a MAC.
//! 3. [`strategy::HardwareOui`]: the OUI of the hardware address.
//!
//! When nothing matches the vendor is [`UNKNOWN_VENDOR`]. Malformed input never
//! fails classification, it only moves on to the next strategy.

use std::fmt;

use tracing::debug;
use ztpinv_common::config::Config;
use ztpinv_common::network::mac::Oui;

pub mod oui;
pub mod strategy;

pub use oui::OuiTable;
use strategy::{ClientIdMac, ClientIdPayload, HardwareOui};

pub const UNKNOWN_VENDOR: &str = "unknown";

/// Resolves device manufacturers from OUIs.
pub trait VendorRepository: Send + Sync {
    /// Retrieves the vendor name for an OUI, `None` if it is unknown.
    fn get_vendor(&self, oui: Oui) -> Option<String>;
}

/// The identifying fields of one device.
#[derive(Debug, Clone, Copy)]
pub struct DeviceIdentity<'a> {
    pub hardware_address: &'a str,
    pub client_identifier: Option<&'a str>,
}

/// Which strategy produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    ClientIdMac,
    ClientIdPayload,
    ClientIdPrefix,
    HardwareOui,
    Unmatched,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClientIdMac => "client-id MAC",
            Self::ClientIdPayload => "client-id payload",
            Self::ClientIdPrefix => "client-id MAC prefix",
            Self::HardwareOui => "hardware OUI",
            Self::Unmatched => "no match",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub vendor: String,
    pub layer: Layer,
}

impl Classification {
    pub fn new(vendor: impl Into<String>, layer: Layer) -> Self {
        Self {
            vendor: vendor.into(),
            layer,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_VENDOR, Layer::Unmatched)
    }
}

/// One link of the classification chain.
pub trait VendorStrategy: Send + Sync {
    /// Returns a classification, or `None` to let the next strategy try.
    fn classify(
        &self,
        identity: &DeviceIdentity<'_>,
        repo: &dyn VendorRepository,
    ) -> Option<Classification>;
}

pub struct VendorClassifier {
    repo: Box<dyn VendorRepository>,
    chain: Vec<Box<dyn VendorStrategy>>,
}

impl VendorClassifier {
    /// The standard chain over `table`, with the table's override vendors as payload tokens.
    pub fn new(table: OuiTable) -> Self {
        let tokens = table.vendor_tokens().to_vec();
        Self::with_chain(
            Box::new(table),
            vec![
                Box::new(ClientIdMac),
                Box::new(ClientIdPayload::new(tokens)),
                Box::new(HardwareOui),
            ],
        )
    }

    /// Builds the OUI table described by `config`: overrides plus the reference file.
    pub fn from_config(config: &Config) -> Self {
        let table = OuiTable::new()
            .with_reference_file(&config.oui_path)
            .with_overrides(config.override_pairs());
        debug!(
            "OUI table: {} override(s), {} reference entries",
            table.override_len(),
            table.reference_len()
        );
        Self::new(table)
    }

    pub fn with_chain(
        repo: Box<dyn VendorRepository>,
        chain: Vec<Box<dyn VendorStrategy>>,
    ) -> Self {
        Self { repo, chain }
    }

    pub fn classify(&self, identity: &DeviceIdentity<'_>) -> Classification {
        self.chain
            .iter()
            .find_map(|strategy| strategy.classify(identity, self.repo.as_ref()))
            .unwrap_or_else(Classification::unknown)
    }

    pub fn vendor_of(&self, hardware_address: &str, client_identifier: Option<&str>) -> String {
        self.classify(&DeviceIdentity {
            hardware_address,
            client_identifier,
        })
        .vendor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> VendorClassifier {
        VendorClassifier::new(OuiTable::new().with_overrides(ztpinv_common::config::BUILTIN_OVERRIDES.iter().copied()))
    }

    fn classify(hw: &str, client_id: Option<&str>) -> Classification {
        classifier().classify(&DeviceIdentity {
            hardware_address: hw,
            client_identifier: client_id,
        })
    }

    #[test]
    fn hardware_oui_when_no_client_id() {
        assert_eq!(
            classify("00:1a:1e:aa:bb:cc", None),
            Classification::new("cisco", Layer::HardwareOui)
        );
    }

    #[test]
    fn client_id_mac_is_preferred_over_hardware_address() {
        assert_eq!(
            classify("00:1a:1e:aa:bb:cc", Some("00:1b:21:00:00:01")),
            Classification::new("juniper", Layer::ClientIdMac)
        );
    }

    #[test]
    fn arista_payload_skips_the_oui_table() {
        // "arista-eos" hex encoded; the hardware address belongs to cisco.
        let result = classify("00:1a:1e:aa:bb:cc", Some("61:72:69:73:74:61:2d:65:6f:73"));
        assert_eq!(result, Classification::new("arista", Layer::ClientIdPayload));
    }

    #[test]
    fn unknown_client_id_falls_back_to_hardware() {
        assert_eq!(
            classify("00:1b:21:aa:bb:cc", Some("de:ad:be:ef:00:01")),
            Classification::new("juniper", Layer::HardwareOui)
        );
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(classify("de:ad:be:ef:00:01", None), Classification::unknown());
        assert_eq!(classify("", Some("zz")), Classification::unknown());
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = classifier();
        let first = classifier.vendor_of("00:1c:73:00:00:01", Some("01:02"));
        for _ in 0..3 {
            assert_eq!(classifier.vendor_of("00:1c:73:00:00:01", Some("01:02")), first);
        }
        assert_eq!(first, "arista");
    }
}
