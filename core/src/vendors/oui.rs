//! OUI → vendor tables.
//!
//! Two layers: hand-maintained overrides, then the offline IEEE reference
//! file. An override always wins over the reference file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use ztpinv_common::network::mac::Oui;

use super::VendorRepository;

const MARKERS: &[&str] = &["(hex)", "(base 16)"];

#[derive(Debug, Clone, Default)]
pub struct OuiTable {
    overrides: HashMap<Oui, String>,
    /// Override vendor names in insertion order, without duplicates.
    override_vendors: Vec<String>,
    reference: HashMap<Oui, String>,
}

impl OuiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `(oui, vendor)` overrides. A later pair for the same OUI replaces an earlier one.
    pub fn with_overrides<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (oui, vendor) in pairs {
            let vendor: String = vendor.into();
            match oui.as_ref().parse::<Oui>() {
                Ok(oui) => {
                    if !self.override_vendors.contains(&vendor) {
                        self.override_vendors.push(vendor.clone());
                    }
                    self.overrides.insert(oui, vendor);
                }
                Err(e) => warn!("Ignoring vendor override for {vendor}: {e}"),
            }
        }
        self
    }

    /// Loads the reference file at `path`.
    ///
    /// A missing or unreadable file leaves the reference layer empty; the run
    /// carries on with the overrides alone.
    pub fn with_reference_file(mut self, path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => {
                self.reference = parse_reference(&String::from_utf8_lossy(&bytes));
                debug!("Loaded {} OUI entries from {}", self.reference.len(), path.display());
            }
            Err(e) => {
                warn!("OUI reference {} unavailable ({e}), using overrides only", path.display());
            }
        }
        self
    }

    pub fn with_reference(mut self, reference: HashMap<Oui, String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn lookup(&self, oui: Oui) -> Option<&str> {
        self.overrides
            .get(&oui)
            .or_else(|| self.reference.get(&oui))
            .map(String::as_str)
    }

    /// Vendor names recognized at the start of decoded client identifiers.
    pub fn vendor_tokens(&self) -> &[String] {
        &self.override_vendors
    }

    pub fn reference_len(&self) -> usize {
        self.reference.len()
    }

    pub fn override_len(&self) -> usize {
        self.overrides.len()
    }
}

impl VendorRepository for OuiTable {
    fn get_vendor(&self, oui: Oui) -> Option<String> {
        self.lookup(oui).map(str::to_string)
    }
}

/// Parses IEEE `oui.txt` content.
///
/// Lines carrying `(hex)` or `(base 16)` hold a prefix before the marker and
/// the vendor after it. The first entry for a prefix is kept.
pub fn parse_reference(text: &str) -> HashMap<Oui, String> {
    let mut table = HashMap::new();

    for line in text.lines() {
        let Some((prefix, vendor)) = MARKERS
            .iter()
            .find_map(|marker| line.split_once(*marker))
        else {
            continue;
        };

        let vendor = vendor.trim();
        if vendor.is_empty() {
            continue;
        }
        if let Ok(oui) = prefix.trim().parse::<Oui>() {
            table.entry(oui).or_insert_with(|| vendor.to_string());
        }
    }

    table
}
