//! Read-only views over the artifacts, for the query surface.
//!
//! Both readers treat a missing or unreadable file as empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;
use serde::ser::SerializeMap;
use tracing::debug;

/// Vendor group → inventory lines, in the order the groups appear in the artifact.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryView {
    groups: Vec<(String, Vec<String>)>,
}

impl InventoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }

    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, lines)| lines.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The lines of `group`, created at the end if the group is new.
    fn group_mut(&mut self, group: &str) -> &mut Vec<String> {
        let idx = match self.groups.iter().position(|(name, _)| name == group) {
            Some(idx) => idx,
            None => {
                self.groups.push((group.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }
}

impl Serialize for InventoryView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (group, lines) in &self.groups {
            map.serialize_entry(group, lines)?;
        }
        map.end()
    }
}

/// One lease row keyed by header name.
pub type LeaseRow = BTreeMap<String, String>;

/// Parses a grouped-section inventory. Lines before the first `[group]` are ignored.
pub fn parse_inventory(text: &str) -> InventoryView {
    let mut view = InventoryView::new();
    let mut current: Option<String> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(group) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            view.group_mut(group);
            current = Some(group.to_string());
        } else if let Some(group) = &current {
            view.group_mut(group).push(line.to_string());
        }
    }

    view
}

pub fn read_inventory(path: &Path) -> InventoryView {
    match fs::read_to_string(path) {
        Ok(text) => parse_inventory(&text),
        Err(e) => {
            debug!("Inventory {} unavailable: {e}", path.display());
            InventoryView::new()
        }
    }
}

/// Parses lease CSV into rows keyed by the header. Unreadable rows are dropped.
pub fn parse_lease_rows(text: &str) -> Vec<LeaseRow> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(_) => return Vec::new(),
    };

    reader
        .records()
        .filter_map(|record| record.ok())
        .map(|record| {
            headers
                .iter()
                .zip(record.iter())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
        .collect()
}

pub fn read_lease_rows(path: &Path) -> Vec<LeaseRow> {
    match fs::read(path) {
        Ok(bytes) => parse_lease_rows(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            debug!("Lease source {} unavailable: {e}", path.display());
            Vec::new()
        }
    }
}
