//! Column discovery for delimited lease sources.
//!
//! Lease servers have written several header spellings over the years. Each
//! one is a [`NamingConvention`]; supporting a new variant means appending to
//! [`CONVENTIONS`], never editing an existing entry.

use ztpinv_common::error::{PipelineError, Result};
use ztpinv_common::network::ip;

/// Column names used by one generation of lease files.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    pub name: &'static str,
    pub ip: &'static [&'static str],
    pub hardware_address: &'static [&'static str],
    pub client_identifier: &'static [&'static str],
    pub timestamp: &'static [&'static str],
    pub hostname: &'static [&'static str],
}

/// Kea `memfile` lease CSV.
pub const KEA: NamingConvention = NamingConvention {
    name: "kea",
    ip: &["address"],
    hardware_address: &["hwaddr"],
    client_identifier: &["client_id"],
    timestamp: &["lease_time", "expire", "cltt"],
    hostname: &["hostname"],
};

/// Older exports with a truncated address column and the identifier in `user_context`.
pub const LEGACY: NamingConvention = NamingConvention {
    name: "legacy",
    ip: &["ame"],
    hardware_address: &["hwaddr"],
    client_identifier: &["user_context"],
    timestamp: &[],
    hostname: &[],
};

/// Tried in this order, per field.
pub const CONVENTIONS: &[NamingConvention] = &[KEA, LEGACY];

pub const DEFAULT_IP_INDEX: usize = 0;
pub const DEFAULT_HARDWARE_INDEX: usize = 1;
pub const DEFAULT_CLIENT_ID_INDEX: usize = 2;
pub const DEFAULT_TIMESTAMP_INDEX: usize = 4;
/// Position of `hostname` in a headerless Kea row.
pub const DEFAULT_HOSTNAME_INDEX: usize = 8;

/// Resolved column positions of a delimited lease source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseSchema {
    pub ip: usize,
    pub hardware_address: usize,
    pub client_identifier: usize,
    pub timestamp: usize,
    pub hostname: Option<usize>,
    /// `false` when the first row is data.
    pub has_header: bool,
    /// Name of the convention that matched the IP column, if any did.
    pub convention: Option<&'static str>,
}

impl LeaseSchema {
    /// The built-in ordering assumed for sources without a header.
    pub fn headerless() -> Self {
        Self {
            ip: DEFAULT_IP_INDEX,
            hardware_address: DEFAULT_HARDWARE_INDEX,
            client_identifier: DEFAULT_CLIENT_ID_INDEX,
            timestamp: DEFAULT_TIMESTAMP_INDEX,
            hostname: Some(DEFAULT_HOSTNAME_INDEX),
            has_header: false,
            convention: None,
        }
    }

    /// Shortest row that still carries both required columns.
    pub fn required_len(&self) -> usize {
        self.ip.max(self.hardware_address) + 1
    }
}

/// Determines the schema from the first row of a delimited source.
pub fn resolve(first_row: &[&str]) -> Result<LeaseSchema> {
    let first_field = first_row.first().map(|f| clean(f)).unwrap_or_default();
    if ip::is_ipv4(&first_field) {
        return Ok(LeaseSchema::headerless());
    }

    let header: Vec<String> = first_row.iter().map(|f| clean(f)).collect();
    if header.iter().all(String::is_empty) {
        return Err(unresolvable("first row is empty"));
    }

    let ip = locate(&header, |c| c.ip);
    let hardware_address = locate(&header, |c| c.hardware_address);
    let client_identifier = locate(&header, |c| c.client_identifier);
    let timestamp = locate(&header, |c| c.timestamp);
    let hostname = locate(&header, |c| c.hostname);

    let matched_any = [&ip, &hardware_address, &client_identifier, &timestamp, &hostname]
        .iter()
        .any(|found| found.is_some());
    if !matched_any {
        return Err(unresolvable(&format!(
            "header {:?} matches no known naming convention and does not start with an IPv4 address",
            header.join(",")
        )));
    }

    let schema = LeaseSchema {
        ip: ip.map(|(idx, _)| idx).unwrap_or(DEFAULT_IP_INDEX),
        hardware_address: hardware_address
            .map(|(idx, _)| idx)
            .unwrap_or(DEFAULT_HARDWARE_INDEX),
        client_identifier: client_identifier
            .map(|(idx, _)| idx)
            .unwrap_or(DEFAULT_CLIENT_ID_INDEX),
        timestamp: timestamp.map(|(idx, _)| idx).unwrap_or(DEFAULT_TIMESTAMP_INDEX),
        hostname: hostname.map(|(idx, _)| idx),
        has_header: true,
        convention: ip.map(|(_, name)| name),
    };

    if schema.ip == schema.hardware_address {
        return Err(unresolvable("IP and hardware address resolve to the same column"));
    }
    if schema.required_len() > header.len() {
        return Err(unresolvable(&format!(
            "header has {} column(s), IP and hardware address columns cannot be placed",
            header.len()
        )));
    }

    Ok(schema)
}

/// Finds the first convention, in priority order, that names a column present in `header`.
fn locate(
    header: &[String],
    names: impl Fn(&NamingConvention) -> &'static [&'static str],
) -> Option<(usize, &'static str)> {
    CONVENTIONS.iter().find_map(|convention| {
        names(convention).iter().find_map(|name| {
            header
                .iter()
                .position(|column| column == name)
                .map(|idx| (idx, convention.name))
        })
    })
}

fn clean(field: &str) -> String {
    field.trim().trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

fn unresolvable(reason: &str) -> PipelineError {
    PipelineError::SchemaUnresolvable {
        reason: reason.to_string(),
    }
}
