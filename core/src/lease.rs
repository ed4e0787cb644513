//! Lease ingestion.
//!
//! Turns the raw contents of a lease source into normalized [`LeaseRecord`]s.
//! Two source families are understood:
//!
//! * **Delimited** sources ([`parser`]): Kea-style CSV with one of several
//!   historical header conventions, or headerless CSV whose first field is
//!   already an address. Columns are located by the [`schema`] resolver.
//! * **Free-text** lease logs ([`freetext`]): ISC-style `lease <ip> { ... }`
//!   blocks, accepted as a degraded tier.
//!
//! Parsing never logs. Every skipped or repaired row is returned as a
//! [`RowDiagnostic`] in the [`ParseReport`] and rendered separately by
//! [`diagnostics::emit`].

use std::fmt;
use std::fs;
use std::io;
use std::net::Ipv4Addr;
use std::path::Path;

use ztpinv_common::error::{PipelineError, Result};
use ztpinv_common::network::{ip, mac};

pub mod diagnostics;
pub mod freetext;
pub mod parser;
pub mod resolver;
pub mod schema;

/// One admitted lease row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRecord {
    pub ip_address: Ipv4Addr,
    /// Six lower-case, zero-padded, colon-separated octets.
    pub hardware_address: String,
    pub client_identifier: Option<String>,
    pub hostname: Option<String>,
    /// Only comparable with timestamps from the same source. `0` when unknown.
    pub lease_timestamp: i64,
}

/// The shape a lease source was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseFormat {
    Delimited,
    FreeText,
}

impl fmt::Display for LeaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimited => f.write_str("delimited"),
            Self::FreeText => f.write_str("free-text"),
        }
    }
}

/// Required lease fields, named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ip,
    HardwareAddress,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip => f.write_str("IP address"),
            Self::HardwareAddress => f.write_str("hardware address"),
        }
    }
}

/// Why a row was skipped or repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    ShortRow { len: usize, required: usize },
    EmptyField(Field),
    InvalidIp(String),
    /// Not a six-octet hardware address.
    InvalidMac(String),
    ExcludedIp(Ipv4Addr),
    /// The row was kept with a timestamp of `0`.
    BadTimestamp(String),
    /// A free-text lease block that never saw its closing brace.
    Unterminated,
    /// The reader could not decode the row at all.
    Unreadable(String),
}

impl RowIssue {
    /// Whether the row carrying this issue was dropped.
    pub fn is_skip(&self) -> bool {
        !matches!(self, Self::BadTimestamp(_))
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortRow { len, required } => {
                write!(f, "row has {len} field(s), at least {required} required")
            }
            Self::EmptyField(field) => write!(f, "empty {field}"),
            Self::InvalidIp(raw) => write!(f, "invalid IPv4 address {raw:?}"),
            Self::InvalidMac(raw) => write!(f, "invalid hardware address {raw:?}"),
            Self::ExcludedIp(ip) => write!(f, "excluded address {ip}"),
            Self::BadTimestamp(raw) => write!(f, "unparsable lease timestamp {raw:?}, using 0"),
            Self::Unterminated => f.write_str("lease block is not terminated"),
            Self::Unreadable(reason) => write!(f, "unreadable row: {reason}"),
        }
    }
}

/// A row-level outcome, located by its line in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    pub line: usize,
    pub issue: RowIssue,
}

/// Everything one pass over a lease source produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub format: LeaseFormat,
    /// Admitted records in source order.
    pub records: Vec<LeaseRecord>,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Data rows (or lease blocks) looked at, header excluded.
    pub rows_seen: usize,
}

impl ParseReport {
    pub(crate) fn new(format: LeaseFormat) -> Self {
        Self {
            format,
            records: Vec::new(),
            diagnostics: Vec::new(),
            rows_seen: 0,
        }
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.issue.is_skip()).count()
    }

    pub(crate) fn note(&mut self, line: usize, issue: RowIssue) {
        self.diagnostics.push(RowDiagnostic { line, issue });
    }
}

/// Borrowed fields of one row before validation.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RawLease<'a> {
    pub ip: &'a str,
    pub hardware_address: &'a str,
    pub client_identifier: Option<&'a str>,
    pub hostname: Option<&'a str>,
    pub timestamp: Option<&'a str>,
}

impl ParseReport {
    /// Validates and normalizes one row, recording whatever went wrong.
    pub(crate) fn admit(&mut self, line: usize, raw: RawLease<'_>, excluded: Option<Ipv4Addr>) {
        self.rows_seen += 1;

        let ip_raw = raw.ip.trim();
        let mac_raw = raw.hardware_address.trim();
        if ip_raw.is_empty() {
            return self.note(line, RowIssue::EmptyField(Field::Ip));
        }
        if mac_raw.is_empty() {
            return self.note(line, RowIssue::EmptyField(Field::HardwareAddress));
        }
        let Some(ip_address) = ip::parse_ipv4(ip_raw) else {
            return self.note(line, RowIssue::InvalidIp(ip_raw.to_string()));
        };
        let Some(hardware_address) = mac::parse_mac(mac_raw).map(|m| m.to_string()) else {
            return self.note(line, RowIssue::InvalidMac(mac_raw.to_string()));
        };
        if excluded == Some(ip_address) {
            return self.note(line, RowIssue::ExcludedIp(ip_address));
        }

        let lease_timestamp = match raw.timestamp.map(str::trim) {
            None | Some("") => 0,
            Some(ts) => ts.parse::<i64>().unwrap_or_else(|_| {
                self.note(line, RowIssue::BadTimestamp(ts.to_string()));
                0
            }),
        };

        self.records.push(LeaseRecord {
            ip_address,
            hardware_address,
            client_identifier: non_empty(raw.client_identifier).map(mac::normalize),
            hostname: non_empty(raw.hostname).map(str::to_string),
            lease_timestamp,
        });
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Reads a lease source into memory.
///
/// A missing file and a file holding only whitespace are both
/// [`PipelineError::SourceMissing`]: a DHCP server that has not handed out a
/// lease yet may legitimately leave either behind.
pub fn read_source(path: &Path) -> Result<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let content = String::from_utf8_lossy(&bytes).into_owned();
            if content.trim().is_empty() {
                return Err(PipelineError::SourceMissing { path: path.to_path_buf() });
            }
            Ok(content)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(PipelineError::SourceMissing { path: path.to_path_buf() })
        }
        Err(source) => Err(PipelineError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Picks the parser for `content` by looking at its first meaningful line.
pub fn detect_format(content: &str) -> LeaseFormat {
    let first = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'));

    match first {
        Some(line) if freetext::is_preamble(line) => LeaseFormat::FreeText,
        _ => LeaseFormat::Delimited,
    }
}

/// Parses already-loaded lease content.
pub fn parse(content: &str, excluded: Option<Ipv4Addr>) -> Result<ParseReport> {
    match detect_format(content) {
        LeaseFormat::Delimited => parser::parse_delimited(content, excluded),
        LeaseFormat::FreeText => Ok(freetext::parse_freetext(content, excluded)),
    }
}

/// Reads and parses the lease source at `path`.
pub fn load(path: &Path, excluded: Option<Ipv4Addr>) -> Result<ParseReport> {
    let content = read_source(path)?;
    parse(&content, excluded)
}
