//! ISC-style lease logs.
//!
//! ```text
//! lease 10.0.0.5 {
//!   starts 4 2024/01/04 10:00:00;
//!   hardware ethernet 00:1a:1e:aa:bb:cc;
//!   uid "01:00:1a:1e:aa:bb:cc";
//!   client-hostname "sw1";
//! }
//! ```
//!
//! Blocks are introduced by a `lease <ip> {` marker line. Unknown statements
//! inside a block are ignored, as is anything after a statement's `;` or a `#`.
//!
//! Both `starts <weekday> YYYY/MM/DD HH:MM:SS` (UTC) and `starts epoch N` end
//! up as Unix seconds, so the two spellings compare correctly in one file.

use std::net::Ipv4Addr;

use chrono::NaiveDateTime;

use super::{LeaseFormat, ParseReport, RawLease, RowIssue};

const PREAMBLE_KEYWORDS: &[&str] = &["lease ", "authoring-byte-order", "server-duid"];

/// True for the first meaningful line of a free-text lease log.
pub fn is_preamble(line: &str) -> bool {
    PREAMBLE_KEYWORDS.iter().any(|kw| line.starts_with(kw))
}

#[derive(Default)]
struct Block {
    line: usize,
    ip: String,
    hardware_address: String,
    client_identifier: Option<String>,
    hostname: Option<String>,
    timestamp: Option<String>,
}

impl Block {
    fn open(line: usize, ip: &str) -> Self {
        Self {
            line,
            ip: ip.to_string(),
            ..Self::default()
        }
    }

    fn statement(&mut self, stmt: &str) {
        let mut words = stmt.split_whitespace();
        match (words.next(), words.next()) {
            (Some("hardware"), Some(_kind)) => {
                self.hardware_address = words.next().unwrap_or_default().to_string();
            }
            (Some("uid"), Some(uid)) => self.client_identifier = Some(unquote(uid)),
            (Some("client-hostname"), Some(name)) => self.hostname = Some(unquote(name)),
            (Some("starts"), Some(first)) => {
                let rest: Vec<&str> = words.collect();
                self.timestamp = Some(starts_to_timestamp(first, &rest));
            }
            _ => {}
        }
    }

    fn close(self, report: &mut ParseReport, excluded: Option<Ipv4Addr>) {
        let raw = RawLease {
            ip: &self.ip,
            hardware_address: &self.hardware_address,
            client_identifier: self.client_identifier.as_deref(),
            hostname: self.hostname.as_deref(),
            timestamp: self.timestamp.as_deref(),
        };
        report.admit(self.line, raw, excluded);
    }
}

/// Parses every `lease { ... }` block in source order.
pub fn parse_freetext(content: &str, excluded: Option<Ipv4Addr>) -> ParseReport {
    let mut report = ParseReport::new(LeaseFormat::FreeText);
    let mut current: Option<Block> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("lease ") {
            if let Some(open) = current.take() {
                report.rows_seen += 1;
                report.note(open.line, RowIssue::Unterminated);
            }
            let ip = rest.trim_end_matches('{').trim();
            current = Some(Block::open(line_no, ip));
            continue;
        }

        if line.starts_with('}') {
            if let Some(block) = current.take() {
                block.close(&mut report, excluded);
            }
            continue;
        }

        if let Some(block) = current.as_mut() {
            block.statement(statement_body(line));
        }
    }

    if let Some(open) = current {
        report.rows_seen += 1;
        report.note(open.line, RowIssue::Unterminated);
    }

    report
}

/// The text of a statement before its `;` or a trailing comment. Quoted text is kept whole.
fn statement_body(line: &str) -> &str {
    let mut quoted = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' | '#' if !quoted => return line[..idx].trim_end(),
            _ => {}
        }
    }
    line.trim_end()
}

fn unquote(raw: &str) -> String {
    raw.trim_matches('"').to_string()
}

const STARTS_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// `starts 4 2024/01/04 10:00:00` and `starts epoch 1704362400` both become `1704362400`.
///
/// Anything else is returned verbatim so the row is kept with a timestamp of
/// `0` and a diagnostic.
fn starts_to_timestamp(first: &str, rest: &[&str]) -> String {
    if first == "epoch" {
        return rest.first().copied().unwrap_or_default().to_string();
    }
    match rest {
        [date, time, ..] => {
            let stamp = format!("{date} {time}");
            NaiveDateTime::parse_from_str(&stamp, STARTS_FORMAT)
                .map(|dt| dt.and_utc().timestamp().to_string())
                .unwrap_or(stamp)
        }
        _ => std::iter::once(first).chain(rest.iter().copied()).collect::<Vec<_>>().join(" "),
    }
}
