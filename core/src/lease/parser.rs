use std::net::Ipv4Addr;

use csv::{ReaderBuilder, StringRecord, Trim};
use ztpinv_common::error::{PipelineError, Result};

use super::schema::{self, LeaseSchema};
use super::{LeaseFormat, ParseReport, RawLease, RowIssue};

/// Parses a delimited (CSV) lease source.
///
/// The first record decides the [`LeaseSchema`]. Rows that are too short or
/// fail validation are skipped with a diagnostic; only an unresolvable schema
/// or a source without a single record is fatal.
pub fn parse_delimited(content: &str, excluded: Option<Ipv4Addr>) -> Result<ParseReport> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = reader.records();
    let first: StringRecord = match rows.next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => {
            return Err(PipelineError::SchemaUnresolvable {
                reason: format!("first row cannot be read: {e}"),
            });
        }
        None => {
            return Err(PipelineError::SchemaUnresolvable {
                reason: "source has no rows".to_string(),
            });
        }
    };

    let fields: Vec<&str> = first.iter().collect();
    let schema = schema::resolve(&fields)?;
    let mut report = ParseReport::new(LeaseFormat::Delimited);

    if !schema.has_header {
        admit_row(&mut report, &schema, &first, excluded);
    }

    for row in rows {
        match row {
            Ok(record) => admit_row(&mut report, &schema, &record, excluded),
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or_default();
                report.rows_seen += 1;
                report.note(line, RowIssue::Unreadable(e.to_string()));
            }
        }
    }

    Ok(report)
}

fn admit_row(
    report: &mut ParseReport,
    schema: &LeaseSchema,
    record: &StringRecord,
    excluded: Option<Ipv4Addr>,
) {
    let line = record.position().map(|p| p.line() as usize).unwrap_or_default();

    if record.len() < schema.required_len() {
        report.rows_seen += 1;
        report.note(
            line,
            RowIssue::ShortRow {
                len: record.len(),
                required: schema.required_len(),
            },
        );
        return;
    }

    let raw = RawLease {
        ip: record.get(schema.ip).unwrap_or_default(),
        hardware_address: record.get(schema.hardware_address).unwrap_or_default(),
        client_identifier: record.get(schema.client_identifier),
        hostname: schema.hostname.and_then(|idx| record.get(idx)),
        timestamp: record.get(schema.timestamp),
    };
    report.admit(line, raw, excluded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease::Field;

    const KEA: &str = "\
address,hwaddr,client_id,valid_lifetime,expire,subnet_id,fqdn_fwd,fqdn_rev,hostname,state
10.0.0.5,00:1A:1E:AA:BB:CC,,3600,100,1,0,0,sw1,0
10.0.0.6,00-1a-1e-aa-bb-cc,,3600,200,1,0,0,sw1,0
10.0.0.7,00:1c:73:00:00:01,61:72:69:73:74:61:2d:65:6f:73,3600,150,1,0,0,,0
";

    #[test]
    fn parses_kea_rows_in_order() {
        let report = parse_delimited(KEA, None).unwrap();

        assert_eq!(report.format, LeaseFormat::Delimited);
        assert_eq!(report.rows_seen, 3);
        let ips: Vec<String> = report.records.iter().map(|r| r.ip_address.to_string()).collect();
        assert_eq!(ips, ["10.0.0.5", "10.0.0.6", "10.0.0.7"]);
        assert_eq!(report.records[1].hardware_address, "00:1a:1e:aa:bb:cc");
        assert_eq!(report.records[1].lease_timestamp, 200);
        assert_eq!(report.records[0].hostname.as_deref(), Some("sw1"));
        assert_eq!(report.records[0].client_identifier, None);
        assert_eq!(
            report.records[2].client_identifier.as_deref(),
            Some("61:72:69:73:74:61:2d:65:6f:73")
        );
    }

    #[test]
    fn headerless_source_keeps_first_row() {
        let content = "10.0.0.5,00:1a:1e:aa:bb:cc,,3600,100\n10.0.0.8,00:1b:21:00:00:01\n";
        let report = parse_delimited(content, None).unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].lease_timestamp, 100);
        assert_eq!(report.records[1].lease_timestamp, 0);
    }

    #[test]
    fn short_and_invalid_rows_are_skipped_not_fatal() {
        let content = "\
address,hwaddr,client_id,lease_duration,lease_time
10.0.0.5
,00:1a:1e:aa:bb:cc,,,1
10.0.0.9,00:1a:1e:aa:bb:cd,,,soon
192.168.100.1,00:1a:1e:aa:bb:ce,,,5
";
        let report = parse_delimited(content, Some(Ipv4Addr::new(192, 168, 100, 1))).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].ip_address, Ipv4Addr::new(10, 0, 0, 9));
        assert_eq!(report.rows_seen, 4);
        assert_eq!(report.skipped(), 3);

        let issues: Vec<&RowIssue> = report.diagnostics.iter().map(|d| &d.issue).collect();
        assert_eq!(
            issues,
            [
                &RowIssue::ShortRow { len: 1, required: 2 },
                &RowIssue::EmptyField(Field::Ip),
                &RowIssue::BadTimestamp("soon".into()),
                &RowIssue::ExcludedIp(Ipv4Addr::new(192, 168, 100, 1)),
            ]
        );
        assert_eq!(report.diagnostics[0].line, 2);
    }

    #[test]
    fn legacy_header_without_timestamp_column() {
        let content = "ame,hwaddr,user_context,pool_id\n10.0.0.5,00:1b:21:aa:bb:cc,,0\n";
        let report = parse_delimited(content, None).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].lease_timestamp, 0);
    }

    #[test]
    fn unknown_header_is_fatal() {
        let err = parse_delimited("mac,ip\n00:1a:1e:aa:bb:cc,10.0.0.5\n", None).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaUnresolvable { .. }));
    }
}
