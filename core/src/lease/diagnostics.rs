use tracing::{debug, warn};

use super::{ParseReport, RowIssue};

/// Writes the row-level outcomes of a parse to the log.
///
/// Excluded addresses are expected on every run and only show up at debug level.
pub fn emit(report: &ParseReport) {
    for diagnostic in &report.diagnostics {
        match diagnostic.issue {
            RowIssue::ExcludedIp(_) => debug!("line {}: {}", diagnostic.line, diagnostic.issue),
            _ => warn!("line {}: {}", diagnostic.line, diagnostic.issue),
        }
    }

    debug!(
        "{} source: {} row(s) seen, {} admitted, {} skipped",
        report.format,
        report.rows_seen,
        report.records.len(),
        report.skipped()
    );
}
