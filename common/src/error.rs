use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Source-level and write-level failures of a generation run.
///
/// Row-level problems never show up here, they are reported as diagnostics
/// alongside the parsed records.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The file does not exist or holds nothing but whitespace.
    #[error("lease source {} is missing or empty", path.display())]
    SourceMissing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot determine lease columns: {reason}")]
    SchemaUnresolvable { reason: String },

    /// The source parsed fine but no device survived filtering.
    #[error("no usable DHCP leases found in {}", path.display())]
    NoLeases { path: PathBuf },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Whether waiting and trying again could change the outcome.
    ///
    /// A missing or empty source may be filled by the DHCP server soon; a
    /// malformed header or an unwritable target will not fix itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceMissing { .. } | Self::NoLeases { .. })
    }
}
