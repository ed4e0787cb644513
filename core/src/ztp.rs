//! ZTP profile assignment for the most recently leased device.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::Path;

use tracing::info;
use ztpinv_common::error::{PipelineError, Result};

use crate::lease::{self, diagnostics, resolver};
use crate::pipeline::Pipeline;

pub const DEFAULT_PROFILE: &str = "default-ztp.cfg";

/// Vendor prefix → configuration file served to the device.
const PROFILES: &[(&str, &str)] = &[("arista", "arista_eos.conf"), ("cisco", "ztp-config")];

/// Picks the ZTP configuration file for a vendor label.
///
/// Matches on the start of the label, so reference-file names such as
/// `Arista Networks` map like the override label `arista`.
pub fn profile_for(vendor: &str) -> &'static str {
    let vendor = vendor.to_lowercase();
    PROFILES
        .iter()
        .find(|(prefix, _)| vendor.starts_with(*prefix))
        .map(|(_, profile)| *profile)
        .unwrap_or(DEFAULT_PROFILE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZtpAssignment {
    pub hardware_address: String,
    pub ip_address: Ipv4Addr,
    pub vendor: String,
    pub profile: &'static str,
}

impl fmt::Display for ZtpAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAC: {}, IP: {}, Vendor: {}, Config: {}",
            self.hardware_address, self.ip_address, self.vendor, self.profile
        )
    }
}

/// Classifies the latest lease of the configured source and logs its profile.
pub fn assign_latest(pipeline: &Pipeline) -> Result<ZtpAssignment> {
    let config = pipeline.config();
    let report = lease::load(&config.leases_path, config.excluded_ip)?;
    diagnostics::emit(&report);

    let latest = resolver::latest(&report.records).ok_or_else(|| PipelineError::NoLeases {
        path: config.leases_path.clone(),
    })?;

    let vendor = pipeline
        .classifier()
        .vendor_of(&latest.hardware_address, latest.client_identifier.as_deref());
    let assignment = ZtpAssignment {
        hardware_address: latest.hardware_address.clone(),
        ip_address: latest.ip_address,
        profile: profile_for(&vendor),
        vendor,
    };

    append_log(&config.ztp_log_path, &assignment)?;
    info!("ZTP config assigned: {} for {} ({})", assignment.profile, assignment.vendor, assignment.ip_address);
    Ok(assignment)
}

/// Appends one assignment line to the ZTP log.
pub fn append_log(path: &Path, assignment: &ZtpAssignment) -> Result<()> {
    let failure = |source| PipelineError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(failure)?;
    writeln!(file, "{assignment}").map_err(failure)
}
