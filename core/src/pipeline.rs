//! # Generation Orchestrator
//!
//! Drives one inventory generation end to end:
//! lease source → parsed records → resolved devices → classified devices → artifact.
//!
//! When the source is missing, empty, or yields no usable device, the run can
//! wait and retry a bounded number of times. Devices that are still booting
//! may not have requested a lease yet when the pipeline is triggered.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use ztpinv_common::config::Config;
use ztpinv_common::error::{PipelineError, Result};

use crate::inventory::{ClassifiedDevice, Inventory};
use crate::lease::{self, diagnostics, resolver};
use crate::lease::resolver::ResolvedDevice;
use crate::vendors::{DeviceIdentity, VendorClassifier};

/// Notified before the orchestrator sleeps between attempts.
pub trait RetryObserver {
    fn waiting(&self, next_attempt: u32, max_attempts: u32, delay: Duration, cause: &PipelineError);
}

/// Logs the wait and nothing else.
pub struct LogObserver;

impl RetryObserver for LogObserver {
    fn waiting(&self, next_attempt: u32, max_attempts: u32, delay: Duration, cause: &PipelineError) {
        warn!(
            "{cause}; retrying in {:.1}s (attempt {next_attempt}/{max_attempts})",
            delay.as_secs_f64()
        );
    }
}

/// Result of one successful attempt, before anything is written.
#[derive(Debug, Clone)]
pub struct Collected {
    pub inventory: Inventory,
    pub rows_seen: usize,
    pub admitted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u32,
    pub devices: usize,
    /// Device count per vendor, in inventory order.
    pub vendors: Vec<(String, usize)>,
    pub rows_seen: usize,
    pub admitted: usize,
    pub skipped: usize,
}

pub struct Pipeline {
    config: Config,
    classifier: VendorClassifier,
}

impl Pipeline {
    /// Loads the OUI tables described by `config`.
    pub fn new(config: Config) -> Self {
        let classifier = VendorClassifier::from_config(&config);
        Self { config, classifier }
    }

    pub fn with_classifier(config: Config, classifier: VendorClassifier) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &VendorClassifier {
        &self.classifier
    }

    /// Attaches a vendor to every device.
    pub fn classify(&self, devices: Vec<ResolvedDevice>) -> Vec<ClassifiedDevice> {
        devices
            .into_iter()
            .map(|device| {
                let classification = self.classifier.classify(&DeviceIdentity {
                    hardware_address: &device.hardware_address,
                    client_identifier: device.client_identifier.as_deref(),
                });
                debug!(
                    "{} ({}) -> {} via {}",
                    device.hardware_address, device.ip_address, classification.vendor, classification.layer
                );
                ClassifiedDevice {
                    device,
                    vendor: classification.vendor,
                }
            })
            .collect()
    }

    /// One pass over the lease source. Nothing is written.
    pub fn collect(&self) -> Result<Collected> {
        let report = lease::load(&self.config.leases_path, self.config.excluded_ip)?;
        diagnostics::emit(&report);

        let rows_seen = report.rows_seen;
        let skipped = report.skipped();
        let admitted = report.records.len();

        let devices = resolver::resolve(report.records);
        if devices.is_empty() {
            return Err(PipelineError::NoLeases {
                path: self.config.leases_path.clone(),
            });
        }
        for device in &devices {
            info!("Lease found: {} -> {}", device.hardware_address.to_uppercase(), device.ip_address);
        }

        Ok(Collected {
            inventory: Inventory::build(self.classify(devices)),
            rows_seen,
            admitted,
            skipped,
        })
    }

    /// Collects with retries, then replaces the inventory artifact.
    ///
    /// The artifact is only touched once a non-empty inventory exists, so any
    /// failure leaves the previous artifact as it was.
    pub fn run(&self, observer: &dyn RetryObserver) -> Result<RunSummary> {
        let policy = self.config.retry;
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        let collected = loop {
            match self.collect() {
                Ok(collected) => break collected,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    attempt += 1;
                    observer.waiting(attempt, max_attempts, policy.delay, &e);
                    thread::sleep(policy.delay);
                }
                Err(e) => return Err(e),
            }
        };

        collected
            .inventory
            .write_to(&self.config.inventory_path, &self.config.credentials)?;
        info!(
            "Inventory with {} device(s) written to {}",
            collected.inventory.device_count(),
            self.config.inventory_path.display()
        );

        Ok(RunSummary {
            attempts: attempt,
            devices: collected.inventory.device_count(),
            vendors: collected
                .inventory
                .groups()
                .iter()
                .map(|g| (g.vendor.clone(), g.devices.len()))
                .collect(),
            rows_seen: collected.rows_seen,
            admitted: collected.admitted,
            skipped: collected.skipped,
        })
    }
}
