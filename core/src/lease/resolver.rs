//! Collapses lease history into one authoritative lease per device.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::LeaseRecord;

/// The most recent lease of one hardware address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
    pub ip_address: Ipv4Addr,
    pub hardware_address: String,
    pub client_identifier: Option<String>,
    pub hostname: Option<String>,
    pub lease_timestamp: i64,
}

impl From<LeaseRecord> for ResolvedDevice {
    fn from(record: LeaseRecord) -> Self {
        Self {
            ip_address: record.ip_address,
            hardware_address: record.hardware_address,
            client_identifier: record.client_identifier,
            hostname: record.hostname,
            lease_timestamp: record.lease_timestamp,
        }
    }
}

/// `candidate` replaces `current` unless it is strictly older. Ties go to the later row.
fn supersedes(candidate: &LeaseRecord, current: &LeaseRecord) -> bool {
    candidate.lease_timestamp >= current.lease_timestamp
}

/// One device per distinct hardware address, in first-seen order.
pub fn resolve(records: Vec<LeaseRecord>) -> Vec<ResolvedDevice> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut winners: Vec<LeaseRecord> = Vec::new();

    for record in records {
        match slots.get(&record.hardware_address) {
            Some(&slot) => {
                if supersedes(&record, &winners[slot]) {
                    winners[slot] = record;
                }
            }
            None => {
                slots.insert(record.hardware_address.clone(), winners.len());
                winners.push(record);
            }
        }
    }

    winners.into_iter().map(ResolvedDevice::from).collect()
}

/// The single most recent lease in the source, by the same rule as [`resolve`].
pub fn latest(records: &[LeaseRecord]) -> Option<&LeaseRecord> {
    records.iter().fold(None, |best, record| match best {
        Some(current) if !supersedes(record, current) => Some(current),
        _ => Some(record),
    })
}
