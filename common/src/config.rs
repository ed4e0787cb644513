use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LEASES_PATH: &str = "/var/lib/kea/kea-leases4.csv";
pub const DEFAULT_INVENTORY_PATH: &str = "/ansible_inventory/hosts";
pub const DEFAULT_OUI_PATH: &str = "/usr/share/ieee-data/oui.txt";
pub const DEFAULT_ZTP_LOG_PATH: &str = "/var/log/ztp.log";
pub const DEFAULT_EXCLUDED_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 100, 1);

/// Hand-maintained OUI overrides. These always win over the reference file.
pub const BUILTIN_OVERRIDES: &[(&str, &str)] = &[
    ("00:1a:1e", "cisco"),
    ("00:1b:21", "juniper"),
    ("00:1c:73", "arista"),
];

/// Everything one generation run needs to know about its surroundings.
///
/// Built once by the front-end and passed into the pipeline; nothing in the
/// library reads paths or constants from anywhere else.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lease source (Kea CSV, headerless CSV or ISC lease log).
    pub leases_path: PathBuf,
    /// Inventory artifact, fully replaced on every successful run.
    pub inventory_path: PathBuf,
    /// Offline IEEE OUI reference file. A missing file is tolerated.
    pub oui_path: PathBuf,
    /// Usually the router of the provisioning network. Never written to the inventory.
    pub excluded_ip: Option<Ipv4Addr>,
    pub credentials: Credentials,
    pub retry: RetryPolicy,
    /// Extra `(oui, vendor)` pairs appended after [`BUILTIN_OVERRIDES`].
    pub vendor_overrides: Vec<(String, String)>,
    /// Append-only log of ZTP profile assignments.
    pub ztp_log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leases_path: PathBuf::from(DEFAULT_LEASES_PATH),
            inventory_path: PathBuf::from(DEFAULT_INVENTORY_PATH),
            oui_path: PathBuf::from(DEFAULT_OUI_PATH),
            excluded_ip: Some(DEFAULT_EXCLUDED_IP),
            credentials: Credentials::default(),
            retry: RetryPolicy::default(),
            vendor_overrides: Vec::new(),
            ztp_log_path: PathBuf::from(DEFAULT_ZTP_LOG_PATH),
        }
    }
}

impl Config {
    /// Built-in overrides followed by the configured ones.
    pub fn override_pairs(&self) -> Vec<(String, String)> {
        BUILTIN_OVERRIDES
            .iter()
            .map(|(oui, vendor)| (oui.to_string(), vendor.to_string()))
            .chain(self.vendor_overrides.iter().cloned())
            .collect()
    }
}

/// Default access credentials written next to every inventory host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user: String::from("admin"),
            password: String::from("admin"),
        }
    }
}

/// Bounded retry used while waiting for devices to obtain their first lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(5))
    }
}
