pub mod assign;
pub mod classify;
pub mod generate;
pub mod pool;
pub mod serve;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use ztpinv_common::config::{
    Config, Credentials, DEFAULT_EXCLUDED_IP, DEFAULT_INVENTORY_PATH, DEFAULT_LEASES_PATH,
    DEFAULT_OUI_PATH, DEFAULT_ZTP_LOG_PATH, RetryPolicy,
};

#[derive(Parser)]
#[command(name = "ztpinv")]
#[command(about = "Turns DHCP leases into a per-vendor device inventory.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Log more detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings, errors and results
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the inventory from the lease source
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Assign a ZTP profile to the most recently leased device
    #[command(alias = "a")]
    Assign(AssignArgs),
    /// Show which vendor a MAC address (and client identifier) classifies as
    #[command(alias = "c")]
    Classify(ClassifyArgs),
    /// Compute the DHCP pool for the provisioning interface
    #[command(alias = "p")]
    Pool(PoolArgs),
    /// Serve the inventory and raw leases as JSON
    #[command(alias = "s")]
    Serve(ServeArgs),
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Args, Debug, Clone)]
pub struct LeaseArgs {
    /// Lease source (Kea CSV, headerless CSV or ISC lease log)
    #[arg(long, env = "ZTPINV_LEASES", default_value = DEFAULT_LEASES_PATH)]
    pub leases: PathBuf,

    /// Address never written to the inventory, usually the router
    #[arg(long, default_value_t = DEFAULT_EXCLUDED_IP)]
    pub exclude: Ipv4Addr,

    /// Keep every address, including the excluded one
    #[arg(long)]
    pub no_exclude: bool,
}

impl LeaseArgs {
    fn apply(&self, cfg: &mut Config) {
        cfg.leases_path = self.leases.clone();
        cfg.excluded_ip = (!self.no_exclude).then_some(self.exclude);
    }
}

#[derive(Args, Debug, Clone)]
pub struct VendorArgs {
    /// IEEE OUI reference file (oui.txt)
    #[arg(long, env = "ZTPINV_OUI_DB", default_value = DEFAULT_OUI_PATH)]
    pub oui_db: PathBuf,

    /// Extra OUI override, e.g. 00:1c:73=arista (repeatable)
    #[arg(long = "override", value_name = "OUI=VENDOR", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,
}

impl VendorArgs {
    fn apply(&self, cfg: &mut Config) {
        cfg.oui_path = self.oui_db.clone();
        cfg.vendor_overrides = self.overrides.clone();
    }
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((oui, vendor)) if !oui.trim().is_empty() && !vendor.trim().is_empty() => {
            Ok((oui.trim().to_string(), vendor.trim().to_string()))
        }
        _ => Err(format!("expected OUI=VENDOR, got {raw:?}")),
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub lease: LeaseArgs,

    #[command(flatten)]
    pub vendors: VendorArgs,

    /// Inventory artifact to replace
    #[arg(long, env = "ZTPINV_INVENTORY", default_value = DEFAULT_INVENTORY_PATH)]
    pub inventory: PathBuf,

    /// Default user written next to every host
    #[arg(long, default_value = "admin")]
    pub user: String,

    /// Default password written next to every host
    #[arg(long, env = "ZTPINV_PASSWORD", hide_env_values = true, default_value = "admin")]
    pub password: String,

    /// Attempts before giving up while no leases are available
    #[arg(long, default_value_t = 1)]
    pub attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,
}

impl From<&GenerateArgs> for Config {
    fn from(args: &GenerateArgs) -> Self {
        let mut cfg = Config {
            inventory_path: args.inventory.clone(),
            credentials: Credentials {
                user: args.user.clone(),
                password: args.password.clone(),
            },
            retry: RetryPolicy::new(args.attempts, Duration::from_secs(args.retry_delay)),
            ..Config::default()
        };
        args.lease.apply(&mut cfg);
        args.vendors.apply(&mut cfg);
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct AssignArgs {
    #[command(flatten)]
    pub lease: LeaseArgs,

    #[command(flatten)]
    pub vendors: VendorArgs,

    /// Append-only log of assignments
    #[arg(long, env = "ZTPINV_ZTP_LOG", default_value = DEFAULT_ZTP_LOG_PATH)]
    pub ztp_log: PathBuf,
}

impl From<&AssignArgs> for Config {
    fn from(args: &AssignArgs) -> Self {
        let mut cfg = Config {
            ztp_log_path: args.ztp_log.clone(),
            ..Config::default()
        };
        args.lease.apply(&mut cfg);
        args.vendors.apply(&mut cfg);
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Hardware address of the device
    pub mac: String,

    /// DHCP client identifier sent by the device
    #[arg(long)]
    pub client_id: Option<String>,

    #[command(flatten)]
    pub vendors: VendorArgs,
}

impl From<&ClassifyArgs> for Config {
    fn from(args: &ClassifyArgs) -> Self {
        let mut cfg = Config::default();
        args.vendors.apply(&mut cfg);
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct PoolArgs {
    /// Interface the DHCP server listens on
    #[arg(default_value = "br0")]
    pub interface: String,

    /// Use this address instead of reading the interface
    #[arg(long, requires = "netmask")]
    pub ip: Option<Ipv4Addr>,

    #[arg(long, requires = "ip")]
    pub netmask: Option<Ipv4Addr>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    #[arg(long, env = "ZTPINV_LEASES", default_value = DEFAULT_LEASES_PATH)]
    pub leases: PathBuf,

    #[arg(long, env = "ZTPINV_INVENTORY", default_value = DEFAULT_INVENTORY_PATH)]
    pub inventory: PathBuf,
}
