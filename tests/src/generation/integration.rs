#![cfg(test)]
use std::fs;
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ztpinv_common::config::{Config, Credentials, RetryPolicy};
use ztpinv_common::error::PipelineError;
use ztpinv_core::pipeline::{LogObserver, Pipeline};

fn config(dir: &Path) -> Config {
    Config {
        leases_path: dir.join("kea-leases4.csv"),
        inventory_path: dir.join("ansible_inventory").join("hosts"),
        oui_path: dir.join("oui.txt"),
        ztp_log_path: dir.join("ztp.log"),
        retry: RetryPolicy::new(1, Duration::ZERO),
        ..Config::default()
    }
}

fn generate(cfg: &Config) -> Result<String, PipelineError> {
    Pipeline::new(cfg.clone()).run(&LogObserver)?;
    Ok(fs::read_to_string(&cfg.inventory_path).unwrap())
}

/// Two leases of the same switch collapse to the newest address.
#[test]
fn headered_source_keeps_the_latest_lease() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(
        &cfg.leases_path,
        "address,hwaddr,client_id,valid_lifetime,lease_time\n\
         10.0.0.5,00:1A:1E:AA:BB:CC,,3600,100\n\
         10.0.0.6,00:1A:1E:AA:BB:CC,,3600,200\n",
    )
    .unwrap();

    assert_eq!(
        generate(&cfg).unwrap(),
        "[cisco]\n10.0.0.6 ansible_user=admin ansible_password=admin\n\n"
    );
}

#[test]
fn excluded_address_never_reaches_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(
        &cfg.leases_path,
        "address,hwaddr,client_id,valid_lifetime,lease_time\n\
         192.168.100.1,00:1c:73:00:00:99,,3600,500\n\
         10.0.0.8,00:1b:21:00:00:01,,3600,100\n",
    )
    .unwrap();

    let written = generate(&cfg).unwrap();

    assert!(!written.contains("192.168.100.1"));
    assert!(!written.contains("[arista]"));
    assert_eq!(written, "[juniper]\n10.0.0.8 ansible_user=admin ansible_password=admin\n\n");
}

#[test]
fn empty_source_fails_after_retries_and_keeps_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        retry: RetryPolicy::new(3, Duration::from_millis(1)),
        ..config(dir.path())
    };
    fs::write(&cfg.leases_path, "\n\n").unwrap();
    fs::create_dir_all(cfg.inventory_path.parent().unwrap()).unwrap();
    fs::write(&cfg.inventory_path, "[previous]\n10.9.9.9\n\n").unwrap();

    let err = Pipeline::new(cfg.clone()).run(&LogObserver).unwrap_err();

    assert!(matches!(err, PipelineError::SourceMissing { .. }));
    assert_eq!(fs::read_to_string(&cfg.inventory_path).unwrap(), "[previous]\n10.9.9.9\n\n");
}

#[test]
fn missing_source_never_creates_an_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());

    let err = Pipeline::new(cfg.clone()).run(&LogObserver).unwrap_err();

    assert!(matches!(err, PipelineError::SourceMissing { .. }));
    assert!(!cfg.inventory_path.exists());
}

/// A switch announcing its platform in the client identifier is grouped by
/// that name even when its hardware OUI belongs to someone else.
#[test]
fn client_id_payload_beats_the_hardware_oui() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(
        &cfg.leases_path,
        "address,hwaddr,client_id,valid_lifetime,lease_time\n\
         10.0.0.7,00:1a:1e:00:00:07,61:72:69:73:74:61:2d:37:30:35:30,3600,100\n",
    )
    .unwrap();

    assert_eq!(
        generate(&cfg).unwrap(),
        "[arista]\n10.0.0.7 ansible_user=admin ansible_password=admin\n\n"
    );
}

#[test]
fn reference_table_names_unlisted_vendors() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(&cfg.oui_path, "AC-DE-48   (hex)\t\tPrivate Switch Co\nACDE48     (base 16)\t\tPrivate Switch Co\n").unwrap();
    fs::write(
        &cfg.leases_path,
        "address,hwaddr\n10.0.0.10,ac:de:48:00:11:22\n10.0.0.11,de:ad:be:ef:00:01\n",
    )
    .unwrap();

    assert_eq!(
        generate(&cfg).unwrap(),
        "[Private Switch Co]\n10.0.0.10 ansible_user=admin ansible_password=admin\n\n\
         [unknown]\n10.0.0.11 ansible_user=admin ansible_password=admin\n\n"
    );
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(
        &cfg.leases_path,
        "address,hwaddr,client_id,valid_lifetime,expire\n\
         10.0.0.5,00:1a:1e:aa:bb:cc,,3600,10\n\
         10.0.0.6,00:1c:73:00:00:01,,3600,20\n\
         10.0.0.7,00:1b:21:00:00:01,,3600,30\n\
         10.0.0.8,00:1a:1e:aa:bb:cd,,3600,40\n",
    )
    .unwrap();

    let first = generate(&cfg).unwrap();
    let second = generate(&cfg).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first,
        "[cisco]\n\
         10.0.0.5 ansible_user=admin ansible_password=admin\n\
         10.0.0.8 ansible_user=admin ansible_password=admin\n\n\
         [arista]\n\
         10.0.0.6 ansible_user=admin ansible_password=admin\n\n\
         [juniper]\n\
         10.0.0.7 ansible_user=admin ansible_password=admin\n\n"
    );
}

#[test]
fn one_line_per_distinct_valid_hardware_address() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        credentials: Credentials {
            user: "ztp".into(),
            password: "ztp".into(),
        },
        ..config(dir.path())
    };
    fs::write(
        &cfg.leases_path,
        "address,hwaddr,client_id,valid_lifetime,lease_time\n\
         10.0.0.5,00:1a:1e:aa:bb:01,,3600,1\n\
         10.0.0.6,00:1A:1E:AA:BB:01,,3600,2\n\
         10.0.0.7,00-1a-1e-aa-bb-01,,3600,3\n\
         10.0.0.8,00:1a:1e:aa:bb:02,,3600,1\n\
         not-an-ip,00:1a:1e:aa:bb:03,,3600,1\n\
         10.0.0.9,,,3600,1\n\
         10.0.0.10,n/a,,3600,1\n\
         10.0.0.11,00:1a,,3600,1\n",
    )
    .unwrap();

    let written = generate(&cfg).unwrap();
    let hosts: Vec<&str> = written.lines().filter(|l| l.starts_with("10.")).collect();

    assert_eq!(
        hosts,
        [
            "10.0.0.7 ansible_user=ztp ansible_password=ztp",
            "10.0.0.8 ansible_user=ztp ansible_password=ztp",
        ]
    );
}

#[test]
fn headerless_rows_use_default_positions() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(
        &cfg.leases_path,
        "10.0.0.20,00:1b:21:00:00:20,,3600,100,0,0,0,edge-1\n\
         10.0.0.21,00:1b:21:00:00:20,,3600,50,0,0,0,edge-1\n",
    )
    .unwrap();

    assert_eq!(
        generate(&cfg).unwrap(),
        "[juniper]\n10.0.0.20 ansible_user=admin ansible_password=admin\n\n"
    );
}

#[test]
fn isc_lease_log_is_understood() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        leases_path: dir.path().join("dhcpd.leases"),
        ..config(dir.path())
    };
    fs::write(
        &cfg.leases_path,
        "# The format of this file is documented in the dhcpd.leases(5) manual page.\n\
         lease 10.0.0.30 {\n  starts 4 2024/01/04 10:00:00;\n  hardware ethernet 00:1b:21:00:00:30;\n}\n\
         lease 10.0.0.31 {\n  starts 4 2024/01/04 11:00:00;\n  hardware ethernet 00:aa:bb:00:00:31;\n  uid \"61:72:69:73:74:61:2d:31\";\n}\n",
    )
    .unwrap();

    assert_eq!(
        generate(&cfg).unwrap(),
        "[juniper]\n10.0.0.30 ansible_user=admin ansible_password=admin\n\n\
         [arista]\n10.0.0.31 ansible_user=admin ansible_password=admin\n\n"
    );
}

#[test]
fn unknown_header_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(&cfg.leases_path, "mac,ip\n00:1a:1e:aa:bb:cc,10.0.0.5\n").unwrap();

    let err = generate(&cfg).unwrap_err();
    assert!(matches!(err, PipelineError::SchemaUnresolvable { .. }));
}
