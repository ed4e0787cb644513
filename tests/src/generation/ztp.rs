#![cfg(test)]
use std::fs;
use std::net::Ipv4Addr;

use ztpinv_common::config::Config;
use ztpinv_core::pipeline::Pipeline;
use ztpinv_core::ztp;

#[test]
fn newest_lease_gets_its_vendor_profile() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        leases_path: dir.path().join("leases.csv"),
        oui_path: dir.path().join("oui.txt"),
        ztp_log_path: dir.path().join("ztp.log"),
        ..Config::default()
    };
    fs::write(
        &cfg.leases_path,
        "address,hwaddr,client_id,valid_lifetime,lease_time\n\
         10.0.0.5,00:1c:73:00:00:05,,3600,100\n\
         10.0.0.6,00:1a:1e:00:00:06,,3600,300\n\
         192.168.100.1,00:1b:21:00:00:01,,3600,900\n",
    )
    .unwrap();

    let pipeline = Pipeline::new(cfg.clone());
    let first = ztp::assign_latest(&pipeline).unwrap();
    let second = ztp::assign_latest(&pipeline).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.ip_address, Ipv4Addr::new(10, 0, 0, 6));
    assert_eq!(first.profile, "ztp-config");

    let log = fs::read_to_string(&cfg.ztp_log_path).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert_eq!(
        log.lines().next(),
        Some("MAC: 00:1a:1e:00:00:06, IP: 10.0.0.6, Vendor: cisco, Config: ztp-config")
    );
}
