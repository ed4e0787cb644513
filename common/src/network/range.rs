use std::net::Ipv4Addr;

use anyhow::{bail, ensure};
use pnet::ipnetwork::Ipv4Network;

/// Addresses handed to the DHCP server and ZTP services for one subnet.
///
/// Derived from the provisioning host's own address: the next host is the ZTP
/// server, the one after it the router, and everything from there to the last
/// usable host becomes the dynamic pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhcpPool {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub prefix: u8,
    pub broadcast: Ipv4Addr,
    pub ztp_ip: Ipv4Addr,
    pub router_ip: Ipv4Addr,
    pub range_start: Ipv4Addr,
    pub range_end: Ipv4Addr,
}

impl DhcpPool {
    /// Shell `export` pairs in the order the provisioning scripts source them.
    pub fn exports(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ZTP_IP", self.ztp_ip.to_string()),
            ("SUBNET", self.network.to_string()),
            ("NETMASK", self.netmask.to_string()),
            ("CIDR", self.prefix.to_string()),
            ("RANGE_START", self.range_start.to_string()),
            ("RANGE_END", self.range_end.to_string()),
            ("ROUTER_IP", self.router_ip.to_string()),
            ("BROADCAST_IP", self.broadcast.to_string()),
        ]
    }
}

/// Usable host addresses of a network as an inclusive `u32` range.
fn host_bounds(network: &Ipv4Network) -> (u32, u32) {
    let first: u32 = network.network().into();
    let last: u32 = network.broadcast().into();
    match network.prefix() {
        31 | 32 => (first, last),
        _ => (first + 1, last - 1),
    }
}

/// Plans the pool for the subnet `ip`/`netmask` belongs to.
pub fn plan_pool(ip: Ipv4Addr, netmask: Ipv4Addr) -> anyhow::Result<DhcpPool> {
    let network = Ipv4Network::with_netmask(ip, netmask)?;
    let (first_host, last_host) = host_bounds(&network);
    let ip_u32: u32 = ip.into();

    if ip_u32 < first_host || ip_u32 > last_host {
        bail!("interface IP {ip} is not a usable host of {network}");
    }
    ensure!(
        ip_u32.saturating_add(3) <= last_host,
        "not enough available IPs after the interface IP {ip}"
    );

    Ok(DhcpPool {
        network: network.network(),
        netmask: network.mask(),
        prefix: network.prefix(),
        broadcast: network.broadcast(),
        ztp_ip: Ipv4Addr::from(ip_u32 + 1),
        router_ip: Ipv4Addr::from(ip_u32 + 2),
        range_start: Ipv4Addr::from(ip_u32 + 3),
        range_end: Ipv4Addr::from(last_host),
    })
}
