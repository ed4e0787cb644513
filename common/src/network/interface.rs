use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use tracing::debug;

/// Looks up the first IPv4 address and netmask configured on `name`.
pub fn ipv4_of(name: &str) -> anyhow::Result<(Ipv4Addr, Ipv4Addr)> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();
    debug!("Identified {} network interface(s)", interfaces.len());

    let interface = interfaces
        .iter()
        .find(|intf| intf.name == name)
        .with_context(|| format!("interface {name} not found"))?;

    first_ipv4(interface).with_context(|| format!("could not retrieve IP/netmask for {name}"))
}

fn first_ipv4(interface: &NetworkInterface) -> Option<(Ipv4Addr, Ipv4Addr)> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) => Some((v4.ip(), v4.mask())),
        IpNetwork::V6(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::ipnetwork::{Ipv4Network, Ipv6Network};

    fn br0() -> NetworkInterface {
        NetworkInterface {
            name: "br0".to_string(),
            description: String::new(),
            index: 4,
            mac: None,
            ips: vec![
                IpNetwork::V6(Ipv6Network::new("fe80::1".parse().unwrap(), 64).unwrap()),
                IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(192, 168, 100, 10), 24).unwrap()),
            ],
            flags: 0,
        }
    }

    #[test]
    fn skips_ipv6_entries() {
        assert_eq!(
            first_ipv4(&br0()),
            Some((Ipv4Addr::new(192, 168, 100, 10), Ipv4Addr::new(255, 255, 255, 0)))
        );
    }

    #[test]
    fn unknown_interface_is_an_error() {
        assert!(ipv4_of("definitely-not-an-interface0").is_err());
    }
}
