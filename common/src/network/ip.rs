use std::net::Ipv4Addr;

/// Parses a dotted-quad IPv4 address, tolerating surrounding whitespace.
pub fn parse_ipv4(raw: &str) -> Option<Ipv4Addr> {
    raw.trim().parse::<Ipv4Addr>().ok()
}

/// True when `raw` is four numeric octet groups, i.e. a lease row rather than a header.
pub fn is_ipv4(raw: &str) -> bool {
    parse_ipv4(raw).is_some()
}
