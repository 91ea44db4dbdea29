//! IP address classification.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Parse an address, accepting surrounding whitespace.
pub fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

/// A valid address outside private and reserved ranges.
///
/// Unparseable input is never public.
pub fn is_public_ip(value: &str) -> bool {
    match parse_ip(value) {
        Some(IpAddr::V4(ip)) => !is_private_v4(&ip) && !is_reserved_v4(&ip),
        Some(IpAddr::V6(ip)) => match ip.to_ipv4_mapped() {
            Some(mapped) => !is_private_v4(&mapped) && !is_reserved_v4(&mapped),
            None => !is_private_v6(&ip) && !is_reserved_v6(&ip),
        },
        None => false,
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_private()
}

fn is_reserved_v4(ip: &Ipv4Addr) -> bool {
    let octets = ip.octets();
    octets[0] == 0
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        // 240.0.0.0/4
        || octets[0] >= 240
        // 100.64.0.0/10 carrier-grade NAT
        || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    // fc00::/7 unique local
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

fn is_reserved_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_unspecified()
        || ip.is_loopback()
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (first == 0x2001 && ip.segments()[1] == 0x0db8)
        || ip.is_multicast()
}
