//! IPv4 and MAC address helpers

use core::fmt::Write;
use core::net::Ipv4Addr;

use heapless::String;
use rtw_hal::netif::DhcpsLease;

/// Length of `"AA:BB:CC:DD:EE:FF"`
pub const MAC_STRING_LEN: usize = 17;

/// Directed broadcast address of the subnet containing `ip`
pub fn broadcast(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(mask))
}

/// Network address of the subnet containing `ip`
pub fn network_id(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) & u32::from(mask))
}

/// Prefix length of `mask`
pub fn subnet_cidr(mask: Ipv4Addr) -> u8 {
    u32::from(mask).count_ones() as u8
}

/// Colon-separated upper-case hex
pub fn format_mac(mac: &[u8; 6]) -> String<MAC_STRING_LEN> {
    let mut out = String::new();
    // 6 * 2 hex digits + 5 separators is exactly MAC_STRING_LEN
    write!(
        out,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
    .expect("MAC string should fit");
    out
}

/// Soft-AP DHCP range: the ten addresses after `local_ip` within its /24
pub fn dhcp_lease(local_ip: Ipv4Addr) -> DhcpsLease {
    let [a, b, c, d] = local_ip.octets();
    DhcpsLease {
        enable: true,
        start: Ipv4Addr::new(a, b, c, d.wrapping_add(1)),
        end: Ipv4Addr::new(a, b, c, d.wrapping_add(11)),
    }
}
