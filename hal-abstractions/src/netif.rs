//! lwIP TCP/IP adapter interface

use core::net::{Ipv4Addr, Ipv6Addr};

use heapless::String;

use crate::error::HalError;

/// Longest hostname lwIP keeps per interface
pub const HOSTNAME_MAX_LEN: usize = 32;

/// Network interfaces managed by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    Station,
    AccessPoint,
}

/// DNS server slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DnsSlot {
    Main,
    Backup,
}

/// IPv4 configuration of an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl IpInfo {
    /// All-zero configuration
    pub const UNSPECIFIED: Self = Self {
        ip: Ipv4Addr::UNSPECIFIED,
        netmask: Ipv4Addr::UNSPECIFIED,
        gateway: Ipv4Addr::UNSPECIFIED,
    };
}

impl Default for IpInfo {
    fn default() -> Self {
        Self::UNSPECIFIED
    }
}

/// Address range handed out by the soft-AP DHCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhcpsLease {
    pub enable: bool,
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

/// lwIP TCP/IP adapter (`tcpip_adapter_*`)
pub trait NetifAdapter {
    /// Bring the interface up without DHCP
    fn up(&mut self, iface: Interface) -> Result<(), HalError>;

    /// Start the DHCP client
    fn dhcpc_start(&mut self, iface: Interface) -> Result<(), HalError>;

    /// Stop the DHCP client; `HalError::DhcpAlreadyStopped` if it was not running
    fn dhcpc_stop(&mut self, iface: Interface) -> Result<(), HalError>;

    /// Start the DHCP server
    fn dhcps_start(&mut self, iface: Interface) -> Result<(), HalError>;

    /// Stop the DHCP server
    fn dhcps_stop(&mut self, iface: Interface) -> Result<(), HalError>;

    /// Configure the DHCP server's lease range
    fn set_dhcps_lease(&mut self, lease: &DhcpsLease) -> Result<(), HalError>;

    fn ip_info(&self, iface: Interface) -> Result<IpInfo, HalError>;

    fn set_ip_info(&mut self, iface: Interface, info: &IpInfo) -> Result<(), HalError>;

    /// Resolver address in `slot`
    fn dns(&self, slot: DnsSlot) -> Result<Ipv4Addr, HalError>;

    fn set_dns(&mut self, slot: DnsSlot, addr: Ipv4Addr) -> Result<(), HalError>;

    fn mac(&self, iface: Interface) -> Result<[u8; 6], HalError>;

    fn hostname(&self, iface: Interface) -> Result<String<HOSTNAME_MAX_LEN>, HalError>;

    fn set_hostname(&mut self, iface: Interface, hostname: &str) -> Result<(), HalError>;

    /// Create the IPv6 link-local address
    fn create_ip6_linklocal(&mut self, iface: Interface) -> Result<(), HalError>;

    fn ip6_linklocal(&self, iface: Interface) -> Result<Ipv6Addr, HalError>;
}
