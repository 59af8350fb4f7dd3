//! Configuration structures

use core::net::Ipv4Addr;

use crate::rx_buffer::DEFAULT_CAPACITY;

/// Station connection parameters for [`Wifi::begin`](crate::Wifi::begin)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationConfig<'a> {
    /// Network name, 1-31 bytes
    pub ssid: &'a str,
    /// WPA2 passphrase; `None` joins an open network
    pub passphrase: Option<&'a str>,
    /// Restrict the scan to one channel
    pub channel: Option<u8>,
    /// Only associate with this access point
    pub bssid: Option<[u8; 6]>,
    /// Fail unless the association is up when `begin` returns
    pub connect: bool,
}

impl<'a> StationConfig<'a> {
    pub fn new(ssid: &'a str) -> Self {
        Self {
            ssid,
            ..Default::default()
        }
    }

    pub fn with_passphrase(mut self, passphrase: &'a str) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_bssid(mut self, bssid: [u8; 6]) -> Self {
        self.bssid = Some(bssid);
        self
    }
}

impl Default for StationConfig<'_> {
    fn default() -> Self {
        Self {
            ssid: "",
            passphrase: None,
            channel: None,
            bssid: None,
            connect: true,
        }
    }
}

/// Soft access point parameters for [`Wifi::soft_ap`](crate::Wifi::soft_ap)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftApConfig<'a> {
    pub ssid: &'a str,
    /// WPA2 passphrase of at least 8 bytes; `None` or empty for an open network
    pub passphrase: Option<&'a str>,
    /// Channel 1-13
    pub channel: u8,
    /// Do not broadcast the SSID
    pub hidden: bool,
}

impl<'a> SoftApConfig<'a> {
    pub fn new(ssid: &'a str) -> Self {
        Self {
            ssid,
            ..Default::default()
        }
    }

    pub fn with_passphrase(mut self, passphrase: &'a str) -> Self {
        self.passphrase = Some(passphrase);
        self
    }
}

impl Default for SoftApConfig<'_> {
    fn default() -> Self {
        Self {
            ssid: "",
            passphrase: None,
            channel: 1,
            hidden: false,
        }
    }
}

/// Static station addressing; unspecified fields are left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIpConfig {
    /// `0.0.0.0` clears the address and re-enables DHCP
    pub local_ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub dns1: Ipv4Addr,
    pub dns2: Ipv4Addr,
}

impl Default for StaticIpConfig {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::UNSPECIFIED,
            subnet: Ipv4Addr::UNSPECIFIED,
            dns1: Ipv4Addr::UNSPECIFIED,
            dns2: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Soft AP interface addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApAddressing {
    pub local_ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

impl Default for ApAddressing {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::new(192, 168, 1, 1),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
        }
    }
}

/// Secure client tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureClientConfig {
    /// Receive staging buffer size in bytes
    pub rx_buffer_capacity: usize,
    /// Socket / handshake timeout in milliseconds, 0 for the library default
    pub timeout_ms: u32,
    /// Minimum time between keep-alive probes in `connected()`
    pub keepalive_interval_ms: u64,
}

impl Default for SecureClientConfig {
    fn default() -> Self {
        Self {
            rx_buffer_capacity: DEFAULT_CAPACITY,
            timeout_ms: 0,
            keepalive_interval_ms: 500,
        }
    }
}
