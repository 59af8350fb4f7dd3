//! Soft access point interface

use core::net::{Ipv4Addr, Ipv6Addr};

use heapless::String;
use rtw_hal::netif::{Interface, IpInfo, HOSTNAME_MAX_LEN};
use rtw_hal::wifi::{ApRequest, Security, MAC_LEN, PASSPHRASE_MAX_LEN};
use rtw_hal::{NetifAdapter, WifiDriver};

use crate::addr::{self, MAC_STRING_LEN};
use crate::config::{ApAddressing, SoftApConfig};
use crate::error::WifiError;
use crate::status::WlStatus;
use crate::wifi::{Wifi, WifiMode};

/// Size of the driver's associated-client list
pub const MAX_STA_CONNECT_NUM: usize = 10;

/// Shortest WPA2 passphrase
const PASSPHRASE_MIN_LEN: usize = 8;

impl<D: WifiDriver, N: NetifAdapter> Wifi<D, N> {
    /// Start the soft access point
    ///
    /// Once the AP is up its interface gets the addressing set by
    /// [`soft_ap_config`](Self::soft_ap_config) and the DHCP server is
    /// restarted on the ten addresses after it. If the address cannot be
    /// applied the AP stays up without a DHCP server.
    pub fn soft_ap(&mut self, config: &SoftApConfig<'_>) -> Result<(), WifiError> {
        self.enable_ap(true)
            .inspect_err(|_| error!("enable AP first!"))?;

        if config.ssid.is_empty() {
            error!("SSID missing!");
            return Err(WifiError::InvalidSsid);
        }
        let passphrase = config.passphrase.filter(|p| !p.is_empty());
        match passphrase.map(str::len) {
            Some(len) if len < PASSPHRASE_MIN_LEN => {
                error!("passphrase too short!");
                return Err(WifiError::InvalidPassphrase);
            }
            Some(len) if len > PASSPHRASE_MAX_LEN => {
                error!("passphrase too long!");
                return Err(WifiError::InvalidPassphrase);
            }
            _ => {}
        }

        let request = ApRequest {
            ssid: config.ssid,
            security: if passphrase.is_some() {
                Security::Wpa2AesPsk
            } else {
                Security::Open
            },
            passphrase,
            channel: config.channel,
            hidden: config.hidden,
        };
        self.driver.start_ap(&request).map_err(|e| {
            error!("AP start failed: {:?}", e);
            WifiError::ApStartFailed
        })?;

        self.apply_ap_addressing()
    }

    /// Set the addressing used by the next [`soft_ap`](Self::soft_ap)
    pub fn soft_ap_config(&mut self, addressing: ApAddressing) -> Result<(), WifiError> {
        self.enable_ap(true)?;
        self.ap_addressing = addressing;
        Ok(())
    }

    /// Stop the access point
    ///
    /// The radio is powered down. With `wifi_off` the AP interface is removed
    /// from the mode; otherwise the radio comes back up in the same mode.
    pub fn soft_ap_disconnect(&mut self, wifi_off: bool) -> Result<(), WifiError> {
        self.ensure_on()?;
        let target = if wifi_off {
            self.mode.with_ap(false)
        } else {
            self.mode
        };

        self.driver.off().map_err(|e| {
            error!("Could not power off WiFi: {:?}", e);
            WifiError::EnableFailed
        })?;
        if self.mode.has_sta() {
            self.sta_status = WlStatus::NoShield;
        }
        self.mode = WifiMode::Off;

        self.set_mode(target)
    }

    /// Number of associated stations
    pub fn soft_ap_station_count(&self) -> Result<usize, WifiError> {
        self.ensure_on()?;
        let count = self.driver.associated_clients(MAX_STA_CONNECT_NUM)?;
        Ok(count.min(MAX_STA_CONNECT_NUM))
    }

    pub fn soft_ap_ip(&self) -> Result<Ipv4Addr, WifiError> {
        Ok(self.ip_info(Interface::AccessPoint)?.ip)
    }

    pub fn soft_ap_broadcast_ip(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self.ip_info(Interface::AccessPoint)?;
        Ok(addr::broadcast(info.gateway, info.netmask))
    }

    pub fn soft_ap_network_id(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self.ip_info(Interface::AccessPoint)?;
        Ok(addr::network_id(info.gateway, info.netmask))
    }

    pub fn soft_ap_subnet_cidr(&self) -> Result<u8, WifiError> {
        Ok(addr::subnet_cidr(self.ip_info(Interface::AccessPoint)?.netmask))
    }

    pub fn soft_ap_mac_address(&self) -> Result<[u8; MAC_LEN], WifiError> {
        self.ensure_on()?;
        Ok(self.netif.mac(Interface::AccessPoint)?)
    }

    pub fn soft_ap_mac_address_string(&self) -> Result<String<MAC_STRING_LEN>, WifiError> {
        Ok(addr::format_mac(&self.soft_ap_mac_address()?))
    }

    pub fn soft_ap_hostname(&self) -> Result<String<HOSTNAME_MAX_LEN>, WifiError> {
        self.ensure_on()?;
        Ok(self.netif.hostname(Interface::AccessPoint)?)
    }

    pub fn soft_ap_set_hostname(&mut self, hostname: &str) -> Result<(), WifiError> {
        self.ensure_on()?;
        Ok(self.netif.set_hostname(Interface::AccessPoint, hostname)?)
    }

    pub fn soft_ap_enable_ipv6(&mut self) -> Result<(), WifiError> {
        self.ensure_on()?;
        Ok(self.netif.create_ip6_linklocal(Interface::AccessPoint)?)
    }

    pub fn soft_ap_ipv6(&self) -> Result<Ipv6Addr, WifiError> {
        self.ensure_on()?;
        Ok(self.netif.ip6_linklocal(Interface::AccessPoint)?)
    }

    fn apply_ap_addressing(&mut self) -> Result<(), WifiError> {
        let addressing = self.ap_addressing;
        if let Err(e) = self.netif.dhcps_stop(Interface::AccessPoint) {
            debug!("DHCP server stop: {:?}", e);
        }

        let info = IpInfo {
            ip: addressing.local_ip,
            netmask: addressing.subnet,
            gateway: addressing.gateway,
        };
        if let Err(e) = self.netif.set_ip_info(Interface::AccessPoint, &info) {
            warn!("AP IP could not be configured: {:?}", e);
            return Ok(());
        }

        let lease = addr::dhcp_lease(addressing.local_ip);
        if let Err(e) = self.netif.set_dhcps_lease(&lease) {
            warn!("DHCP lease range rejected: {:?}", e);
        }
        self.netif
            .dhcps_start(Interface::AccessPoint)
            .map_err(|e| {
                error!("DHCP server start failed: {:?}", e);
                WifiError::DhcpFailed
            })
    }
}
