//! Station interface

use core::net::{Ipv4Addr, Ipv6Addr};

use embedded_hal::delay::DelayNs;
use heapless::String;
use rtw_hal::netif::{DnsSlot, Interface, IpInfo, HOSTNAME_MAX_LEN};
use rtw_hal::wifi::{
    ConnectRequest, Security, WlanPort, MAC_LEN, PASSPHRASE_MAX_LEN, SSID_MAX_LEN,
};
use rtw_hal::{HalError, NetifAdapter, WifiDriver};

use crate::addr::{self, MAC_STRING_LEN};
use crate::config::{StaticIpConfig, StationConfig};
use crate::error::WifiError;
use crate::status::WlStatus;
use crate::wifi::{Wifi, WifiMode};

/// Polls made by [`Wifi::wait_for_connect_result`]
const CONNECT_POLL_COUNT: u32 = 100;
const CONNECT_POLL_INTERVAL_MS: u32 = 100;

impl<D: WifiDriver, N: NetifAdapter> Wifi<D, N> {
    /// Join a network
    ///
    /// Enables station mode, issues the association request and starts the
    /// DHCP client (or brings the interface up when a static address is
    /// configured). With `config.connect` set the call fails unless the
    /// driver reports the association as up.
    pub fn begin(&mut self, config: &StationConfig<'_>) -> Result<WlStatus, WifiError> {
        self.enable_sta(true).inspect_err(|_| error!("STA enable failed!"))?;

        if config.ssid.is_empty() || config.ssid.len() >= SSID_MAX_LEN {
            error!("SSID too long or missing!");
            return Err(WifiError::InvalidSsid);
        }
        let passphrase = config.passphrase.filter(|p| !p.is_empty());
        if passphrase.is_some_and(|p| p.len() > PASSPHRASE_MAX_LEN) {
            error!("passphrase too long!");
            return Err(WifiError::InvalidPassphrase);
        }
        let security = if passphrase.is_some() {
            Security::Wpa2AesPsk
        } else {
            Security::Open
        };

        if let (Some(channel), None) = (config.channel.filter(|&c| c != 0), config.bssid) {
            if let Err(e) = self.driver.set_scan_channel(channel, true) {
                error!("Partial scan on channel {} failed: {:?}", channel, e);
                self.power_cycle();
                return Err(WifiError::ScanConfigFailed);
            }
        }

        let request = ConnectRequest {
            ssid: config.ssid,
            security,
            passphrase,
            bssid: config.bssid,
            key_id: -1,
        };
        self.driver.connect(&request).map_err(|e| {
            error!("connect failed: {:?}", e);
            WifiError::ConnectFailed
        })?;

        if self.use_static_ip {
            if let Err(e) = self.netif.up(Interface::Station) {
                warn!("STA interface up failed: {:?}", e);
            }
        } else {
            self.start_dhcp_client()?;
        }

        if config.connect && !self.driver.is_connected_to_ap() {
            error!("connect failed!");
            return Err(WifiError::NotAssociated);
        }

        let status = self.status();
        if status == WlStatus::Connected {
            if let Ok(ip) = self.netif.ip_info(Interface::Station) {
                let octets = ip.ip.octets();
                info!(
                    "Connected, IP: {}.{}.{}.{}",
                    octets[0], octets[1], octets[2], octets[3]
                );
            }
        }
        Ok(status)
    }

    /// Join the network stored in the driver's fast-reconnect profile
    pub fn begin_saved(&mut self) -> Result<WlStatus, WifiError> {
        self.enable_sta(true).inspect_err(|_| error!("STA enable failed!"))?;

        let Some(profile) = self.driver.reconnect_profile() else {
            error!("config failed");
            return Err(WifiError::NoSavedProfile);
        };
        let passphrase = match profile.security {
            Security::Open => None,
            _ => Some(profile.passphrase.as_str()),
        };
        let request = ConnectRequest {
            ssid: profile.ssid.as_str(),
            security: profile.security,
            passphrase,
            bssid: None,
            key_id: profile.key_id(),
        };
        self.driver.connect(&request).map_err(|e| {
            error!("connect failed: {:?}", e);
            WifiError::ConnectFailed
        })?;

        if self.use_static_ip {
            if let Err(e) = self.netif.dhcpc_stop(Interface::Station) {
                debug!("DHCP client stop: {:?}", e);
            }
        } else {
            self.start_dhcp_client()?;
        }

        if self.status() != WlStatus::Connected && !self.driver.is_connected_to_ap() {
            error!("connect failed!");
            return Err(WifiError::NotAssociated);
        }
        Ok(self.status())
    }

    /// Drop the association and rejoin the saved network
    pub fn reconnect(&mut self) -> Result<WlStatus, WifiError> {
        if !self.mode.has_sta() {
            return Err(WifiError::InterfaceDisabled);
        }
        self.driver.disconnect().map_err(|e| {
            error!("disconnect failed: {:?}", e);
            WifiError::DisconnectFailed
        })?;
        self.begin_saved()
    }

    /// Leave the network
    ///
    /// `erase_ap` also clears the stored reconnect profile; `wifi_off` then
    /// disables the station interface.
    pub fn disconnect(&mut self, wifi_off: bool, erase_ap: bool) -> Result<(), WifiError> {
        if !self.mode.has_sta() {
            return Err(WifiError::InterfaceDisabled);
        }
        if erase_ap {
            self.clear_connected_setting()?;
        }
        self.driver.disconnect().map_err(|e| {
            error!("disconnect failed: {:?}", e);
            WifiError::DisconnectFailed
        })?;
        if wifi_off {
            self.enable_sta(false)?;
        }
        Ok(())
    }

    /// Configure a static station address
    ///
    /// An unspecified `local_ip` clears the interface address and hands it
    /// back to DHCP. DNS servers are only written when specified.
    pub fn config(&mut self, config: &StaticIpConfig) -> Result<(), WifiError> {
        self.enable_sta(true)?;

        let info = if config.local_ip.is_unspecified() {
            IpInfo::UNSPECIFIED
        } else {
            IpInfo {
                ip: config.local_ip,
                netmask: config.subnet,
                gateway: config.gateway,
            }
        };

        match self.netif.dhcpc_stop(Interface::Station) {
            Ok(()) | Err(HalError::DhcpAlreadyStopped) => {}
            Err(e) => {
                error!("DHCP could not be stopped! Error: {:?}", e);
                return Err(WifiError::DhcpFailed);
            }
        }

        self.netif
            .set_ip_info(Interface::Station, &info)
            .map_err(|e| {
                error!("STA IP could not be configured! Error: {:?}", e);
                WifiError::IpConfigFailed
            })?;

        if info.ip.is_unspecified() {
            self.start_dhcp_client()?;
            self.use_static_ip = false;
        } else {
            self.use_static_ip = true;
        }

        for (slot, dns) in [(DnsSlot::Main, config.dns1), (DnsSlot::Backup, config.dns2)] {
            if dns.is_unspecified() {
                continue;
            }
            if let Err(e) = self.netif.set_dns(slot, dns) {
                warn!("DNS server could not be set: {:?}", e);
            }
        }
        Ok(())
    }

    pub fn is_connected(&mut self) -> bool {
        self.status() == WlStatus::Connected
    }

    /// Current station status
    ///
    /// Once tracking has started the association is polled: up reports
    /// `Connected`, down reports `Disconnected` whatever event arrived last.
    pub fn status(&mut self) -> WlStatus {
        if !self.status_tracking || !self.mode.has_sta() {
            return self.sta_status;
        }
        self.sta_status = if self.driver.is_connected_to_ap() {
            WlStatus::Connected
        } else {
            WlStatus::Disconnected
        };
        self.sta_status
    }

    /// Wait up to ten seconds for the association to settle
    pub fn wait_for_connect_result(&mut self, delay: &mut impl DelayNs) -> WlStatus {
        if !self.mode.has_sta() {
            return WlStatus::Disconnected;
        }
        let mut polls = 0;
        while self.pending_status() && polls < CONNECT_POLL_COUNT {
            delay.delay_ms(CONNECT_POLL_INTERVAL_MS);
            polls += 1;
        }
        self.status()
    }

    /// Erase the driver's fast-reconnect profile
    pub fn clear_connected_setting(&mut self) -> Result<(), WifiError> {
        Ok(self.driver.clear_reconnect_profile()?)
    }

    pub fn local_ip(&self) -> Result<Ipv4Addr, WifiError> {
        Ok(self.ip_info(Interface::Station)?.ip)
    }

    pub fn subnet_mask(&self) -> Result<Ipv4Addr, WifiError> {
        Ok(self.ip_info(Interface::Station)?.netmask)
    }

    pub fn gateway_ip(&self) -> Result<Ipv4Addr, WifiError> {
        Ok(self.ip_info(Interface::Station)?.gateway)
    }

    pub fn dns_ip(&self, slot: DnsSlot) -> Result<Ipv4Addr, WifiError> {
        self.ensure_on()?;
        Ok(self.netif.dns(slot)?)
    }

    /// Broadcast address of the gateway's subnet
    pub fn broadcast_ip(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self.ip_info(Interface::Station)?;
        Ok(addr::broadcast(info.gateway, info.netmask))
    }

    /// Network address of the gateway's subnet
    pub fn network_id(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self.ip_info(Interface::Station)?;
        Ok(addr::network_id(info.gateway, info.netmask))
    }

    pub fn subnet_cidr(&self) -> Result<u8, WifiError> {
        Ok(addr::subnet_cidr(self.ip_info(Interface::Station)?.netmask))
    }

    pub fn mac_address(&self) -> Result<[u8; MAC_LEN], WifiError> {
        self.ensure_on()?;
        Ok(self.netif.mac(Interface::Station)?)
    }

    pub fn mac_address_string(&self) -> Result<String<MAC_STRING_LEN>, WifiError> {
        Ok(addr::format_mac(&self.mac_address()?))
    }

    /// SSID of the network the station is configured for
    pub fn ssid(&self) -> Result<String<SSID_MAX_LEN>, WifiError> {
        Ok(self.driver.setting(self.sta_port()?)?.ssid)
    }

    pub fn psk(&self) -> Result<String<PASSPHRASE_MAX_LEN>, WifiError> {
        Ok(self.driver.setting(self.sta_port()?)?.password)
    }

    /// BSSID of the associated access point
    pub fn bssid(&self) -> Result<[u8; MAC_LEN], WifiError> {
        self.ensure_on()?;
        Ok(self.driver.ap_bssid()?)
    }

    pub fn bssid_string(&self) -> Result<String<MAC_STRING_LEN>, WifiError> {
        Ok(addr::format_mac(&self.bssid()?))
    }

    /// Signal strength in dBm
    pub fn rssi(&self) -> Result<i8, WifiError> {
        self.ensure_on()?;
        let rssi = self.driver.rssi()?;
        Ok(rssi.clamp(i8::MIN.into(), i8::MAX.into()) as i8)
    }

    pub fn hostname(&self) -> Result<String<HOSTNAME_MAX_LEN>, WifiError> {
        self.ensure_on()?;
        Ok(self.netif.hostname(Interface::Station)?)
    }

    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), WifiError> {
        self.ensure_on()?;
        Ok(self.netif.set_hostname(Interface::Station, hostname)?)
    }

    /// Create the IPv6 link-local address
    pub fn enable_ipv6(&mut self) -> Result<(), WifiError> {
        self.ensure_on()?;
        Ok(self.netif.create_ip6_linklocal(Interface::Station)?)
    }

    pub fn local_ipv6(&self) -> Result<Ipv6Addr, WifiError> {
        self.ensure_on()?;
        Ok(self.netif.ip6_linklocal(Interface::Station)?)
    }

    fn pending_status(&mut self) -> bool {
        self.status().is_pending()
    }

    fn sta_port(&self) -> Result<WlanPort, WifiError> {
        match self.mode {
            WifiMode::Both => Ok(WlanPort::Wlan1),
            WifiMode::Station => Ok(WlanPort::Wlan0),
            _ => Err(WifiError::InterfaceDisabled),
        }
    }

    fn start_dhcp_client(&mut self) -> Result<(), WifiError> {
        match self.netif.dhcpc_start(Interface::Station) {
            Ok(()) => Ok(()),
            Err(HalError::DhcpStartFailed) => {
                error!("dhcp client start failed!");
                Err(WifiError::DhcpFailed)
            }
            Err(e) => {
                debug!("DHCP client start: {:?}", e);
                Ok(())
            }
        }
    }

    /// Restart the driver in the current mode after a failed scan setup
    fn power_cycle(&mut self) {
        if let Err(e) = self.driver.off() {
            warn!("Could not power off WiFi: {:?}", e);
        }
        if let Some(rtw_mode) = self.mode.rtw_mode() {
            if let Err(e) = self.driver.on(rtw_mode) {
                error!("Could not power on WiFi: {:?}", e);
            }
        }
    }
}
