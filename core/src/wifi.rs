//! Radio mode control
//!
//! [`Wifi`] owns the driver and the TCP/IP adapter. Station and soft AP
//! operations are implemented on it in their own modules; this one only tracks
//! which interfaces are up and keeps the driver's power state in step.

use rtw_hal::netif::{Interface, IpInfo};
use rtw_hal::wifi::RtwMode;
use rtw_hal::{NetifAdapter, WifiDriver};

use crate::config::ApAddressing;
use crate::error::WifiError;
use crate::status::{WifiEvent, WlStatus};

/// Enabled interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiMode {
    #[default]
    Off,
    Station,
    AccessPoint,
    Both,
}

impl WifiMode {
    fn from_interfaces(sta: bool, ap: bool) -> Self {
        match (sta, ap) {
            (false, false) => Self::Off,
            (true, false) => Self::Station,
            (false, true) => Self::AccessPoint,
            (true, true) => Self::Both,
        }
    }

    pub fn has_sta(self) -> bool {
        matches!(self, Self::Station | Self::Both)
    }

    pub fn has_ap(self) -> bool {
        matches!(self, Self::AccessPoint | Self::Both)
    }

    /// Same mode with the station interface added or removed
    pub fn with_sta(self, enable: bool) -> Self {
        Self::from_interfaces(enable, self.has_ap())
    }

    /// Same mode with the AP interface added or removed
    pub fn with_ap(self, enable: bool) -> Self {
        Self::from_interfaces(self.has_sta(), enable)
    }

    /// Driver mode to power on in, `None` for off
    pub fn rtw_mode(self) -> Option<RtwMode> {
        match self {
            Self::Off => None,
            Self::Station => Some(RtwMode::Sta),
            Self::AccessPoint => Some(RtwMode::Ap),
            Self::Both => Some(RtwMode::StaAp),
        }
    }
}

/// Wi-Fi controller over an RTW driver and lwIP adapter
pub struct Wifi<D, N> {
    pub(crate) driver: D,
    pub(crate) netif: N,
    pub(crate) mode: WifiMode,
    pub(crate) sta_status: WlStatus,
    pub(crate) status_tracking: bool,
    pub(crate) use_static_ip: bool,
    pub(crate) ap_addressing: ApAddressing,
}

impl<D: WifiDriver, N: NetifAdapter> Wifi<D, N> {
    /// Controller with the radio off
    pub fn new(driver: D, netif: N) -> Self {
        Self {
            driver,
            netif,
            mode: WifiMode::Off,
            sta_status: WlStatus::NoShield,
            status_tracking: false,
            use_static_ip: false,
            ap_addressing: ApAddressing::default(),
        }
    }

    pub fn mode(&self) -> WifiMode {
        self.mode
    }

    /// Switch the driver to `mode`
    ///
    /// The driver is powered off and back on in the new mode; nothing happens
    /// when the mode is unchanged. If powering on fails the radio is left off.
    pub fn set_mode(&mut self, mode: WifiMode) -> Result<(), WifiError> {
        if mode == self.mode {
            return Ok(());
        }
        let previous = self.mode;

        if previous != WifiMode::Off {
            self.driver.off().map_err(|e| {
                error!("Could not power off WiFi: {:?}", e);
                WifiError::EnableFailed
            })?;
            self.mode = WifiMode::Off;
        }

        if let Some(rtw_mode) = mode.rtw_mode() {
            if let Err(e) = self.driver.on(rtw_mode) {
                error!("Could not set mode: {:?}", e);
                self.station_stopped(previous);
                return Err(WifiError::EnableFailed);
            }
        }
        self.mode = mode;

        if mode.has_sta() && !previous.has_sta() {
            self.status_tracking = true;
            self.sta_status = WlStatus::Disconnected;
        } else {
            self.station_stopped(previous);
        }
        debug!("WiFi mode changed");
        Ok(())
    }

    /// Add or remove the station interface
    pub fn enable_sta(&mut self, enable: bool) -> Result<(), WifiError> {
        self.set_mode(self.mode.with_sta(enable))
    }

    /// Add or remove the soft AP interface
    pub fn enable_ap(&mut self, enable: bool) -> Result<(), WifiError> {
        self.set_mode(self.mode.with_ap(enable))
    }

    /// Feed a driver event into the tracked station status
    pub fn handle_event(&mut self, event: WifiEvent) {
        trace!("WiFi event {:?}", event);
        self.status_tracking = true;
        self.sta_status = event.status();
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn netif(&self) -> &N {
        &self.netif
    }

    pub fn netif_mut(&mut self) -> &mut N {
        &mut self.netif
    }

    /// Release the driver and adapter
    pub fn into_parts(self) -> (D, N) {
        (self.driver, self.netif)
    }

    pub(crate) fn ensure_on(&self) -> Result<(), WifiError> {
        if self.mode == WifiMode::Off {
            Err(WifiError::ModeOff)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ip_info(&self, iface: Interface) -> Result<IpInfo, WifiError> {
        self.ensure_on()?;
        Ok(self.netif.ip_info(iface)?)
    }

    fn station_stopped(&mut self, previous: WifiMode) {
        if previous.has_sta() && !self.mode.has_sta() {
            self.sta_status = WlStatus::NoShield;
        }
    }
}
