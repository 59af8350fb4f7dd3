//! RTW Wi-Fi driver interface
//!
//! One method per driver call the Arduino layer needs. Return codes are
//! folded into `Result<_, HalError>`; `RTW_SUCCESS` is `Ok`.

use heapless::String;

use crate::error::HalError;

/// Longest SSID the driver stores
pub const SSID_MAX_LEN: usize = 32;

/// Longest WPA passphrase the driver stores
pub const PASSPHRASE_MAX_LEN: usize = 64;

/// MAC / BSSID length in bytes
pub const MAC_LEN: usize = 6;

/// Modes accepted by `wifi_on`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtwMode {
    /// Station only
    Sta,
    /// Access point only
    Ap,
    /// Concurrent station + access point
    StaAp,
}

/// Security types understood by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Security {
    /// Open network
    #[default]
    Open,
    /// WEP with pre-shared key
    WepPsk,
    /// WPA with TKIP
    WpaTkipPsk,
    /// WPA2 with AES-CCMP
    Wpa2AesPsk,
    /// WPA2 with AES or TKIP
    Wpa2MixedPsk,
    /// WPA3 SAE
    Wpa3AesPsk,
}

/// Driver interface names (`WLAN0_NAME`, `WLAN1_NAME`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WlanPort {
    /// `wlan0`
    Wlan0,
    /// `wlan1`
    Wlan1,
}

/// Arguments for `wifi_connect` / `wifi_connect_bssid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest<'a> {
    pub ssid: &'a str,
    pub security: Security,
    pub passphrase: Option<&'a str>,
    /// Connect to this BSSID only (`wifi_connect_bssid`)
    pub bssid: Option<[u8; MAC_LEN]>,
    /// WEP key index, -1 when unused
    pub key_id: i32,
}

/// Arguments for `wifi_start_ap` / `wifi_start_ap_with_hidden_ssid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApRequest<'a> {
    pub ssid: &'a str,
    pub security: Security,
    pub passphrase: Option<&'a str>,
    pub channel: u8,
    pub hidden: bool,
}

/// Fast-reconnect profile stored by the driver in flash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectProfile {
    pub ssid: String<SSID_MAX_LEN>,
    pub passphrase: String<PASSPHRASE_MAX_LEN>,
    pub security: Security,
    /// Raw channel word; the top nibble carries the WEP key index
    pub channel: u32,
}

impl ReconnectProfile {
    /// WEP key index packed into the channel word
    pub fn key_id(&self) -> i32 {
        (self.channel >> 28) as i32
    }
}

/// Current settings of one driver interface (`wifi_get_setting`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WifiSetting {
    pub ssid: String<SSID_MAX_LEN>,
    pub password: String<PASSPHRASE_MAX_LEN>,
    pub channel: u8,
    pub security: Security,
}

/// RTW Wi-Fi driver
pub trait WifiDriver {
    /// Power the radio up in `mode` (`wifi_on`)
    fn on(&mut self, mode: RtwMode) -> Result<(), HalError>;

    /// Power the radio down (`wifi_off`)
    fn off(&mut self) -> Result<(), HalError>;

    /// Restrict the next scan to a single channel (`wifi_set_pscan_chan`)
    fn set_scan_channel(&mut self, channel: u8, fast_survey: bool) -> Result<(), HalError>;

    /// Associate with an access point
    fn connect(&mut self, request: &ConnectRequest<'_>) -> Result<(), HalError>;

    /// Drop the current association (`wifi_disconnect`)
    fn disconnect(&mut self) -> Result<(), HalError>;

    /// Whether the station is associated (`wifi_is_connected_to_ap`)
    fn is_connected_to_ap(&self) -> bool;

    /// Stored fast-reconnect data, `None` when nothing is stored
    fn reconnect_profile(&self) -> Option<ReconnectProfile>;

    /// Erase the stored fast-reconnect data
    fn clear_reconnect_profile(&mut self) -> Result<(), HalError>;

    /// Settings of one interface
    fn setting(&self, port: WlanPort) -> Result<WifiSetting, HalError>;

    /// BSSID of the access point the station is associated with
    fn ap_bssid(&self) -> Result<[u8; MAC_LEN], HalError>;

    /// Signal strength of the current association in dBm
    fn rssi(&self) -> Result<i32, HalError>;

    /// Start a soft access point
    fn start_ap(&mut self, request: &ApRequest<'_>) -> Result<(), HalError>;

    /// Number of clients associated with the soft AP, asking for at most `max`
    fn associated_clients(&self, max: usize) -> Result<usize, HalError>;
}
