//! Connection status and driver events

/// Station connection status, numbered like Arduino's `wl_status_t`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WlStatus {
    Idle = 0,
    NoSsidAvailable = 1,
    ScanCompleted = 2,
    Connected = 3,
    ConnectFailed = 4,
    ConnectionLost = 5,
    Disconnected = 6,
    /// Station interface never started
    NoShield = 255,
}

impl WlStatus {
    /// Still waiting for an association outcome
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Idle | Self::Disconnected | Self::NoShield)
    }
}

/// Station events delivered by the SDK's event callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiEvent {
    StaStart,
    StaStop,
    StaConnected,
    StaDisconnected,
    /// Association dropped after having been up
    StaConnectionLost,
    /// Target SSID not found during the scan
    StaNoSsidFound,
    /// Authentication or 4-way handshake failed
    StaAuthFailed,
    ScanDone,
}

impl WifiEvent {
    /// Status the event moves the station to
    pub fn status(self) -> WlStatus {
        match self {
            Self::StaStart | Self::StaDisconnected => WlStatus::Disconnected,
            Self::StaStop => WlStatus::NoShield,
            Self::StaConnected => WlStatus::Connected,
            Self::StaConnectionLost => WlStatus::ConnectionLost,
            Self::StaNoSsidFound => WlStatus::NoSsidAvailable,
            Self::StaAuthFailed => WlStatus::ConnectFailed,
            Self::ScanDone => WlStatus::ScanCompleted,
        }
    }
}
