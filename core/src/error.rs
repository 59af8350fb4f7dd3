//! Error types for the Wi-Fi and secure client layers

use rtw_hal::HalError;

/// Receive buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxError {
    /// Zero-length destination
    ZeroLength,
    /// Nothing buffered and the transport produced nothing on this attempt
    WouldBlock,
    /// Backing storage could not be allocated; permanent
    AllocationFailed,
}

impl core::fmt::Display for RxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroLength => write!(f, "Zero-length read"),
            Self::WouldBlock => write!(f, "No data available"),
            Self::AllocationFailed => write!(f, "Receive buffer allocation failed"),
        }
    }
}

impl core::error::Error for RxError {}

impl embedded_io::Error for RxError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::ZeroLength => embedded_io::ErrorKind::InvalidInput,
            Self::WouldBlock => embedded_io::ErrorKind::TimedOut,
            Self::AllocationFailed => embedded_io::ErrorKind::OutOfMemory,
        }
    }
}

/// Station / access point operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiError {
    /// Radio is off
    ModeOff,
    /// The interface the operation needs is not enabled
    InterfaceDisabled,
    /// Driver refused to switch mode
    EnableFailed,
    /// SSID missing or too long
    InvalidSsid,
    /// Passphrase too short or too long
    InvalidPassphrase,
    /// Single-channel scan could not be configured
    ScanConfigFailed,
    /// Driver rejected the association request
    ConnectFailed,
    /// Association did not come up
    NotAssociated,
    /// No fast-reconnect profile stored
    NoSavedProfile,
    /// Driver failed to disconnect
    DisconnectFailed,
    /// Soft AP could not be started
    ApStartFailed,
    /// DHCP client or server could not be started or stopped
    DhcpFailed,
    /// Interface address could not be applied
    IpConfigFailed,
    /// Any other SDK failure
    Hal(HalError),
}

impl core::fmt::Display for WifiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ModeOff => write!(f, "WiFi is off"),
            Self::InterfaceDisabled => write!(f, "Interface not enabled"),
            Self::EnableFailed => write!(f, "Mode change failed"),
            Self::InvalidSsid => write!(f, "SSID too long or missing"),
            Self::InvalidPassphrase => write!(f, "Invalid passphrase length"),
            Self::ScanConfigFailed => write!(f, "Scan channel configuration failed"),
            Self::ConnectFailed => write!(f, "Connect failed"),
            Self::NotAssociated => write!(f, "Not associated"),
            Self::NoSavedProfile => write!(f, "No saved connection"),
            Self::DisconnectFailed => write!(f, "Disconnect failed"),
            Self::ApStartFailed => write!(f, "Soft AP start failed"),
            Self::DhcpFailed => write!(f, "DHCP failed"),
            Self::IpConfigFailed => write!(f, "IP configuration failed"),
            Self::Hal(e) => write!(f, "{}", e),
        }
    }
}

impl core::error::Error for WifiError {}

impl From<HalError> for WifiError {
    fn from(e: HalError) -> Self {
        Self::Hal(e)
    }
}

/// Secure client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientError {
    /// No open session
    NotConnected,
    /// TLS context could not be created
    CreateFailed,
    /// Handshake failed with the given library code
    Handshake(i32),
    /// Send failed with the given library code
    Send(i32),
    /// Receive path error
    Rx(RxError),
    /// Credential buffer could not be allocated
    OutOfMemory,
    /// Credential stream ended early or was not UTF-8
    CredentialLoad,
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "Not connected"),
            Self::CreateFailed => write!(f, "SSL client creation failed"),
            Self::Handshake(code) => write!(f, "TLS handshake failed: -0x{:04X}", code.unsigned_abs()),
            Self::Send(code) => write!(f, "TLS send failed: -0x{:04X}", code.unsigned_abs()),
            Self::Rx(e) => write!(f, "{}", e),
            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::CredentialLoad => write!(f, "Credential load failed"),
        }
    }
}

impl core::error::Error for ClientError {}

impl From<RxError> for ClientError {
    fn from(e: RxError) -> Self {
        Self::Rx(e)
    }
}

impl embedded_io::Error for ClientError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::NotConnected => embedded_io::ErrorKind::NotConnected,
            Self::Handshake(_) => embedded_io::ErrorKind::ConnectionRefused,
            Self::Send(_) => embedded_io::ErrorKind::BrokenPipe,
            Self::Rx(e) => embedded_io::Error::kind(e),
            Self::CreateFailed | Self::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            Self::CredentialLoad => embedded_io::ErrorKind::InvalidData,
        }
    }
}
