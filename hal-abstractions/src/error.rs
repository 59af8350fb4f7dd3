//! SDK error codes

/// Errors reported by the RTW driver and the lwIP adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// RTW driver call failed with the given code (`RTW_ERROR` is -1)
    Rtw(i32),
    /// DHCP client or server was already stopped
    DhcpAlreadyStopped,
    /// DHCP client or server was already started
    DhcpAlreadyStarted,
    /// DHCP client could not be started
    DhcpStartFailed,
    /// Interface is not up yet
    InterfaceNotReady,
    /// Invalid argument passed to the adapter
    InvalidArgs,
    /// Any other TCP/IP adapter error code
    Tcpip(i32),
}

impl HalError {
    /// Generic `RTW_ERROR` result
    pub const RTW_ERROR: Self = Self::Rtw(-1);
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Rtw(code) => write!(f, "RTW driver error {}", code),
            Self::DhcpAlreadyStopped => write!(f, "DHCP already stopped"),
            Self::DhcpAlreadyStarted => write!(f, "DHCP already started"),
            Self::DhcpStartFailed => write!(f, "DHCP start failed"),
            Self::InterfaceNotReady => write!(f, "Interface not ready"),
            Self::InvalidArgs => write!(f, "Invalid arguments"),
            Self::Tcpip(code) => write!(f, "TCP/IP adapter error {}", code),
        }
    }
}

impl core::error::Error for HalError {}

impl embedded_io::Error for HalError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::InvalidArgs => embedded_io::ErrorKind::InvalidInput,
            Self::InterfaceNotReady => embedded_io::ErrorKind::NotConnected,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}
