//! Hardware abstraction traits for the RTW Wi-Fi SDK
//!
//! This crate defines the seams between the Arduino-style API in `rtw-wifi`
//! and the vendor SDK. A board support package implements these traits on top
//! of the C functions (`wifi_*`, `tcpip_adapter_*`, `ssl_*`); nothing here
//! links the SDK itself.
//!
//! - **`wifi`**: RTW driver (power, association, soft-AP, fast-reconnect data)
//! - **`netif`**: lwIP TCP/IP adapter (DHCP, IP info, DNS, hostname, IPv6)
//! - **`ssl`**: embedded TLS client (session lifecycle, record I/O)
//! - **`clock`**: millisecond time source used for keep-alive probing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod error;
pub mod netif;
pub mod ssl;
pub mod wifi;

pub use clock::Clock;
pub use error::HalError;
pub use netif::NetifAdapter;
pub use ssl::{SslContext, SslProvider, SslRead};
pub use wifi::WifiDriver;
