//! Arduino-style Wi-Fi and secure client layer for RTW SoCs
//!
//! This crate carries the logic that sits between application code and the
//! vendor SDK; the SDK itself is reached only through the traits in
//! [`rtw_hal`], so everything here builds and tests on the host.
//!
//! - **[`Wifi`]**: mode control, station (`begin`, `status`, addressing
//!   getters) and soft access point (`soft_ap`, DHCP server setup)
//! - **[`SecureClient`]**: TLS stream client with keep-alive probing
//! - **[`RxBuffer`]**: staging buffer that turns record-sized TLS reads into
//!   reads of any length
//!
//! # Features
//!
//! - `defmt`: log through `defmt` and derive `defmt::Format` on public types
//! - `log`: log through the `log` facade when `defmt` is not enabled

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

// must come first so the logging macros are visible to the modules below
#[macro_use]
mod fmt;

pub mod addr;
mod ap;
pub mod config;
pub mod error;
pub mod rx_buffer;
pub mod secure_client;
mod station;
pub mod status;
pub mod wifi;

#[cfg(test)]
mod testing;

pub use ap::MAX_STA_CONNECT_NUM;
pub use config::{ApAddressing, SecureClientConfig, SoftApConfig, StaticIpConfig, StationConfig};
pub use error::{ClientError, RxError, WifiError};
pub use rx_buffer::{BufferAlloc, Heap, RxBuffer};
pub use secure_client::{Auth, LastError, SecureClient};
pub use status::{WifiEvent, WlStatus};
pub use wifi::{Wifi, WifiMode};
