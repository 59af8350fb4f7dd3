//! Embedded TLS client interface
//!
//! Mirrors the `sslclient_context` API of the vendor TLS library: a provider
//! creates contexts, a context owns one TCP socket plus one TLS session.
//!
//! Record reads go through the narrow [`SslRead`] trait so that buffering code
//! can be written (and tested) against `receive` alone.

/// `MBEDTLS_ERR_SSL_WANT_READ`
pub const ERR_SSL_WANT_READ: i32 = -0x6900;

/// `MBEDTLS_ERR_SSL_WANT_WRITE`
pub const ERR_SSL_WANT_WRITE: i32 = -0x6880;

/// Negative status code returned by the TLS library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SslError(pub i32);

impl SslError {
    pub fn code(&self) -> i32 {
        self.0
    }

    /// The session needs more input before it can produce plaintext
    pub fn is_want_read(&self) -> bool {
        self.0 == ERR_SSL_WANT_READ
    }

    /// The session needs to flush output before it can continue
    pub fn is_want_write(&self) -> bool {
        self.0 == ERR_SSL_WANT_WRITE
    }
}

impl core::fmt::Display for SslError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SSL error -0x{:04X}", self.0.unsigned_abs())
    }
}

impl core::error::Error for SslError {}

/// Socket state reported by a zero-length non-blocking `recv`
///
/// Values follow lwIP's `errno` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Errno {
    /// `EWOULDBLOCK`: socket open, nothing pending
    WouldBlock,
    /// `ENOENT`: raised by the VFS layer for open sockets
    NoEntry,
    /// `ENOTCONN`
    NotConnected,
    /// `EPIPE`
    BrokenPipe,
    /// `ECONNRESET`
    ConnectionReset,
    /// `ECONNREFUSED`
    ConnectionRefused,
    /// `ECONNABORTED`
    ConnectionAborted,
    /// Any other `errno` value
    Other(i32),
}

impl Errno {
    pub fn from_raw(errno: i32) -> Self {
        match errno {
            11 => Self::WouldBlock,
            2 => Self::NoEntry,
            128 => Self::NotConnected,
            32 => Self::BrokenPipe,
            104 => Self::ConnectionReset,
            111 => Self::ConnectionRefused,
            103 => Self::ConnectionAborted,
            other => Self::Other(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            Self::WouldBlock => 11,
            Self::NoEntry => 2,
            Self::NotConnected => 128,
            Self::BrokenPipe => 32,
            Self::ConnectionReset => 104,
            Self::ConnectionRefused => 111,
            Self::ConnectionAborted => 103,
            Self::Other(errno) => *errno,
        }
    }
}

/// Reading decrypted application data from a session
pub trait SslRead {
    /// Read up to `buf.len()` bytes (`get_ssl_receive`)
    ///
    /// `Ok(0)` means nothing is available right now. An error may be either
    /// transient (`ERR_SSL_WANT_READ`) or fatal; the code alone does not
    /// always tell which.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, SslError>;
}

impl<T: SslRead + ?Sized> SslRead for &mut T {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, SslError> {
        (**self).receive(buf)
    }
}

/// Parameters for `start_ssl_client`
///
/// Either the certificate fields or the PSK fields are populated.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartParams<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Socket timeout in milliseconds, 0 for the library default
    pub timeout_ms: u32,
    pub ca_cert: Option<&'a str>,
    pub certificate: Option<&'a str>,
    pub private_key: Option<&'a str>,
    pub psk_identity: Option<&'a str>,
    pub psk: Option<&'a str>,
}

/// One TLS session over one TCP socket
pub trait SslContext: SslRead {
    /// Read/handshake timeout in milliseconds (`ssl_set_timeout`)
    fn set_timeout(&mut self, timeout_ms: u32);

    /// Open the socket and run the handshake (`start_ssl_client`)
    fn start(&mut self, params: &StartParams<'_>) -> Result<(), SslError>;

    /// Close the session and its socket (`stop_ssl_socket`)
    fn stop(&mut self);

    /// Underlying socket descriptor, negative when closed
    fn socket(&self) -> i32;

    /// Write application data (`send_ssl_data`)
    fn send(&mut self, data: &[u8]) -> Result<usize, SslError>;

    /// Compare the peer certificate's SHA-256 fingerprint and optional name
    fn verify_fingerprint(&self, fingerprint: &str, domain: Option<&str>) -> bool;

    /// Probe the socket with a zero-length non-blocking receive
    fn probe(&mut self) -> Errno;
}

/// Factory for TLS contexts (`ssl_client_create` + `ssl_init`)
pub trait SslProvider {
    type Context: SslContext;

    /// Allocate and initialise a context, `None` when out of memory
    fn create(&mut self) -> Option<Self::Context>;

    /// Human readable description of a library error code (`ssl_strerror`)
    fn describe_error(&self, code: i32, out: &mut dyn core::fmt::Write) -> core::fmt::Result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_want_codes() {
        assert!(SslError(ERR_SSL_WANT_READ).is_want_read());
        assert!(SslError(ERR_SSL_WANT_WRITE).is_want_write());
        assert!(!SslError(-0x7780).is_want_read());
        assert_eq!(SslError(ERR_SSL_WANT_READ).to_string(), "SSL error -0x6900");
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(Errno::from_raw(11), Errno::WouldBlock);
        assert_eq!(Errno::from_raw(104), Errno::ConnectionReset);
        assert_eq!(Errno::from_raw(5), Errno::Other(5));
        assert_eq!(Errno::ConnectionAborted.raw(), 103);
        assert_eq!(Errno::Other(9).raw(), 9);
    }
}
