//! TLS client over the vendor TLS library
//!
//! [`SecureClient`] owns at most one TLS context at a time. The context is
//! created on the first connect and wrapped in an [`RxBuffer`] so reads of
//! any length can be served from TLS records of whatever size the peer sends.
//!
//! # Example
//!
//! ```ignore
//! let mut client = SecureClient::new(provider, clock);
//! client.set_ca_cert(ROOT_CA);
//! client.connect("example.com", 443)?;
//! client.write(b"GET / HTTP/1.0\r\n\r\n")?;
//! let n = client.read(&mut response)?;
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;
use core::net::IpAddr;

use rtw_hal::ssl::{Errno, StartParams};
use rtw_hal::{Clock, SslContext, SslProvider};

use crate::config::SecureClientConfig;
use crate::error::ClientError;
use crate::rx_buffer::RxBuffer;

/// Longest message kept by [`SecureClient::last_error`]
pub const LAST_ERROR_MAX_LEN: usize = 100;

/// Longest textual IP address, an IPv4-mapped IPv6 address
const IP_STRING_MAX_LEN: usize = 45;

/// Handshake authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    /// X.509: optional root CA plus optional client certificate and key
    Certificates {
        ca_cert: Option<&'a str>,
        certificate: Option<&'a str>,
        private_key: Option<&'a str>,
    },
    PreSharedKey { identity: &'a str, key: &'a str },
}

/// Last handshake failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub code: i32,
    /// Library description, truncated to [`LAST_ERROR_MAX_LEN`] bytes
    pub message: heapless::String<LAST_ERROR_MAX_LEN>,
}

#[derive(Debug, Default)]
struct Credentials {
    ca_cert: Option<String>,
    certificate: Option<String>,
    private_key: Option<String>,
    psk_identity: Option<String>,
    psk: Option<String>,
}

impl Credentials {
    /// PSK when both halves are set, certificates otherwise
    fn auth(&self) -> Auth<'_> {
        match (self.psk_identity.as_deref(), self.psk.as_deref()) {
            (Some(identity), Some(key)) => Auth::PreSharedKey { identity, key },
            _ => Auth::Certificates {
                ca_cert: self.ca_cert.as_deref(),
                certificate: self.certificate.as_deref(),
                private_key: self.private_key.as_deref(),
            },
        }
    }
}

/// Secure stream client
pub struct SecureClient<P: SslProvider, C> {
    provider: P,
    clock: C,
    config: SecureClientConfig,
    session: Option<RxBuffer<P::Context>>,
    connected: bool,
    socket: i32,
    credentials: Credentials,
    last_error: i32,
    last_probe_ms: u64,
}

impl<P: SslProvider, C: Clock> SecureClient<P, C> {
    pub fn new(provider: P, clock: C) -> Self {
        Self::with_config(provider, clock, SecureClientConfig::default())
    }

    pub fn with_config(provider: P, clock: C, config: SecureClientConfig) -> Self {
        Self {
            provider,
            clock,
            config,
            session: None,
            connected: false,
            socket: -1,
            credentials: Credentials::default(),
            last_error: 0,
            last_probe_ms: 0,
        }
    }

    /// Connect using the stored credentials
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), ClientError> {
        let credentials = core::mem::take(&mut self.credentials);
        let result = self.connect_with(host, port, credentials.auth());
        self.credentials = credentials;
        result
    }

    /// Connect with a socket and handshake timeout in milliseconds
    pub fn connect_with_timeout(
        &mut self,
        host: &str,
        port: u16,
        timeout_ms: u32,
    ) -> Result<(), ClientError> {
        self.config.timeout_ms = timeout_ms;
        self.connect(host, port)
    }

    /// Connect to an address; certificate host checks see its textual form
    pub fn connect_addr(&mut self, addr: IpAddr, port: u16) -> Result<(), ClientError> {
        let mut host = heapless::String::<IP_STRING_MAX_LEN>::new();
        write!(host, "{}", addr).expect("IP address should fit");
        self.connect(&host, port)
    }

    /// Open a TLS session with explicit credentials
    ///
    /// Any buffered bytes from a previous session are discarded. On a
    /// handshake failure the code is kept for [`last_error`](Self::last_error)
    /// and the client is stopped.
    pub fn connect_with(&mut self, host: &str, port: u16, auth: Auth<'_>) -> Result<(), ClientError> {
        let context = match self.session.take() {
            Some(session) => session.into_inner(),
            None => match self.provider.create() {
                Some(context) => context,
                None => {
                    error!("ssl_client_create: error");
                    self.stop();
                    return Err(ClientError::CreateFailed);
                }
            },
        };
        let mut session = RxBuffer::with_capacity(context, self.config.rx_buffer_capacity);

        let timeout_ms = self.config.timeout_ms;
        if timeout_ms > 0 {
            session.get_mut().set_timeout(timeout_ms);
        }

        let mut params = StartParams {
            host,
            port,
            timeout_ms,
            ..Default::default()
        };
        match auth {
            Auth::Certificates {
                ca_cert,
                certificate,
                private_key,
            } => {
                params.ca_cert = ca_cert;
                params.certificate = certificate;
                params.private_key = private_key;
            }
            Auth::PreSharedKey { identity, key } => {
                trace!("start_ssl_client with PSK");
                params.psk_identity = Some(identity);
                params.psk = Some(key);
            }
        }

        let started = session.get_mut().start(&params);
        let socket = session.get_ref().socket();
        self.session = Some(session);

        if let Err(e) = started {
            error!("start_ssl_client: {}", e.code());
            self.last_error = e.code();
            self.stop();
            return Err(ClientError::Handshake(e.code()));
        }

        self.last_error = 0;
        self.socket = socket;
        self.connected = true;
        debug!("TLS session open on fd {}", socket);
        Ok(())
    }

    /// Whether the session is still up
    ///
    /// Probes the socket at most once per keep-alive interval. Errors other
    /// than a closed connection leave the client connected.
    pub fn connected(&mut self) -> bool {
        let now = self.clock.now_ms();
        if !self.connected
            || now.wrapping_sub(self.last_probe_ms) <= self.config.keepalive_interval_ms
        {
            return self.connected;
        }
        let Some(session) = self.session.as_mut() else {
            self.connected = false;
            return false;
        };

        match session.get_mut().probe() {
            Errno::WouldBlock | Errno::NoEntry => self.last_probe_ms = now,
            errno @ (Errno::NotConnected
            | Errno::BrokenPipe
            | Errno::ConnectionReset
            | Errno::ConnectionRefused
            | Errno::ConnectionAborted) => {
                debug!("Disconnected: errno {}", errno.raw());
                self.connected = false;
            }
            errno => {
                info!("Unexpected: errno {}", errno.raw());
                self.last_probe_ms = now;
            }
        }
        self.connected
    }
}

impl<P: SslProvider, C> SecureClient<P, C> {
    /// Close the session and release the TLS context
    pub fn stop(&mut self) {
        self.connected = false;
        self.socket = -1;
        if let Some(session) = self.session.take() {
            let mut context = session.into_inner();
            context.stop();
        }
    }

    /// Read up to `buf.len()` bytes; see [`RxBuffer::read`]
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ClientError> {
        let session = self.session.as_mut().ok_or(ClientError::NotConnected)?;
        let result = session.read(buf);
        self.stop_if_failed();
        Ok(result?)
    }

    pub fn read_byte(&mut self) -> Result<u8, ClientError> {
        let mut byte = [0u8];
        self.read(&mut byte)?;
        Ok(byte[0])
    }

    pub fn peek(&mut self) -> Result<u8, ClientError> {
        let session = self.session.as_mut().ok_or(ClientError::NotConnected)?;
        let result = session.peek();
        self.stop_if_failed();
        Ok(result?)
    }

    /// Buffered byte count; 0 without a session
    pub fn available(&mut self) -> Result<usize, ClientError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };
        let result = session.available();
        self.stop_if_failed();
        Ok(result?)
    }

    /// Send `data`; a send failure stops the client
    pub fn write(&mut self, data: &[u8]) -> Result<usize, ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        let session = self.session.as_mut().ok_or(ClientError::NotConnected)?;
        match session.get_mut().send(data) {
            Ok(n) => Ok(n),
            Err(e) => {
                error!("send_ssl_data: {}", e.code());
                self.stop();
                Err(ClientError::Send(e.code()))
            }
        }
    }

    pub fn set_ca_cert(&mut self, pem: &str) {
        self.credentials.ca_cert = Some(pem.into());
    }

    pub fn set_certificate(&mut self, pem: &str) {
        self.credentials.certificate = Some(pem.into());
    }

    pub fn set_private_key(&mut self, pem: &str) {
        self.credentials.private_key = Some(pem.into());
    }

    /// Use TLS-PSK on the next [`connect`](SecureClient::connect)
    pub fn set_pre_shared_key(&mut self, identity: &str, key: &str) {
        self.credentials.psk_identity = Some(identity.into());
        self.credentials.psk = Some(key.into());
    }

    /// Read a `size`-byte PEM root certificate from `stream`
    pub fn load_ca_cert<R: embedded_io::Read>(
        &mut self,
        stream: &mut R,
        size: usize,
    ) -> Result<(), ClientError> {
        self.credentials.ca_cert = Some(load_pem(stream, size)?);
        Ok(())
    }

    pub fn load_certificate<R: embedded_io::Read>(
        &mut self,
        stream: &mut R,
        size: usize,
    ) -> Result<(), ClientError> {
        self.credentials.certificate = Some(load_pem(stream, size)?);
        Ok(())
    }

    pub fn load_private_key<R: embedded_io::Read>(
        &mut self,
        stream: &mut R,
        size: usize,
    ) -> Result<(), ClientError> {
        self.credentials.private_key = Some(load_pem(stream, size)?);
        Ok(())
    }

    /// Check the peer certificate's SHA-256 fingerprint and optionally its name
    pub fn verify(&self, fingerprint: &str, domain: Option<&str>) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.get_ref().verify_fingerprint(fingerprint, domain))
    }

    /// Code and description of the last handshake failure
    pub fn last_error(&self) -> Option<LastError> {
        if self.last_error == 0 {
            return None;
        }
        let mut message = heapless::String::new();
        if self
            .provider
            .describe_error(self.last_error, &mut Truncate(&mut message))
            .is_err()
        {
            warn!("Could not describe SSL error {}", self.last_error);
        }
        Some(LastError {
            code: self.last_error,
            message,
        })
    }

    /// Handshake timeout for this and later sessions
    pub fn set_handshake_timeout(&mut self, secs: u32) {
        self.config.timeout_ms = secs.saturating_mul(1000);
        if let Some(session) = self.session.as_mut() {
            session.get_mut().set_timeout(self.config.timeout_ms);
        }
    }

    /// Socket descriptor, -1 when not connected
    pub fn fd(&self) -> i32 {
        self.socket
    }

    fn stop_if_failed(&mut self) {
        if self.session.as_ref().is_some_and(|session| session.failed()) {
            error!("fail on fd {}: receive buffer unavailable", self.socket);
            self.stop();
        }
    }
}

impl<P: SslProvider, C> Drop for SecureClient<P, C> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn load_pem<R: embedded_io::Read>(stream: &mut R, size: usize) -> Result<String, ClientError> {
    let mut pem = Vec::new();
    pem.try_reserve_exact(size)
        .map_err(|_| ClientError::OutOfMemory)?;
    pem.resize(size, 0);
    stream
        .read_exact(&mut pem)
        .map_err(|_| ClientError::CredentialLoad)?;
    String::from_utf8(pem).map_err(|_| ClientError::CredentialLoad)
}

/// Writer that drops whatever does not fit
struct Truncate<'a, const N: usize>(&'a mut heapless::String<N>);

impl<const N: usize> core::fmt::Write for Truncate<'_, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

impl<P: SslProvider, C> embedded_io::ErrorType for SecureClient<P, C> {
    type Error = ClientError;
}

/// `Ok(0)` only for an empty `buf`; no data yet is `RxError::WouldBlock`
impl<P: SslProvider, C> embedded_io::Read for SecureClient<P, C> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        SecureClient::read(self, buf)
    }
}

impl<P: SslProvider, C> embedded_io::ReadReady for SecureClient<P, C> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.available()? > 0)
    }
}

impl<P: SslProvider, C> embedded_io::Write for SecureClient<P, C> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        SecureClient::write(self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
