//! In-memory stand-ins for the SDK, used by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use rtw_hal::netif::{DhcpsLease, DnsSlot, Interface, IpInfo, HOSTNAME_MAX_LEN};
use rtw_hal::ssl::{Errno, SslError, StartParams};
use rtw_hal::wifi::{
    ApRequest, ConnectRequest, ReconnectProfile, RtwMode, Security, WifiSetting, WlanPort,
    MAC_LEN,
};
use rtw_hal::{
    Clock, HalError, NetifAdapter, SslContext, SslProvider, SslRead, WifiDriver,
};

type Script = VecDeque<Result<Vec<u8>, SslError>>;

/// Pop the next scripted receive; the unread tail of a chunk stays queued
fn deliver(script: &mut Script, buf: &mut [u8]) -> Result<usize, SslError> {
    match script.pop_front() {
        None => Ok(0),
        Some(Err(e)) => Err(e),
        Some(Ok(mut chunk)) => {
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                script.push_front(Ok(chunk.split_off(n)));
            }
            Ok(n)
        }
    }
}

/// Receive side of a TLS session fed from a script
///
/// An exhausted script yields `Ok(0)` forever.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Script,
    /// Buffer length offered by each receive call
    pub requests: Vec<usize>,
    /// Count returned by each receive call, 0 for errors
    pub yields: Vec<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk(mut self, bytes: &[u8]) -> Self {
        self.push_chunk(bytes);
        self
    }

    pub fn error(mut self, code: i32) -> Self {
        self.push_error(code);
        self
    }

    pub fn push_chunk(&mut self, bytes: &[u8]) {
        self.script.push_back(Ok(bytes.to_vec()));
    }

    pub fn push_error(&mut self, code: i32) {
        self.script.push_back(Err(SslError(code)));
    }
}

impl SslRead for ScriptedTransport {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, SslError> {
        self.requests.push(buf.len());
        let result = deliver(&mut self.script, buf);
        self.yields.push(*result.as_ref().unwrap_or(&0));
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRecord {
    pub ssid: String,
    pub security: Security,
    pub passphrase: Option<String>,
    pub bssid: Option<[u8; MAC_LEN]>,
    pub key_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApRecord {
    pub ssid: String,
    pub security: Security,
    pub passphrase: Option<String>,
    pub channel: u8,
    pub hidden: bool,
}

/// Wi-Fi driver that records calls and associates on request
#[derive(Debug)]
pub struct MockDriver {
    pub ops: Vec<String>,
    pub powered: Option<RtwMode>,
    pub associated: bool,
    pub associate_on_connect: bool,
    pub fail_on: bool,
    pub fail_scan_channel: bool,
    pub fail_connect: bool,
    pub fail_start_ap: bool,
    pub scan_channel: Option<(u8, bool)>,
    pub profile: Option<ReconnectProfile>,
    pub setting: WifiSetting,
    pub setting_port: Cell<Option<WlanPort>>,
    pub last_connect: Option<ConnectRecord>,
    pub last_ap: Option<ApRecord>,
    pub bssid: [u8; MAC_LEN],
    pub rssi: i32,
    pub clients: usize,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            powered: None,
            associated: false,
            associate_on_connect: true,
            fail_on: false,
            fail_scan_channel: false,
            fail_connect: false,
            fail_start_ap: false,
            scan_channel: None,
            profile: None,
            setting: WifiSetting::default(),
            setting_port: Cell::new(None),
            last_connect: None,
            last_ap: None,
            bssid: [0; MAC_LEN],
            rssi: -50,
            clients: 0,
        }
    }
}

impl WifiDriver for MockDriver {
    fn on(&mut self, mode: RtwMode) -> Result<(), HalError> {
        self.ops.push(format!("on({:?})", mode));
        if self.fail_on {
            return Err(HalError::RTW_ERROR);
        }
        self.powered = Some(mode);
        Ok(())
    }

    fn off(&mut self) -> Result<(), HalError> {
        self.ops.push("off".into());
        self.powered = None;
        self.associated = false;
        Ok(())
    }

    fn set_scan_channel(&mut self, channel: u8, fast_survey: bool) -> Result<(), HalError> {
        self.ops.push(format!("set_scan_channel({})", channel));
        if self.fail_scan_channel {
            return Err(HalError::RTW_ERROR);
        }
        self.scan_channel = Some((channel, fast_survey));
        Ok(())
    }

    fn connect(&mut self, request: &ConnectRequest<'_>) -> Result<(), HalError> {
        if self.fail_connect {
            return Err(HalError::RTW_ERROR);
        }
        self.last_connect = Some(ConnectRecord {
            ssid: request.ssid.into(),
            security: request.security,
            passphrase: request.passphrase.map(Into::into),
            bssid: request.bssid,
            key_id: request.key_id,
        });
        self.associated = self.associate_on_connect;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), HalError> {
        self.associated = false;
        Ok(())
    }

    fn is_connected_to_ap(&self) -> bool {
        self.associated
    }

    fn reconnect_profile(&self) -> Option<ReconnectProfile> {
        self.profile.clone()
    }

    fn clear_reconnect_profile(&mut self) -> Result<(), HalError> {
        self.profile = None;
        Ok(())
    }

    fn setting(&self, port: WlanPort) -> Result<WifiSetting, HalError> {
        self.setting_port.set(Some(port));
        Ok(self.setting.clone())
    }

    fn ap_bssid(&self) -> Result<[u8; MAC_LEN], HalError> {
        Ok(self.bssid)
    }

    fn rssi(&self) -> Result<i32, HalError> {
        Ok(self.rssi)
    }

    fn start_ap(&mut self, request: &ApRequest<'_>) -> Result<(), HalError> {
        if self.fail_start_ap {
            return Err(HalError::RTW_ERROR);
        }
        self.last_ap = Some(ApRecord {
            ssid: request.ssid.into(),
            security: request.security,
            passphrase: request.passphrase.map(Into::into),
            channel: request.channel,
            hidden: request.hidden,
        });
        Ok(())
    }

    fn associated_clients(&self, _max: usize) -> Result<usize, HalError> {
        Ok(self.clients)
    }
}

/// TCP/IP adapter keeping interface state in memory
#[derive(Debug)]
pub struct MockNetif {
    pub ops: Vec<String>,
    pub sta_ip: IpInfo,
    pub ap_ip: IpInfo,
    pub dns: [Ipv4Addr; 2],
    pub lease: Option<DhcpsLease>,
    pub dhcpc_running: bool,
    pub dhcps_running: bool,
    pub dhcpc_start_error: Option<HalError>,
    pub fail_set_ip: bool,
    pub fail_set_dns: bool,
    pub fail_dhcps_start: bool,
    pub sta_mac: [u8; MAC_LEN],
    pub ap_mac: [u8; MAC_LEN],
    pub hostnames: [heapless::String<HOSTNAME_MAX_LEN>; 2],
    pub ip6: [Option<Ipv6Addr>; 2],
}

impl Default for MockNetif {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            sta_ip: IpInfo::UNSPECIFIED,
            ap_ip: IpInfo::UNSPECIFIED,
            dns: [Ipv4Addr::UNSPECIFIED; 2],
            lease: None,
            dhcpc_running: false,
            dhcps_running: false,
            dhcpc_start_error: None,
            fail_set_ip: false,
            fail_set_dns: false,
            fail_dhcps_start: false,
            sta_mac: [0; MAC_LEN],
            ap_mac: [0; MAC_LEN],
            hostnames: Default::default(),
            ip6: [None; 2],
        }
    }
}

fn slot(iface: Interface) -> usize {
    match iface {
        Interface::Station => 0,
        Interface::AccessPoint => 1,
    }
}

impl NetifAdapter for MockNetif {
    fn up(&mut self, iface: Interface) -> Result<(), HalError> {
        self.ops.push(format!("up({:?})", iface));
        Ok(())
    }

    fn dhcpc_start(&mut self, _iface: Interface) -> Result<(), HalError> {
        if let Some(e) = self.dhcpc_start_error {
            return Err(e);
        }
        self.dhcpc_running = true;
        Ok(())
    }

    fn dhcpc_stop(&mut self, _iface: Interface) -> Result<(), HalError> {
        if !self.dhcpc_running {
            return Err(HalError::DhcpAlreadyStopped);
        }
        self.dhcpc_running = false;
        Ok(())
    }

    fn dhcps_start(&mut self, iface: Interface) -> Result<(), HalError> {
        self.ops.push(format!("dhcps_start({:?})", iface));
        if self.fail_dhcps_start {
            return Err(HalError::Tcpip(-1));
        }
        self.dhcps_running = true;
        Ok(())
    }

    fn dhcps_stop(&mut self, iface: Interface) -> Result<(), HalError> {
        self.ops.push(format!("dhcps_stop({:?})", iface));
        self.dhcps_running = false;
        Ok(())
    }

    fn set_dhcps_lease(&mut self, lease: &DhcpsLease) -> Result<(), HalError> {
        self.ops.push("set_dhcps_lease".into());
        self.lease = Some(*lease);
        Ok(())
    }

    fn ip_info(&self, iface: Interface) -> Result<IpInfo, HalError> {
        Ok(match iface {
            Interface::Station => self.sta_ip,
            Interface::AccessPoint => self.ap_ip,
        })
    }

    fn set_ip_info(&mut self, iface: Interface, info: &IpInfo) -> Result<(), HalError> {
        self.ops.push(format!("set_ip_info({:?})", iface));
        if self.fail_set_ip {
            return Err(HalError::Tcpip(-6));
        }
        match iface {
            Interface::Station => self.sta_ip = *info,
            Interface::AccessPoint => self.ap_ip = *info,
        }
        Ok(())
    }

    fn dns(&self, slot: DnsSlot) -> Result<Ipv4Addr, HalError> {
        Ok(self.dns[slot as usize])
    }

    fn set_dns(&mut self, slot: DnsSlot, addr: Ipv4Addr) -> Result<(), HalError> {
        if self.fail_set_dns {
            return Err(HalError::Tcpip(-6));
        }
        self.dns[slot as usize] = addr;
        Ok(())
    }

    fn mac(&self, iface: Interface) -> Result<[u8; MAC_LEN], HalError> {
        Ok(match iface {
            Interface::Station => self.sta_mac,
            Interface::AccessPoint => self.ap_mac,
        })
    }

    fn hostname(&self, iface: Interface) -> Result<heapless::String<HOSTNAME_MAX_LEN>, HalError> {
        Ok(self.hostnames[slot(iface)].clone())
    }

    fn set_hostname(&mut self, iface: Interface, hostname: &str) -> Result<(), HalError> {
        self.hostnames[slot(iface)] = hostname.try_into().map_err(|_| HalError::InvalidArgs)?;
        Ok(())
    }

    fn create_ip6_linklocal(&mut self, iface: Interface) -> Result<(), HalError> {
        self.ip6[slot(iface)] = Some(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1));
        Ok(())
    }

    fn ip6_linklocal(&self, iface: Interface) -> Result<Ipv6Addr, HalError> {
        self.ip6[slot(iface)].ok_or(HalError::InterfaceNotReady)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRecord {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u32,
    pub ca_cert: Option<String>,
    pub certificate: Option<String>,
    pub private_key: Option<String>,
    pub psk_identity: Option<String>,
    pub psk: Option<String>,
}

/// State shared between a [`MockProvider`] and the contexts it creates
#[derive(Debug, Default)]
pub struct SslState {
    pub created: usize,
    pub dropped: usize,
    pub stops: usize,
    pub fail_create: bool,
    /// Handshake result code, `None` for success
    pub start_error: Option<i32>,
    pub starts: Vec<StartRecord>,
    pub timeout_ms: Option<u32>,
    pub rx: Script,
    pub sent: Vec<u8>,
    pub send_error: Option<i32>,
    /// Errno reported by the keep-alive probe, `None` for would-block
    pub probe: Option<Errno>,
    pub probes: usize,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockProvider {
    state: Rc<RefCell<SslState>>,
}

impl MockProvider {
    pub fn state(&self) -> Rc<RefCell<SslState>> {
        Rc::clone(&self.state)
    }
}

impl SslProvider for MockProvider {
    type Context = MockContext;

    fn create(&mut self) -> Option<MockContext> {
        let mut state = self.state.borrow_mut();
        if state.fail_create {
            return None;
        }
        state.created += 1;
        Some(MockContext {
            state: Rc::clone(&self.state),
            socket: 3 + state.created as i32,
        })
    }

    fn describe_error(&self, code: i32, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        write!(out, "SSL - mock failure -0x{:04X}", code.unsigned_abs())
    }
}

pub struct MockContext {
    state: Rc<RefCell<SslState>>,
    socket: i32,
}

impl SslRead for MockContext {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, SslError> {
        deliver(&mut self.state.borrow_mut().rx, buf)
    }
}

impl SslContext for MockContext {
    fn set_timeout(&mut self, timeout_ms: u32) {
        self.state.borrow_mut().timeout_ms = Some(timeout_ms);
    }

    fn start(&mut self, params: &StartParams<'_>) -> Result<(), SslError> {
        let mut state = self.state.borrow_mut();
        state.starts.push(StartRecord {
            host: params.host.into(),
            port: params.port,
            timeout_ms: params.timeout_ms,
            ca_cert: params.ca_cert.map(Into::into),
            certificate: params.certificate.map(Into::into),
            private_key: params.private_key.map(Into::into),
            psk_identity: params.psk_identity.map(Into::into),
            psk: params.psk.map(Into::into),
        });
        match state.start_error {
            Some(code) => Err(SslError(code)),
            None => Ok(()),
        }
    }

    fn stop(&mut self) {
        self.state.borrow_mut().stops += 1;
    }

    fn socket(&self) -> i32 {
        self.socket
    }

    fn send(&mut self, data: &[u8]) -> Result<usize, SslError> {
        let mut state = self.state.borrow_mut();
        if let Some(code) = state.send_error {
            return Err(SslError(code));
        }
        state.sent.extend_from_slice(data);
        Ok(data.len())
    }

    fn verify_fingerprint(&self, fingerprint: &str, _domain: Option<&str>) -> bool {
        self.state.borrow().fingerprint.as_deref() == Some(fingerprint)
    }

    fn probe(&mut self) -> Errno {
        let mut state = self.state.borrow_mut();
        state.probes += 1;
        state.probe.unwrap_or(Errno::WouldBlock)
    }
}

impl Drop for MockContext {
    fn drop(&mut self) {
        self.state.borrow_mut().dropped += 1;
    }
}

/// Millisecond clock advanced by hand
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<u64>,
}

impl MockClock {
    pub fn at(now_ms: u64) -> Self {
        Self {
            now: Cell::new(now_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Delay that only accumulates the requested time
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ms: u32,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += ns / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}
