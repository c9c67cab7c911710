//! Data-channel setup for LIST and RETR.
//!
//! - **PASV**: `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`, client connects
//! - **EPSV**: `229 Entering Extended Passive Mode (|||port|)`, client connects to the control host
//! - **PORT**: client binds an IPv4 listener and waits for the server

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::types::{ConnectConfig, DataChannelMode};
use lazy_static::lazy_static;
use regex::Regex;
use std::net::{IpAddr, SocketAddr};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

lazy_static! {
    static ref PASV_ADDR: Regex =
        Regex::new(r"(\d+),(\d+),(\d+),(\d+),(\d+),(\d+)").expect("PASV pattern compiles");
    static ref EPSV_PORT: Regex = Regex::new(r"\|\|\|(\d+)\|").expect("EPSV pattern compiles");
}

/// Where the data connection will come from once the transfer command is sent.
pub enum DataChannel {
    /// Already connected (passive modes).
    Connected(TcpStream),
    /// Listening for the server to connect back (active mode).
    Listening(TcpListener),
}

impl DataChannel {
    /// Resolve to a connected stream. For active mode this must be called
    /// after the transfer command, since the server connects only then.
    pub async fn into_stream(self, data_timeout: Duration) -> FtpResult<TcpStream> {
        match self {
            DataChannel::Connected(tcp) => Ok(tcp),
            DataChannel::Listening(listener) => {
                let (tcp, peer) = timeout(data_timeout, listener.accept())
                    .await
                    .map_err(|_| FtpError::data_channel("PORT accept timed out"))?
                    .map_err(|e| FtpError::data_channel(format!("PORT accept: {}", e)))?;
                log::debug!("Data connection accepted from {}", peer);
                Ok(tcp)
            }
        }
    }
}

/// Negotiate a data channel according to `config.data_channel_mode`.
///
/// `control_ip` is the local address of the control connection; active mode
/// listens there unless `active_bind_address` says otherwise.
pub async fn open_data_channel(
    codec: &mut FtpCodec,
    config: &ConnectConfig,
    control_ip: IpAddr,
) -> FtpResult<DataChannel> {
    let data_timeout = config.data_timeout();
    match config.data_channel_mode {
        DataChannelMode::Passive => {
            let resp = codec.expect_ok("PASV").await?;
            let mut addr = parse_pasv_response(&resp.text())?;
            // Servers behind NAT sometimes announce 0.0.0.0.
            if addr.ip().is_unspecified() {
                addr = resolve_control_host(&config.host, addr.port()).await?;
            }
            connect_data(addr, data_timeout).await.map(DataChannel::Connected)
        }
        DataChannelMode::ExtendedPassive => {
            let resp = codec.expect_ok("EPSV").await?;
            let port = parse_epsv_response(&resp.text())?;
            let addr = resolve_control_host(&config.host, port).await?;
            connect_data(addr, data_timeout).await.map(DataChannel::Connected)
        }
        DataChannelMode::Active => {
            let bind = match config.active_bind_address.as_deref() {
                Some(addr) => addr
                    .parse::<IpAddr>()
                    .map_err(|_| FtpError::invalid_config(format!("Bad bind address: {}", addr)))?,
                None => control_ip,
            };
            let listener = TcpListener::bind(SocketAddr::new(bind, 0))
                .await
                .map_err(|e| FtpError::data_channel(format!("PORT bind: {}", e)))?;
            let local = listener
                .local_addr()
                .map_err(|e| FtpError::data_channel(format!("PORT local_addr: {}", e)))?;
            codec.expect_ok(&format_port_command(local)?).await?;
            Ok(DataChannel::Listening(listener))
        }
    }
}

async fn connect_data(addr: SocketAddr, data_timeout: Duration) -> FtpResult<TcpStream> {
    log::debug!("Opening data connection to {}", addr);
    timeout(data_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| FtpError::data_channel(format!("Data connect to {} timed out", addr)))?
        .map_err(|e| FtpError::data_channel(format!("Data connect to {}: {}", addr, e)))
}

async fn resolve_control_host(host: &str, port: u16) -> FtpResult<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| FtpError::data_channel(format!("Resolve {}: {}", host, e)))?
        .next()
        .ok_or_else(|| FtpError::data_channel(format!("No address for {}", host)))
}

/// Parse `(h1,h2,h3,h4,p1,p2)` from a 227 reply.
fn parse_pasv_response(text: &str) -> FtpResult<SocketAddr> {
    let caps = PASV_ADDR
        .captures(text)
        .ok_or_else(|| FtpError::protocol_error(format!("Cannot parse PASV: {}", text)))?;

    let mut nums = [0u8; 6];
    for (i, slot) in nums.iter_mut().enumerate() {
        *slot = caps[i + 1]
            .parse::<u8>()
            .map_err(|_| FtpError::protocol_error(format!("PASV number out of range: {}", text)))?;
    }

    let ip = IpAddr::from([nums[0], nums[1], nums[2], nums[3]]);
    let port = u16::from(nums[4]) * 256 + u16::from(nums[5]);
    Ok(SocketAddr::new(ip, port))
}

/// Parse the port from `(|||port|)` in a 229 reply.
fn parse_epsv_response(text: &str) -> FtpResult<u16> {
    let caps = EPSV_PORT
        .captures(text)
        .ok_or_else(|| FtpError::protocol_error(format!("Cannot parse EPSV: {}", text)))?;
    caps[1]
        .parse::<u16>()
        .map_err(|_| FtpError::protocol_error(format!("EPSV port out of range: {}", text)))
}

fn format_port_command(local: SocketAddr) -> FtpResult<String> {
    let octets = match local.ip() {
        IpAddr::V4(v4) => v4.octets(),
        IpAddr::V6(_) => return Err(FtpError::data_channel("PORT requires an IPv4 bind address")),
    };
    let port = local.port();
    Ok(format!(
        "PORT {},{},{},{},{},{}",
        octets[0],
        octets[1],
        octets[2],
        octets[3],
        port / 256,
        port % 256
    ))
}
