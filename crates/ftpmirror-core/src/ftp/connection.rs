//! TCP transport for the control connection.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::types::ConnectConfig;
use std::net::IpAddr;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// An open control connection before login.
pub struct Control {
    pub codec: FtpCodec,
    /// Local address of the control socket; active-mode data listeners bind here.
    pub local_ip: IpAddr,
}

/// Open the control connection and read the welcome banner.
pub async fn connect(config: &ConnectConfig) -> FtpResult<Control> {
    let addr = config.address();
    let dur = config.control_timeout();

    let tcp = timeout(dur, TcpStream::connect(&addr))
        .await
        .map_err(|_| FtpError::timeout(format!("TCP connect to {} timed out", addr)))?
        .map_err(|e| FtpError::connection_failed(format!("TCP connect to {}: {}", addr, e)))?;
    tcp.set_nodelay(true).ok();
    let local_ip = tcp
        .local_addr()
        .map(|a| a.ip())
        .map_err(|e| FtpError::connection_failed(format!("local_addr: {}", e)))?;

    let mut codec = FtpCodec::from_tcp(tcp, dur);
    let banner = codec.read_response().await?;
    if !banner.is_completion() {
        return Err(FtpError::from_reply(banner.code, &banner.text()));
    }
    log::debug!("Connected to {}: {}", addr, banner.text());
    Ok(Control { codec, local_ip })
}
