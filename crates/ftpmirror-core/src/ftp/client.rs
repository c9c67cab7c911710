//! Stateful FTP client: owns the control connection and issues commands.
//!
//! Lifecycle: `connect()` → banner → USER/PASS → `OPTS UTF8 ON` → `TYPE I`.
//! Listing lives in `directory.rs`, retrieval in `file_ops.rs`.

use crate::ftp::connection;
use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::transfer;
use crate::ftp::types::{ConnectConfig, FtpResponse};
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Chunk size for data-channel reads (64 KiB).
const DATA_CHUNK: usize = 65_536;

/// A logged-in FTP session.
pub struct FtpClient {
    pub codec: FtpCodec,
    pub config: ConnectConfig,
    local_ip: IpAddr,
    connected: bool,
    pub bytes_downloaded: u64,
}

impl FtpClient {
    /// Connect, log in and switch to binary mode.
    pub async fn connect(config: ConnectConfig) -> FtpResult<Self> {
        if config.host.is_empty() {
            return Err(FtpError::invalid_config("Host must not be empty"));
        }

        log::info!("FTP connecting to {}", config.address());
        let control = connection::connect(&config).await?;
        let mut client = Self {
            codec: control.codec,
            local_ip: control.local_ip,
            config,
            connected: true,
            bytes_downloaded: 0,
        };

        client.login().await?;

        if client.config.utf8 {
            // Not every server knows OPTS; a rejection is harmless.
            let _ = client.codec.execute("OPTS UTF8 ON").await?;
        }
        client.codec.expect_ok("TYPE I").await?;

        log::info!(
            "FTP session to {} ready as '{}'",
            client.config.address(),
            client.config.username
        );
        Ok(client)
    }

    async fn login(&mut self) -> FtpResult<()> {
        let user = self
            .codec
            .execute(&format!("USER {}", self.config.username))
            .await?;
        if user.is_intermediate() {
            let pass = self
                .codec
                .execute(&format!("PASS {}", self.config.password))
                .await?;
            if !pass.is_completion() {
                return Err(FtpError::auth_failed(format!("Login failed: {}", pass.text()))
                    .with_code(pass.code));
            }
        } else if !user.is_completion() {
            return Err(FtpError::auth_failed(format!("USER rejected: {}", user.text()))
                .with_code(user.code));
        }
        Ok(())
    }

    /// Current working directory as reported by `PWD`.
    pub async fn pwd(&mut self) -> FtpResult<String> {
        let resp = self.codec.expect_ok("PWD").await?;
        parse_pwd(&resp.text())
    }

    /// Open a data channel, send `cmd` and copy everything the server sends
    /// into `sink`. Returns the number of bytes copied.
    ///
    /// The 1xx preliminary reply is followed by the completion reply once
    /// the data connection closes; both are consumed here.
    pub async fn retrieve_to<W>(&mut self, cmd: &str, sink: &mut W) -> FtpResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let channel = transfer::open_data_channel(&mut self.codec, &self.config, self.local_ip).await?;
        let resp = self.codec.execute(cmd).await?;
        if !resp.is_success() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }

        let data_timeout = self.config.data_timeout();
        let copied = match channel.into_stream(data_timeout).await {
            Ok(mut stream) => copy_data(&mut stream, sink, data_timeout, cmd).await,
            Err(e) => Err(e),
        };

        match copied {
            Ok(copied) => {
                if resp.is_preliminary() {
                    let done = self.codec.read_response().await?;
                    self.check_transfer_complete(&done)?;
                }
                Ok(copied)
            }
            Err(e) => {
                // The data socket is gone; drain the server's closing reply
                // (usually 426) so the next command lines up with its answer.
                if resp.is_preliminary() {
                    match self.codec.read_response().await {
                        Ok(done) => log::debug!("Transfer aborted, server said: {}", done.text()),
                        Err(drain) => log::debug!("No closing reply after aborted transfer: {}", drain),
                    }
                }
                Err(e)
            }
        }
    }

    fn check_transfer_complete(&self, done: &FtpResponse) -> FtpResult<()> {
        if done.is_completion() {
            Ok(())
        } else {
            Err(FtpError::from_reply(done.code, &done.text()))
        }
    }

    /// Gracefully close the session. Errors on the way out are ignored.
    pub async fn quit(&mut self) -> FtpResult<()> {
        if self.connected {
            let _ = self.codec.execute("QUIT").await;
            self.connected = false;
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

async fn copy_data<W>(
    stream: &mut TcpStream,
    sink: &mut W,
    data_timeout: Duration,
    cmd: &str,
) -> FtpResult<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; DATA_CHUNK];
    let mut copied = 0u64;
    loop {
        let n = timeout(data_timeout, stream.read(&mut buf))
            .await
            .map_err(|_| FtpError::timeout(format!("Data transfer stalled during '{}'", cmd)))??;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await?;
        copied += n as u64;
    }
    sink.flush().await?;
    Ok(copied)
}

/// Parse `257 "/some/path" is current directory` into the path.
///
/// Embedded quotes are doubled by the server (RFC 959 appendix II).
pub(crate) fn parse_pwd(text: &str) -> FtpResult<String> {
    let start = text
        .find('"')
        .ok_or_else(|| FtpError::protocol_error(format!("Cannot parse PWD: {}", text)))?;
    let mut path = String::new();
    let mut chars = text[start + 1..].chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                path.push('"');
            } else {
                return Ok(path);
            }
        } else {
            path.push(c);
        }
    }
    Err(FtpError::protocol_error(format!("Cannot parse PWD: {}", text)))
}
