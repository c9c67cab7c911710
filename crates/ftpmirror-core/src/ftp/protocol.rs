//! Control-channel codec (RFC 959 §4).
//!
//! Writes CRLF-terminated commands and reads single- and multi-line
//! replies. Every read is bounded by the session timeout.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::types::FtpResponse;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

type BoxedReader = BufReader<Box<dyn AsyncRead + Unpin + Send>>;
type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// The command/reply codec operating on split halves of the control stream.
pub struct FtpCodec {
    reader: BoxedReader,
    writer: BoxedWriter,
    read_timeout: Duration,
}

impl FtpCodec {
    pub fn from_tcp(stream: TcpStream, read_timeout: Duration) -> Self {
        let (rd, wr) = stream.into_split();
        Self::from_halves(rd, wr, read_timeout)
    }

    /// Build a codec over arbitrary halves (used with in-memory pipes in tests).
    pub fn from_halves<R, W>(reader: R, writer: W, read_timeout: Duration) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            reader: BufReader::new(Box::new(reader)),
            writer: Box::new(writer),
            read_timeout,
        }
    }

    /// Send a raw command; the CRLF is appended here.
    pub async fn send_command(&mut self, cmd: &str) -> FtpResult<()> {
        let line = format!("{}\r\n", cmd);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        if cmd.starts_with("PASS ") {
            log::trace!(">>> PASS ****");
        } else {
            log::trace!(">>> {}", cmd);
        }
        Ok(())
    }

    async fn read_line_raw(&mut self) -> FtpResult<String> {
        let mut buf = String::new();
        let n = timeout(self.read_timeout, self.reader.read_line(&mut buf))
            .await
            .map_err(|_| FtpError::timeout("Timed out waiting for server reply"))??;
        if n == 0 {
            return Err(FtpError::disconnected("Server closed connection"));
        }
        Ok(buf)
    }

    /// Read a complete reply.
    ///
    /// A multi-line reply opens with `NNN-` and ends at the first line
    /// starting with `NNN ` (same code, then a space).
    pub async fn read_response(&mut self) -> FtpResult<FtpResponse> {
        let first = self.read_line_raw().await?;
        let first = first.trim_end_matches(['\r', '\n']).to_string();
        let code = parse_code(&first)?;

        let mut lines = vec![first];
        if lines[0].as_bytes().get(3) == Some(&b'-') {
            let terminator = format!("{} ", code);
            loop {
                let next = self.read_line_raw().await?;
                let next = next.trim_end_matches(['\r', '\n']).to_string();
                let done = next.starts_with(&terminator) || next == code.to_string();
                lines.push(next);
                if done {
                    break;
                }
            }
        }

        let resp = FtpResponse { code, lines };
        log::trace!("<<< {}", resp.lines.last().map(String::as_str).unwrap_or_default());
        Ok(resp)
    }

    /// Send a command and return the reply.
    pub async fn execute(&mut self, cmd: &str) -> FtpResult<FtpResponse> {
        self.send_command(cmd).await?;
        self.read_response().await
    }

    /// Send a command and require a 2xx reply.
    pub async fn expect_ok(&mut self, cmd: &str) -> FtpResult<FtpResponse> {
        let resp = self.execute(cmd).await?;
        if !resp.is_completion() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }
        Ok(resp)
    }
}

/// Parse the 3-digit reply code from the start of a line.
fn parse_code(line: &str) -> FtpResult<u16> {
    let digits = line
        .get(..3)
        .ok_or_else(|| FtpError::protocol_error(format!("Reply too short: '{}'", line)))?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FtpError::protocol_error(format!(
            "Invalid reply code in: '{}'",
            line
        )));
    }
    digits
        .parse::<u16>()
        .map_err(|_| FtpError::protocol_error(format!("Invalid reply code in: '{}'", line)))
}
