//! Directory listing over the data channel.

use crate::ftp::client::FtpClient;
use crate::ftp::error::FtpResult;
use std::borrow::Cow;

impl FtpClient {
    /// Issue `LIST [path]` and return the raw listing lines in server order.
    ///
    /// An empty `path` lists the current working directory. Bytes that are
    /// not valid UTF-8 are replaced rather than failing the whole listing.
    pub async fn list_lines(&mut self, path: &str) -> FtpResult<Vec<String>> {
        let cmd = if path.is_empty() {
            "LIST".to_string()
        } else {
            format!("LIST {}", path)
        };
        let mut body: Vec<u8> = Vec::new();
        self.retrieve_to(&cmd, &mut body).await?;

        let lines = split_listing(path, &body);
        log::debug!("LIST {} returned {} line(s)", path, lines.len());
        Ok(lines)
    }
}

/// Split a listing body into non-blank lines.
///
/// Names that are not valid UTF-8 come back with U+FFFD in place of the bad
/// bytes. Such a name no longer matches the file on the server, so a later
/// `RETR` of it will fail; a warning is logged when that happens.
pub(crate) fn split_listing(path: &str, body: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(body);
    if let Cow::Owned(_) = text {
        log::warn!(
            "LIST {}: listing is not valid UTF-8; affected names were altered and cannot be fetched",
            path
        );
    }
    text.lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .filter(|l| !l.trim().is_empty())
        .collect()
}
