//! File retrieval (`RETR`).

use crate::ftp::client::FtpClient;
use crate::ftp::error::FtpResult;
use tokio::io::AsyncWrite;

impl FtpClient {
    /// Stream the remote file at `remote_path` into `sink`.
    ///
    /// The session is left in binary mode by `connect`, so bytes arrive
    /// unchanged. Returns the number of bytes written.
    pub async fn download_to<W>(&mut self, remote_path: &str, sink: &mut W) -> FtpResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let bytes = self
            .retrieve_to(&format!("RETR {}", remote_path), sink)
            .await?;
        self.bytes_downloaded += bytes;
        log::debug!("RETR {} ({} bytes)", remote_path, bytes);
        Ok(bytes)
    }
}
