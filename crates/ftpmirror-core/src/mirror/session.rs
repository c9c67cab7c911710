//! The remote session the walker and executor drive.
//!
//! One session is one control connection. It is owned by the run and
//! lent out as `&mut`, so listing and transfers never overlap.

use crate::ftp::{FtpClient, FtpResult};
use async_trait::async_trait;
use tokio::io::AsyncWrite;

/// Remote capabilities consumed by the mirror.
#[async_trait]
pub trait RemoteSession: Send {
    /// Server-side current working directory.
    async fn working_directory(&mut self) -> FtpResult<String>;

    /// Raw listing lines for `path` in server order. An empty path lists
    /// the current working directory.
    async fn list_directory(&mut self, path: &str) -> FtpResult<Vec<String>>;

    /// Stream the remote file into `sink`, returning the byte count.
    async fn download_to(
        &mut self,
        remote_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> FtpResult<u64>;

    /// End the session.
    async fn close(&mut self) -> FtpResult<()>;

    /// Name used in progress and diagnostic messages.
    fn label(&self) -> &str;
}

#[async_trait]
impl RemoteSession for FtpClient {
    async fn working_directory(&mut self) -> FtpResult<String> {
        self.pwd().await
    }

    async fn list_directory(&mut self, path: &str) -> FtpResult<Vec<String>> {
        self.list_lines(path).await
    }

    async fn download_to(
        &mut self,
        remote_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> FtpResult<u64> {
        FtpClient::download_to(self, remote_path, sink).await
    }

    async fn close(&mut self) -> FtpResult<()> {
        self.quit().await
    }

    fn label(&self) -> &str {
        &self.config.host
    }
}
