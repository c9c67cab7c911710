//! In-memory `RemoteSession` for walker and executor tests.

use crate::ftp::{FtpError, FtpResult};
use crate::mirror::session::RemoteSession;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub fn file_line(name: &str, size: u64) -> String {
    format!("-rw-r--r--   1 ftp ftp {:>8} Jan  1 12:00 {}", size, name)
}

pub fn dir_line(name: &str) -> String {
    format!("drwxr-xr-x   2 ftp ftp     4096 Jan  1 12:00 {}", name)
}

#[derive(Debug, Default)]
pub struct FakeSession {
    cwd: String,
    listings: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<u8>>,
    failing_dirs: HashSet<String>,
    failing_files: HashSet<String>,
    pub pwd_calls: usize,
    pub downloads: Vec<String>,
}

impl FakeSession {
    pub fn new(cwd: &str) -> Self {
        Self {
            cwd: cwd.to_string(),
            ..Default::default()
        }
    }

    pub fn dir(mut self, path: &str, lines: Vec<String>) -> Self {
        self.listings.insert(path.to_string(), lines);
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn failing_dir(mut self, path: &str) -> Self {
        self.failing_dirs.insert(path.to_string());
        self
    }

    pub fn failing_file(mut self, path: &str) -> Self {
        self.failing_files.insert(path.to_string());
        self
    }
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn working_directory(&mut self) -> FtpResult<String> {
        self.pwd_calls += 1;
        Ok(self.cwd.clone())
    }

    async fn list_directory(&mut self, path: &str) -> FtpResult<Vec<String>> {
        if self.failing_dirs.contains(path) {
            return Err(FtpError::from_reply(550, "550 Permission denied"));
        }
        Ok(self.listings.get(path).cloned().unwrap_or_default())
    }

    async fn download_to(
        &mut self,
        remote_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> FtpResult<u64> {
        self.downloads.push(remote_path.to_string());
        if self.failing_files.contains(remote_path) {
            sink.write_all(b"partial").await?;
            return Err(FtpError::from_reply(426, "426 Connection closed; transfer aborted"));
        }
        let content = self
            .files
            .get(remote_path)
            .ok_or_else(|| FtpError::from_reply(550, "550 No such file or directory"))?;
        sink.write_all(content).await?;
        sink.flush().await?;
        Ok(content.len() as u64)
    }

    async fn close(&mut self) -> FtpResult<()> {
        Ok(())
    }

    fn label(&self) -> &str {
        "fake"
    }
}
