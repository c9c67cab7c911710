//! Single-file download into the local mirror.
//!
//! Bytes land in a sibling `<name>.ftpmirror-part` file that is renamed
//! over the target only once the transfer completes. A failed transfer
//! removes the part file and leaves any earlier copy untouched.

use crate::ftp::{FtpError, FtpResult};
use crate::mirror::error::{MirrorError, Result};
use crate::mirror::session::RemoteSession;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Suffix of in-flight downloads.
const PART_SUFFIX: &str = ".ftpmirror-part";

/// Download `remote_path` to `local_path`, replacing any existing file.
///
/// Missing parent directories are created.
pub async fn download_file<S>(session: &mut S, remote_path: &str, local_path: &Path) -> Result<u64>
where
    S: RemoteSession + ?Sized,
{
    let transfer_err = |source: FtpError| MirrorError::Transfer {
        remote: remote_path.to_string(),
        local: local_path.to_path_buf(),
        source,
    };

    if let Some(parent) = local_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| transfer_err(e.into()))?;
    }

    let part = part_path(local_path);
    let bytes = match fetch_into(session, remote_path, &part).await {
        Ok(bytes) => bytes,
        Err(e) => {
            discard(&part).await;
            return Err(transfer_err(e));
        }
    };

    if let Err(e) = fs::rename(&part, local_path).await {
        discard(&part).await;
        return Err(transfer_err(e.into()));
    }

    log::trace!("{} -> {} ({} bytes)", remote_path, local_path.display(), bytes);
    Ok(bytes)
}

/// Stream into `part`. The handle is dropped before this returns.
async fn fetch_into<S>(session: &mut S, remote_path: &str, part: &Path) -> FtpResult<u64>
where
    S: RemoteSession + ?Sized,
{
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part)
        .await?;
    let bytes = session.download_to(remote_path, &mut file).await?;
    file.flush().await?;
    Ok(bytes)
}

async fn discard(part: &Path) {
    if let Err(e) = fs::remove_file(part).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::debug!("Could not remove {}: {}", part.display(), e);
        }
    }
}

fn part_path(local_path: &Path) -> PathBuf {
    let mut name = local_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(PART_SUFFIX);
    local_path.with_file_name(name)
}
