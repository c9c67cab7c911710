//! Replays a remote tree onto the local filesystem.
//!
//! Directories are created, files are downloaded one at a time, unknown
//! entries are only reported. A failed file is counted and handed to the
//! error sink; it never stops the rest of the run.

use crate::mirror::error::{MirrorError, Result};
use crate::mirror::session::RemoteSession;
use crate::mirror::sink::{FileErrorSink, LogSink};
use crate::mirror::transfer::download_file;
use crate::mirror::types::{local_path_for, MirrorResult, PathType, Tree};
use crate::mirror::walker::TreeWalker;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorExecutor {
    walker: TreeWalker,
}

impl MirrorExecutor {
    pub fn new(walker: TreeWalker) -> Self {
        Self { walker }
    }

    /// Mirror `remote_dir` under `local_root`.
    ///
    /// `tree` skips enumeration when the caller already has one.
    pub async fn mirror_remote<S>(
        &self,
        session: &mut S,
        remote_dir: &str,
        local_root: &Path,
        tree: Option<Tree>,
        sink: Option<&mut dyn FileErrorSink>,
    ) -> Result<MirrorResult>
    where
        S: RemoteSession + ?Sized,
    {
        let tree = match tree {
            Some(tree) => tree,
            None => self.walker.walk(session, remote_dir, true).await?,
        };
        log::info!("Host {} tree statistic: {}", session.label(), tree.stats());
        self.mirror(session, &tree, local_root, sink).await
    }

    /// Realize `tree` under `local_root`.
    ///
    /// Only a failure to set up `local_root` or a mirrored directory is
    /// returned as an error. File failures are counted in the result.
    pub async fn mirror<S>(
        &self,
        session: &mut S,
        tree: &Tree,
        local_root: &Path,
        sink: Option<&mut dyn FileErrorSink>,
    ) -> Result<MirrorResult>
    where
        S: RemoteSession + ?Sized,
    {
        let root = prepare_root(local_root).await?;
        let mut default_sink = LogSink;
        let sink: &mut dyn FileErrorSink = match sink {
            Some(sink) => sink,
            None => &mut default_sink,
        };

        let stats = tree.stats();
        let host = session.label().to_string();
        let mut ok = 0usize;
        let mut failed = 0usize;

        for entry in tree {
            let local = local_path_for(&root, &entry.path);
            match entry.kind {
                PathType::Directory => {
                    tokio::fs::create_dir_all(&local)
                        .await
                        .map_err(|source| MirrorError::LocalIo {
                            path: local.clone(),
                            source,
                        })?;
                }
                PathType::File => {
                    match download_file(session, &entry.path, &local).await {
                        Ok(_) => ok += 1,
                        Err(e) => {
                            failed += 1;
                            if e.ftp_source().is_some_and(|s| s.is_fatal()) {
                                log::warn!("Host {}: session looks unusable after '{}'", host, entry.path);
                            }
                            sink.on_file_error(&e, &entry.path, &local);
                        }
                    }
                    log::info!(
                        "Host {}: {}/{}/{}(ok/err/total) files downloaded",
                        host,
                        ok,
                        failed,
                        stats.file_count
                    );
                }
                PathType::Unknown => {
                    log::warn!("Unknown type remote path got: {}", entry.path);
                }
            }
        }

        let result = MirrorResult::new(stats, failed);
        log::info!(
            "Host {} directory {} download finished: {}",
            host,
            tree.root().map(|e| e.path.as_str()).unwrap_or_default(),
            result
        );
        Ok(result)
    }
}

async fn prepare_root(local_root: &Path) -> Result<PathBuf> {
    let io_err = |source: std::io::Error| MirrorError::LocalIo {
        path: local_root.to_path_buf(),
        source,
    };
    tokio::fs::create_dir_all(local_root).await.map_err(io_err)?;
    tokio::fs::canonicalize(local_root).await.map_err(io_err)
}
