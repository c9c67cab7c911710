//! Per-file error reporting.

use crate::mirror::error::MirrorError;
use std::path::Path;

/// Receives every file transfer failure during a mirror run.
///
/// The executor keeps going after calling it; the sink only observes.
pub trait FileErrorSink {
    fn on_file_error(&mut self, error: &MirrorError, remote_path: &str, local_path: &Path);
}

/// Default sink: one warning per failed file.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FileErrorSink for LogSink {
    fn on_file_error(&mut self, error: &MirrorError, remote_path: &str, local_path: &Path) {
        log::warn!(
            "Download failed: {} -> {}: {}",
            remote_path,
            local_path.display(),
            error
        );
    }
}

impl<F> FileErrorSink for F
where
    F: FnMut(&MirrorError, &str, &Path),
{
    fn on_file_error(&mut self, error: &MirrorError, remote_path: &str, local_path: &Path) {
        self(error, remote_path, local_path)
    }
}
