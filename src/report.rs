//! Append-only per-host result log.
//!
//! One record per host: the host name, `ok` or `error`, then either the
//! mirror summary or the error trace, closed by two blank lines.

use anyhow::{Context, Result};
use ftpmirror_core::mirror::MirrorResult;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum HostOutcome {
    Mirrored(MirrorResult),
    Failed(String),
}

impl HostOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, HostOutcome::Mirrored(_))
    }
}

pub fn format_record(host: &str, outcome: &HostOutcome) -> String {
    match outcome {
        HostOutcome::Mirrored(result) => format!("{}\nok\n{}\n\n\n", host, result),
        HostOutcome::Failed(trace) => format!("{}\nerror\n{}\n\n\n", host, trace.trim_end()),
    }
}

pub struct ResultLog {
    path: PathBuf,
    file: File,
}

impl ResultLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Write one record and flush it, so a crash later in the run keeps it.
    pub fn record(&mut self, host: &str, outcome: &HostOutcome) -> Result<()> {
        self.file
            .write_all(format_record(host, outcome).as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("writing to log file {}", self.path.display()))
    }
}
