//! Job configuration: defaults, optional JSON file, CLI overrides.

use crate::cli::Args;
use anyhow::{bail, Context, Result};
use ftpmirror_core::ftp::{ConnectConfig, DataChannelMode};
use ftpmirror_core::mirror::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything one invocation needs, for every host it mirrors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MirrorJobConfig {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub timeout_sec: u64,
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
    #[serde(default = "default_dest")]
    pub dest: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub data_channel_mode: DataChannelMode,
}

fn default_user() -> String {
    "test".into()
}
fn default_password() -> String {
    "test".into()
}
fn default_port() -> u16 {
    21
}
fn default_timeout() -> u64 {
    10
}
fn default_remote_dir() -> String {
    ".".into()
}
fn default_dest() -> PathBuf {
    PathBuf::from("download")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("err.log")
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for MirrorJobConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            user: default_user(),
            password: default_password(),
            port: default_port(),
            timeout_sec: default_timeout(),
            remote_dir: default_remote_dir(),
            dest: default_dest(),
            log_file: default_log_file(),
            max_depth: default_max_depth(),
            data_channel_mode: DataChannelMode::default(),
        }
    }
}

impl MirrorJobConfig {
    /// Read a JSON job file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Defaults, then `--config`, then explicit flags.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut job = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        job.apply_args(args);
        if job.hosts.is_empty() {
            bail!("no host given; pass at least one HOST or list them under \"hosts\" in --config");
        }
        Ok(job)
    }

    fn apply_args(&mut self, args: &Args) {
        if !args.hosts.is_empty() {
            self.hosts = args.hosts.clone();
        }
        if let Some(user) = &args.user {
            self.user = user.clone();
        }
        if let Some(password) = &args.password {
            self.password = password.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(timeout) = args.timeout {
            self.timeout_sec = timeout;
        }
        if let Some(dir) = &args.remote_dir {
            self.remote_dir = dir.clone();
        }
        if let Some(dest) = &args.dest {
            self.dest = dest.clone();
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = log_file.clone();
        }
        if let Some(depth) = args.max_depth {
            self.max_depth = depth;
        }
        if let Some(mode) = args.passive_mode {
            self.data_channel_mode = mode.into();
        }
    }

    /// Session settings for `host`. The job timeout bounds both the
    /// control and the data connection.
    pub fn connect_config(&self, host: &str) -> ConnectConfig {
        let mut config = ConnectConfig::new(host);
        config.port = self.port;
        config.username = self.user.clone();
        config.password = self.password.clone();
        config.data_channel_mode = self.data_channel_mode;
        config.connect_timeout_sec = self.timeout_sec;
        config.data_timeout_sec = self.timeout_sec;
        config
    }
}
