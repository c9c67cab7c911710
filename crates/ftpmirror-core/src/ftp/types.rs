//! Connection settings and reply types for the FTP session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Data channel ─────────────────────────────────────────────────────────

/// How the data connection for LIST/RETR is established.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DataChannelMode {
    /// `PASV`: server opens a port, client connects.
    #[default]
    Passive,
    /// `EPSV`: like PASV but only the port is announced.
    ExtendedPassive,
    /// `PORT`: client listens, server connects back.
    Active,
}

// ── Connection configuration ─────────────────────────────────────────────

/// Configuration for a single FTP control connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default)]
    pub data_channel_mode: DataChannelMode,
    /// Bounds connect and every control-channel read, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_sec: u64,
    /// Bounds data-channel setup and every data read, in seconds.
    #[serde(default = "default_data_timeout")]
    pub data_timeout_sec: u64,
    /// Send `OPTS UTF8 ON` after login.
    #[serde(default = "default_true")]
    pub utf8: bool,
    /// Local address to bind for active-mode data connections.
    #[serde(default)]
    pub active_bind_address: Option<String>,
}

// ── Serde defaults ───────────────────────────────────────────────────────

fn default_port() -> u16 {
    21
}
fn default_username() -> String {
    "anonymous".into()
}
fn default_password() -> String {
    "anonymous@".into()
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_data_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: default_username(),
            password: default_password(),
            data_channel_mode: DataChannelMode::Passive,
            connect_timeout_sec: default_connect_timeout(),
            data_timeout_sec: default_data_timeout(),
            utf8: true,
            active_bind_address: None,
        }
    }
}

impl ConnectConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_sec)
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_sec)
    }
}

// ── Replies ──────────────────────────────────────────────────────────────

/// A single FTP reply (may be multi-line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpResponse {
    pub code: u16,
    pub lines: Vec<String>,
}

impl FtpResponse {
    /// Full reply text (all lines joined).
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// 1xx–3xx.
    pub fn is_success(&self) -> bool {
        self.code < 400
    }

    /// 1xx: the server will send another reply once the data transfer ends.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }
}
