//! FTP session error type.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Error type ───────────────────────────────────────────────────────────

/// Categorised FTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpError {
    pub kind: FtpErrorKind,
    pub message: String,
    /// Reply code that triggered the error, if any.
    pub code: Option<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FtpErrorKind {
    /// TCP / DNS resolution failure.
    ConnectionFailed,
    /// USER/PASS rejected.
    AuthFailed,
    /// Server returned a 4xx/5xx for a command.
    CommandRejected,
    /// PASV/EPSV/PORT could not produce a data connection.
    DataChannelFailed,
    /// Transfer aborted or incomplete.
    TransferFailed,
    /// Server sent an un-parseable reply.
    ProtocolError,
    /// Local I/O failure (file create, write, flush).
    IoError,
    /// A network read, write or connect exceeded the session timeout.
    Timeout,
    /// Control connection closed by the server.
    Disconnected,
    PermissionDenied,
    NotFound,
    QuotaExceeded,
    InvalidConfig,
    Unknown,
}

pub type FtpResult<T> = Result<T, FtpError>;

impl FtpError {
    // ── Construction helpers ─────────────────────────────────────────────

    pub fn new(kind: FtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    // ── Convenience constructors ─────────────────────────────────────────

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ConnectionFailed, msg)
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::AuthFailed, msg)
    }

    pub fn data_channel(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::DataChannelFailed, msg)
    }

    pub fn protocol_error(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ProtocolError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::IoError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Timeout, msg)
    }

    pub fn disconnected(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Disconnected, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::InvalidConfig, msg)
    }

    // ── Reply classification ─────────────────────────────────────────────

    /// Classify a negative reply into the most appropriate error kind.
    pub fn from_reply(code: u16, text: &str) -> Self {
        let kind = match code {
            421 => FtpErrorKind::Disconnected,
            425 | 426 => FtpErrorKind::DataChannelFailed,
            430 | 530 => FtpErrorKind::AuthFailed,
            450 | 550 => {
                let lower = text.to_lowercase();
                if lower.contains("permission") || lower.contains("denied") {
                    FtpErrorKind::PermissionDenied
                } else if lower.contains("not found") || lower.contains("no such") {
                    FtpErrorKind::NotFound
                } else {
                    FtpErrorKind::CommandRejected
                }
            }
            451 | 551 => FtpErrorKind::TransferFailed,
            452 | 552 => FtpErrorKind::QuotaExceeded,
            _ if code >= 400 => FtpErrorKind::CommandRejected,
            _ => FtpErrorKind::Unknown,
        };
        Self::new(kind, text).with_code(code)
    }

    /// Whether the control connection is unusable after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            FtpErrorKind::Disconnected | FtpErrorKind::ConnectionFailed | FtpErrorKind::ProtocolError
        )
    }
}

// ── Trait impls ──────────────────────────────────────────────────────────

impl fmt::Display for FtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[FTP {:?} {}] {}", self.kind, code, self.message),
            None => write!(f, "[FTP {:?}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for FtpError {}

impl From<std::io::Error> for FtpError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout(format!("I/O timeout: {}", e)),
            std::io::ErrorKind::PermissionDenied => {
                Self::new(FtpErrorKind::PermissionDenied, e.to_string())
            }
            _ => Self::io_error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_550_is_split_by_text() {
        let e = FtpError::from_reply(550, "550 Permission denied.");
        assert_eq!(e.kind, FtpErrorKind::PermissionDenied);
        assert_eq!(e.code, Some(550));

        let e = FtpError::from_reply(550, "550 /pub/x: No such file or directory");
        assert_eq!(e.kind, FtpErrorKind::NotFound);

        let e = FtpError::from_reply(550, "550 Failed to open file.");
        assert_eq!(e.kind, FtpErrorKind::CommandRejected);
    }

    #[test]
    fn reply_codes_map_to_kinds() {
        assert_eq!(FtpError::from_reply(421, "bye").kind, FtpErrorKind::Disconnected);
        assert_eq!(FtpError::from_reply(425, "no data").kind, FtpErrorKind::DataChannelFailed);
        assert_eq!(FtpError::from_reply(530, "login").kind, FtpErrorKind::AuthFailed);
        assert_eq!(FtpError::from_reply(552, "quota").kind, FtpErrorKind::QuotaExceeded);
        assert_eq!(FtpError::from_reply(502, "nope").kind, FtpErrorKind::CommandRejected);
    }

    #[test]
    fn io_timeout_becomes_timeout_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let e: FtpError = io.into();
        assert_eq!(e.kind, FtpErrorKind::Timeout);
        assert!(!e.is_fatal());
    }

    #[test]
    fn display_includes_code_when_present() {
        let e = FtpError::from_reply(530, "Login incorrect.");
        assert_eq!(e.to_string(), "[FTP AuthFailed 530] Login incorrect.");
        let e = FtpError::disconnected("Server closed connection");
        assert_eq!(e.to_string(), "[FTP Disconnected] Server closed connection");
    }
}
