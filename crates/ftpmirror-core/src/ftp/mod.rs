//! Minimal FTP client (RFC 959) used as the mirror's remote session.
//!
//! - `types`: connection settings and reply type
//! - `error`: FTP-specific error type
//! - `protocol`: control-channel command/reply codec
//! - `connection`: TCP connect and banner
//! - `client`: login, PWD, generic data retrieval, QUIT
//! - `transfer`: data channel (PASV/EPSV/PORT)
//! - `directory`: LIST
//! - `file_ops`: RETR

pub mod client;
pub mod connection;
pub mod directory;
pub mod error;
pub mod file_ops;
pub mod protocol;
pub mod transfer;
pub mod types;

pub use client::FtpClient;
pub use error::{FtpError, FtpErrorKind, FtpResult};
pub use types::{ConnectConfig, DataChannelMode, FtpResponse};
