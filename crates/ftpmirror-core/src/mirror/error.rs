//! Error types for tree enumeration and mirroring.
//!
//! Enumeration errors abort the tree build; transfer errors are isolated per
//! file by the executor and handed to a `FileErrorSink`.

use crate::ftp::FtpError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    /// Listing a remote directory (or resolving the root) failed.
    #[error("failed to enumerate remote directory '{path}': {source}")]
    Enumeration {
        path: String,
        #[source]
        source: FtpError,
    },

    /// Downloading a single file failed, remotely or on the local side.
    #[error("failed to download '{remote}' to '{}': {source}", local.display())]
    Transfer {
        remote: String,
        local: PathBuf,
        #[source]
        source: FtpError,
    },

    /// A listing line did not carry at least an attribute and a name.
    #[error("malformed listing line: '{0}'")]
    MalformedListing(String),

    /// The remote hierarchy is deeper than the configured limit.
    #[error("remote directory '{path}' is deeper than the limit of {limit} levels")]
    DepthExceeded { path: String, limit: usize },

    /// Creating the local root or a mirrored directory failed.
    #[error("local filesystem error at '{}': {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MirrorError>;

impl MirrorError {
    /// Whether this error ends the enumeration phase of a run.
    pub fn is_enumeration(&self) -> bool {
        matches!(
            self,
            MirrorError::Enumeration { .. } | MirrorError::DepthExceeded { .. }
        )
    }

    /// The session-level cause, if the error came from the remote side.
    pub fn ftp_source(&self) -> Option<&FtpError> {
        match self {
            MirrorError::Enumeration { source, .. } | MirrorError::Transfer { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
