//! Remote tree enumeration and local replay.
//!
//! - `listing`: LIST line parsing and classification
//! - `walker`: depth-first tree build over a `RemoteSession`
//! - `executor`: replays a tree locally with per-file error isolation
//! - `transfer`: single-file download
//! - `sink`: per-file error reporting

pub mod error;
pub mod executor;
pub mod listing;
pub mod session;
pub mod sink;
pub mod transfer;
pub mod types;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{MirrorError, Result};
pub use executor::MirrorExecutor;
pub use listing::{parse_listing, ListingRecord};
pub use session::RemoteSession;
pub use sink::{FileErrorSink, LogSink};
pub use transfer::download_file;
pub use types::{MirrorResult, PathEntry, PathType, Tree, TreeStats};
pub use walker::{TreeWalker, DEFAULT_MAX_DEPTH};
