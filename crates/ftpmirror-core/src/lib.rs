//! # ftpmirror – core
//!
//! Recursive FTP mirroring: a small async FTP client plus the walker and
//! executor that copy a remote tree onto the local filesystem.

pub mod ftp;
pub mod mirror;
