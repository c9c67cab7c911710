//! CLI argument definitions using clap derive macros.

use clap::{Parser, ValueEnum};
use ftpmirror_core::ftp::DataChannelMode;
use std::fmt;
use std::path::PathBuf;

/// Mirror directory trees from one or more FTP servers.
///
/// Each host is walked depth-first from the remote directory and copied
/// under the destination root. One record per host is appended to the
/// log file.
#[derive(Parser)]
#[command(name = "ftpmirror")]
#[command(author, version, about)]
pub struct Args {
    /// Hosts to mirror, processed in order
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Login user [default: test]
    #[arg(short, long)]
    pub user: Option<String>,

    /// Login password [default: test]
    #[arg(short, long)]
    pub password: Option<String>,

    /// Control port [default: 21]
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Connection timeout in seconds [default: 10]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Remote directory to mirror; "." means the login directory [default: .]
    #[arg(short, long)]
    pub remote_dir: Option<String>,

    /// Local destination root [default: download]
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Append-only per-host result log [default: err.log]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Refuse to descend more than this many levels below the remote root [default: 256]
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Data connection mode [default: pasv]
    #[arg(long, value_enum)]
    pub passive_mode: Option<PassiveMode>,

    /// JSON job file; flags given on the command line override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Walk the remote tree and print it as JSON without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

// Written by hand so the password never reaches the logs.
impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("hosts", &self.hosts)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("remote_dir", &self.remote_dir)
            .field("dest", &self.dest)
            .field("log_file", &self.log_file)
            .field("max_depth", &self.max_depth)
            .field("passive_mode", &self.passive_mode)
            .field("config", &self.config)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PassiveMode {
    Pasv,
    Epsv,
    Active,
}

impl From<PassiveMode> for DataChannelMode {
    fn from(mode: PassiveMode) -> Self {
        match mode {
            PassiveMode::Pasv => DataChannelMode::Passive,
            PassiveMode::Epsv => DataChannelMode::ExtendedPassive,
            PassiveMode::Active => DataChannelMode::Active,
        }
    }
}
