//! CLI entry point for ftpmirror.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ftpmirror_core::ftp::FtpClient;
use ftpmirror_core::mirror::{MirrorExecutor, MirrorResult, RemoteSession, TreeWalker};
use tracing::{debug, error, info, warn};

mod cli;
mod config;
mod report;

use cli::Args;
use config::MirrorJobConfig;
use report::{HostOutcome, ResultLog};

fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);
    debug!(?args, "CLI arguments parsed");

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// RUST_LOG wins over -q/-v; library `log` records go through the same filter.
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Mirror every host in turn. Returns whether all of them succeeded.
fn run(args: &Args) -> Result<bool> {
    let job = MirrorJobConfig::resolve(args)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    if args.dry_run {
        return Ok(job
            .hosts
            .iter()
            .map(|host| match runtime.block_on(print_tree(&job, host)) {
                Ok(()) => true,
                Err(e) => {
                    error!(host = %host, "{:#}", e);
                    false
                }
            })
            .fold(true, |all, ok| all && ok));
    }

    let mut log = ResultLog::open(&job.log_file)?;
    let mut all_ok = true;
    for host in &job.hosts {
        info!(host = %host, "Mirroring {} into {}", job.remote_dir, job.dest.display());
        let outcome = match runtime.block_on(mirror_host(&job, host)) {
            Ok(result) => HostOutcome::Mirrored(result),
            Err(e) => {
                error!(host = %host, "{:#}", e);
                HostOutcome::Failed(format!("{:?}", e))
            }
        };
        all_ok &= outcome.is_ok();
        log.record(host, &outcome)?;
    }
    Ok(all_ok)
}

async fn mirror_host(job: &MirrorJobConfig, host: &str) -> Result<MirrorResult> {
    let mut client = FtpClient::connect(job.connect_config(host))
        .await
        .with_context(|| format!("connecting to {}", host))?;

    let executor = MirrorExecutor::new(TreeWalker::with_max_depth(job.max_depth));
    let result = executor
        .mirror_remote(&mut client, &job.remote_dir, &job.dest, None, None)
        .await
        .with_context(|| format!("mirroring {}:{}", host, job.remote_dir));

    close(&mut client, host).await;
    if let Ok(summary) = &result {
        info!(
            host = %host,
            bytes = client.bytes_downloaded,
            ok = summary.ok_file_count(),
            failed = summary.failed_file_count,
            "Host finished"
        );
    }
    result
}

async fn print_tree(job: &MirrorJobConfig, host: &str) -> Result<()> {
    let mut client = FtpClient::connect(job.connect_config(host))
        .await
        .with_context(|| format!("connecting to {}", host))?;

    let tree = TreeWalker::with_max_depth(job.max_depth)
        .walk(&mut client, &job.remote_dir, true)
        .await
        .with_context(|| format!("walking {}:{}", host, job.remote_dir));
    close(&mut client, host).await;

    let tree = tree?;
    info!(host = %host, "{}", tree.stats());
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

async fn close(client: &mut FtpClient, host: &str) {
    if let Err(e) = client.close().await {
        warn!(host = %host, "Closing session: {}", e);
    }
}
