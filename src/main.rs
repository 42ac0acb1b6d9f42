//! CLI entry point for the dirgrab tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dirgrab_core::{
    DirectoryFetcher, FetchConfig, FetchSummary, HttpClient, RepositoryLocation, RetryPolicy,
};
use futures_util::StreamExt;
use tracing::{debug, info};

mod cli;
mod exit_handler;
mod output;

use cli::Args;
use exit_handler::{ProcessExit, determine_exit_outcome};
use output::Reporter;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
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

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(args: &Args) -> Result<ProcessExit> {
    let location = RepositoryLocation::parse(&args.url)?;
    let dir_name = location.local_dir_name(args.name.as_deref(), args.root_name)?;
    let api_url = match &args.api_base {
        Some(base) => location.api_url_with_base(base),
        None => location.api_url(),
    };
    info!(%location, %api_url, dir = %dir_name, "resolved repository location");

    let client = HttpClient::try_new_with_timeouts(args.connect_timeout, args.timeout)
        .context("failed to build HTTP client")?;
    let config = FetchConfig {
        concurrency: usize::from(args.concurrency),
        retry_policy: RetryPolicy::with_max_attempts(u32::from(args.max_attempts)),
    };
    let fetcher = DirectoryFetcher::new(client, config)?;

    let mut download = fetcher
        .list_and_download(&api_url, args.dest.as_deref(), &dir_name)
        .await
        .with_context(|| format!("could not fetch {location}"))?;

    let show_progress = !args.quiet && io::stderr().is_terminal();
    let reporter = Reporter::new(download.total, show_progress, args.quiet);
    for skipped in &download.skipped {
        reporter.skipped(skipped);
    }

    let mut summary = FetchSummary::with_skipped(download.skipped.len());
    while let Some(outcome) = download.outcomes.next().await {
        summary.record(&outcome);
        reporter.outcome(&outcome);
    }
    reporter.finish(&summary, &download.target_dir);

    info!(
        completed = summary.completed,
        failed = summary.failed,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "Fetch complete"
    );

    Ok(determine_exit_outcome(summary.completed, summary.failed))
}
