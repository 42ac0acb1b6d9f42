//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use dirgrab_core::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use dirgrab_core::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, RootDirPolicy};

/// Download one directory of a GitHub repository without cloning it.
///
/// Pass the browse URL of the directory, e.g.
/// https://github.com/acme/widgets/tree/main/assets/icons
/// and its files are written to ./icons. Subdirectories are not descended into.
#[derive(Parser, Debug)]
#[command(name = "dirgrab")]
#[command(author, version, about)]
pub struct Args {
    /// Browse URL of the directory (https://github.com/<owner>/<repo>/tree/<ref>/<path>)
    pub url: String,

    /// Parent directory under which the directory is created
    #[arg(short = 'd', long = "dest", value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Local directory name (defaults to the last path segment of the URL)
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: Option<String>,

    /// How to name the directory for a repository-root URL: repo | require
    #[arg(long, value_name = "POLICY", default_value = "repo")]
    pub root_name: RootDirPolicy,

    /// Maximum concurrent file downloads (1-16)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: u8,

    /// Total attempts per request, counting the first (1-10; 1 means no retry)
    #[arg(short = 'a', long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_attempts: u8,

    /// Override the listing API base URL (default: https://api.<host>)
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// HTTP connect timeout in seconds (1-300)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds (1-3600)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
