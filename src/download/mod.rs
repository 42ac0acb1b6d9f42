//! Listing and file download engine.
//!
//! This module fetches a repository contents listing and streams each listed
//! file to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Per-element listing decoding: malformed elements and subdirectories are
//!   skipped, never fatal
//! - Per-file failure isolation: one failed file never stops the others
//! - Retry with exponential backoff for transient failures
//! - Configurable timeouts (30s connect, 5min read by default)
//!
//! # Example
//!
//! ```no_run
//! use dirgrab_core::download::{DirectoryFetcher, FetchConfig, HttpClient};
//! use futures_util::StreamExt;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = DirectoryFetcher::new(HttpClient::new(), FetchConfig::default())?;
//! let mut run = fetcher
//!     .list_and_download(
//!         "https://api.github.com/repos/acme/widgets/contents/assets/icons?ref=main",
//!         Some(Path::new("./downloads")),
//!         "icons",
//!     )
//!     .await?;
//! while let Some(outcome) = run.outcomes.next().await {
//!     println!("{} -> {}", outcome.entry.name, outcome.local_path.display());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod fetcher;
mod listing;
mod retry;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, READ_TIMEOUT_SECS};
pub use error::{DownloadError, FetchError};
pub use fetcher::{DirectoryFetcher, DownloadOutcome, DownloadRun, FetchConfig, FetchSummary};
pub use listing::{DirectoryEntry, EntryKind, Listing, SkipReason, SkippedEntry, parse_listing};
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error};
