//! Dirgrab Core Library
//!
//! Downloads the files of a single directory of a hosted git repository,
//! identified by its browse URL, without cloning the repository.
//!
//! # Architecture
//!
//! - [`location`] - Browse-URL parsing and listing-API URL construction
//! - [`download`] - Listing fetch, per-file streaming downloads, retry
//!
//! A typical run parses the URL with [`RepositoryLocation::parse`], builds the
//! listing URL with [`RepositoryLocation::api_url`] and hands it to
//! [`DirectoryFetcher::list_and_download`], then consumes the outcome stream.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod location;
mod user_agent;

// Re-export commonly used types
pub use download::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DirectoryEntry, DirectoryFetcher, DownloadError,
    DownloadOutcome, DownloadRun, FetchConfig, FetchError, FetchSummary, HttpClient,
    MAX_CONCURRENCY, RetryPolicy, SkippedEntry,
};
pub use location::{LocationError, RepositoryLocation, RootDirPolicy};
