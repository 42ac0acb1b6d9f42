//! Constants for the download module (timeouts, listing request headers).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// `Accept` header for contents-listing requests.
pub const LISTING_ACCEPT: &str = "application/vnd.github+json";

/// Default number of files downloaded at once.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Upper bound on parallel file downloads.
pub const MAX_CONCURRENCY: usize = 16;
