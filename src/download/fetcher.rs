//! Directory fetcher: one listing request, one download per listed file.
//!
//! The [`DirectoryFetcher`] fetches and decodes the listing, creates the
//! target directory once, and then yields one [`DownloadOutcome`] per file
//! entry as a lazy stream, in listing order.
//!
//! # Failure isolation
//!
//! - A failed listing is fatal: no directory is created, nothing is downloaded.
//! - A failed file is reported in its outcome; every other entry is still
//!   attempted.
//!
//! # Concurrency
//!
//! With the default concurrency of 1 files are fetched strictly one after
//! another. Higher values keep up to N downloads in flight via
//! [`StreamExt::buffered`], which still yields outcomes in listing order.
//!
//! # Example
//!
//! ```no_run
//! use dirgrab_core::download::{DirectoryFetcher, FetchConfig, HttpClient};
//! use dirgrab_core::location::RepositoryLocation;
//! use futures_util::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loc = RepositoryLocation::parse("https://github.com/acme/widgets/tree/main/assets/icons")?;
//! let fetcher = DirectoryFetcher::new(HttpClient::new(), FetchConfig::default())?;
//! let mut run = fetcher.list_and_download(&loc.api_url(), None, "icons").await?;
//! while let Some(outcome) = run.outcomes.next().await {
//!     println!("{}: {}", outcome.entry.name, outcome.is_success());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use futures_util::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::constants::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use super::error::{DownloadError, FetchError};
use super::listing::{DirectoryEntry, Listing, SkippedEntry, parse_listing};
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use super::HttpClient;

/// Tunables for a directory fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum files downloaded at once (1 = sequential).
    pub concurrency: usize,
    /// Retry policy for the listing and for each file.
    pub retry_policy: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// Result of one file download attempt.
#[derive(Debug)]
pub struct DownloadOutcome {
    /// The listing entry that was downloaded.
    pub entry: DirectoryEntry,
    /// Where the file was (or would have been) written.
    pub local_path: PathBuf,
    /// Bytes written on success, the failure reason otherwise.
    pub result: Result<u64, DownloadError>,
}

impl DownloadOutcome {
    /// Returns `true` when the file was written completely.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// A directory fetch in progress.
///
/// Returned once the listing succeeded and the target directory exists.
/// `outcomes` is finite and can be consumed only once.
pub struct DownloadRun<'a> {
    /// The created (or pre-existing) local directory.
    pub target_dir: PathBuf,
    /// Listing elements that will not be downloaded.
    pub skipped: Vec<SkippedEntry>,
    /// Number of outcomes `outcomes` will yield.
    pub total: usize,
    /// One outcome per downloadable entry, in listing order.
    pub outcomes: BoxStream<'a, DownloadOutcome>,
}

impl fmt::Debug for DownloadRun<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadRun")
            .field("target_dir", &self.target_dir)
            .field("skipped", &self.skipped)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// Running tally of outcomes, for reporting and the exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Files written successfully.
    pub completed: usize,
    /// Files that failed.
    pub failed: usize,
    /// Listing elements skipped.
    pub skipped: usize,
    /// Total bytes written.
    pub bytes: u64,
}

impl FetchSummary {
    /// Creates a summary seeded with the skipped count.
    #[must_use]
    pub fn with_skipped(skipped: usize) -> Self {
        Self {
            skipped,
            ..Self::default()
        }
    }

    /// Adds one outcome to the tally.
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match &outcome.result {
            Ok(bytes) => {
                self.completed += 1;
                self.bytes += bytes;
            }
            Err(_) => self.failed += 1,
        }
    }

    /// Files attempted (completed + failed).
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.completed + self.failed
    }
}

/// Fetches a directory listing and downloads its files.
#[derive(Debug)]
pub struct DirectoryFetcher {
    client: HttpClient,
    config: FetchConfig,
}

impl DirectoryFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConcurrency`] if `config.concurrency` is
    /// outside `1..=16`.
    pub fn new(client: HttpClient, config: FetchConfig) -> Result<Self, FetchError> {
        if !(1..=MAX_CONCURRENCY).contains(&config.concurrency) {
            return Err(FetchError::InvalidConcurrency {
                value: config.concurrency,
            });
        }
        Ok(Self { client, config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches and decodes the listing at `api_url`.
    ///
    /// Transient failures are retried; the final failure is fatal.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Listing`] for transport failures and statuses other than 200
    /// - [`FetchError::NotADirectory`] / [`FetchError::InvalidListing`] for
    ///   unusable bodies
    #[instrument(skip(self), fields(url = %api_url))]
    pub async fn fetch_listing(&self, api_url: &str) -> Result<Listing, FetchError> {
        let client = &self.client;
        let body = self
            .with_retry(api_url, move || client.fetch_listing_body(api_url))
            .await
            .map_err(FetchError::Listing)?;
        let listing = parse_listing(&body, api_url)?;
        info!(
            files = listing.entries.len(),
            skipped = listing.skipped.len(),
            "directory listing fetched"
        );
        Ok(listing)
    }

    /// Computes the target directory and makes sure it exists.
    ///
    /// The directory is `destination_root/target_dir_name`, or
    /// `target_dir_name` relative to the working directory when no root is
    /// given. Creating an existing directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::CreateDir`] if the directory cannot be created.
    pub async fn prepare_target(
        &self,
        destination_root: Option<&Path>,
        target_dir_name: &str,
    ) -> Result<PathBuf, FetchError> {
        let target_dir = match destination_root {
            Some(root) => root.join(target_dir_name),
            None => PathBuf::from(target_dir_name),
        };
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|source| FetchError::CreateDir {
                path: target_dir.clone(),
                source,
            })?;
        debug!(path = %target_dir.display(), "target directory ready");
        Ok(target_dir)
    }

    /// Fetches the listing, creates the target directory and returns the
    /// lazy stream of per-file outcomes.
    ///
    /// The directory is only created after the listing succeeded.
    ///
    /// # Errors
    ///
    /// Any error of [`fetch_listing`](Self::fetch_listing) or
    /// [`prepare_target`](Self::prepare_target). No file has been downloaded
    /// when an error is returned.
    pub async fn list_and_download(
        &self,
        api_url: &str,
        destination_root: Option<&Path>,
        target_dir_name: &str,
    ) -> Result<DownloadRun<'_>, FetchError> {
        let listing = self.fetch_listing(api_url).await?;
        let target_dir = self.prepare_target(destination_root, target_dir_name).await?;

        let total = listing.entries.len();
        let outcomes = self.download_all(listing.entries, target_dir.clone());
        Ok(DownloadRun {
            target_dir,
            skipped: listing.skipped,
            total,
            outcomes,
        })
    }

    /// Downloads `entries` into `target_dir`, yielding outcomes in order.
    ///
    /// Nothing happens until the stream is polled.
    pub fn download_all(
        &self,
        entries: Vec<DirectoryEntry>,
        target_dir: PathBuf,
    ) -> BoxStream<'_, DownloadOutcome> {
        stream::iter(entries)
            .map(move |entry| {
                let target_dir = target_dir.clone();
                async move { self.download_one(entry, &target_dir).await }
            })
            .buffered(self.config.concurrency)
            .boxed()
    }

    /// Downloads one entry to `target_dir/entry.name`.
    ///
    /// Never fails as a whole: errors end up in [`DownloadOutcome::result`].
    #[instrument(skip(self, entry), fields(name = %entry.name))]
    pub async fn download_one(&self, entry: DirectoryEntry, target_dir: &Path) -> DownloadOutcome {
        let local_path = target_dir.join(&entry.name);
        let result = {
            let client = &self.client;
            let url = entry.download_url.as_str();
            let path = local_path.as_path();
            self.with_retry(url, move || client.download_to_path(url, path))
                .await
        };

        match &result {
            Ok(bytes) => debug!(bytes, path = %local_path.display(), "file downloaded"),
            Err(e) => debug!(error = %e, "file download failed"),
        }

        DownloadOutcome {
            entry,
            local_path,
            result,
        }
    }

    async fn with_retry<T, F, Fut>(&self, url: &str, mut operation: F) -> Result<T, DownloadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownloadError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            match self
                .config
                .retry_policy
                .should_retry(classify_error(&error), attempt)
            {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(url, attempt, reason = %reason, "not retrying");
                    return Err(error);
                }
            }
        }
    }
}
