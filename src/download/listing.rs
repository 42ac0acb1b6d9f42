//! Decoding of the contents-listing response.
//!
//! The listing is decoded element by element: one malformed element is
//! recorded as a [`SkippedEntry`] and never aborts its siblings. Elements
//! without a `download_url` (subdirectories, submodules) are skipped too;
//! this tool fetches a single directory level only.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::error::FetchError;
use crate::location::is_single_component;

/// Kind of a listing element, from its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A subdirectory.
    Dir,
    /// A symbolic link.
    Symlink,
    /// A git submodule.
    Submodule,
    /// Any other or missing type.
    Other(String),
}

impl From<Option<&str>> for EntryKind {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some("file") => Self::File,
            Some("dir") => Self::Dir,
            Some("symlink") => Self::Symlink,
            Some("submodule") => Self::Submodule,
            other => Self::Other(other.unwrap_or_default().to_string()),
        }
    }
}

/// One downloadable element of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// File name, used verbatim as the local file name.
    pub name: String,
    /// Direct content URL.
    pub download_url: String,
    /// Element kind reported by the listing.
    pub kind: EntryKind,
    /// Size in bytes reported by the listing.
    pub size: Option<u64>,
}

/// Why a listing element was not downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `download_url` (subdirectory, submodule, ...).
    NoDownloadUrl(EntryKind),
    /// The element could not be decoded.
    Malformed(String),
    /// The name would escape the target directory or is empty.
    UnsafeName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDownloadUrl(EntryKind::Dir) => f.write_str("directory (not recursed)"),
            Self::NoDownloadUrl(EntryKind::Submodule) => f.write_str("submodule"),
            Self::NoDownloadUrl(_) => f.write_str("no download URL"),
            Self::Malformed(reason) => write!(f, "malformed entry: {reason}"),
            Self::UnsafeName => f.write_str("unsafe file name"),
        }
    }
}

/// A listing element that will not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Element name, when it could be read.
    pub name: Option<String>,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// A decoded directory listing, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Elements that will be downloaded.
    pub entries: Vec<DirectoryEntry>,
    /// Elements that will not.
    pub skipped: Vec<SkippedEntry>,
}

impl Listing {
    /// Total number of elements in the response.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() + self.skipped.len()
    }

    /// Returns `true` when the response had no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// `name` and `download_url` are the contract; `type` and `size` are
// informational and read leniently.
#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    size: Option<Value>,
}

/// Decodes a listing body fetched from `url`.
///
/// # Errors
///
/// - [`FetchError::InvalidListing`] if the body is not JSON
/// - [`FetchError::NotADirectory`] if the JSON is not an array
pub fn parse_listing(body: &[u8], url: &str) -> Result<Listing, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|source| FetchError::InvalidListing {
        url: url.to_string(),
        source,
    })?;
    let Value::Array(elements) = value else {
        return Err(FetchError::NotADirectory {
            url: url.to_string(),
        });
    };

    let mut listing = Listing::default();
    for element in elements {
        let fallback_name = element
            .get("name")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let raw = match serde_json::from_value::<RawEntry>(element) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(name = ?fallback_name, error = %e, "skipping malformed listing entry");
                listing.skipped.push(SkippedEntry {
                    name: fallback_name,
                    reason: SkipReason::Malformed(e.to_string()),
                });
                continue;
            }
        };

        let kind = EntryKind::from(raw.kind.as_ref().and_then(Value::as_str));
        let size = raw.size.as_ref().and_then(Value::as_u64);
        if !is_single_component(&raw.name) {
            debug!(name = %raw.name, "skipping entry with unsafe name");
            listing.skipped.push(SkippedEntry {
                name: Some(raw.name),
                reason: SkipReason::UnsafeName,
            });
            continue;
        }

        match raw.download_url.filter(|u| !u.is_empty()) {
            Some(download_url) => {
                trace!(name = %raw.name, "listing entry");
                listing.entries.push(DirectoryEntry {
                    name: raw.name,
                    download_url,
                    kind,
                    size,
                });
            }
            None => {
                trace!(name = %raw.name, ?kind, "entry has no download URL");
                listing.skipped.push(SkippedEntry {
                    name: Some(raw.name),
                    reason: SkipReason::NoDownloadUrl(kind),
                });
            }
        }
    }

    debug!(
        entries = listing.entries.len(),
        skipped = listing.skipped.len(),
        "listing decoded"
    );
    Ok(listing)
}
