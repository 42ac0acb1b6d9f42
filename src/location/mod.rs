//! Browse-URL resolution.
//!
//! Turns a repository browse URL such as
//! `https://github.com/acme/widgets/tree/main/assets/icons` into a
//! [`RepositoryLocation`] and derives the contents-listing API URL from it.
//!
//! Resolution is pure: nothing here touches the network or the filesystem,
//! so whether the owner, repository or ref actually exist is only discovered
//! when the listing is fetched.
//!
//! # Example
//!
//! ```
//! use dirgrab_core::location::RepositoryLocation;
//!
//! let loc = RepositoryLocation::parse("https://github.com/acme/widgets/tree/main/assets/icons")?;
//! assert_eq!(loc.owner(), "acme");
//! assert_eq!(loc.path_segments(), ["assets", "icons"]);
//! assert_eq!(
//!     loc.api_url(),
//!     "https://api.github.com/repos/acme/widgets/contents/assets/icons?ref=main"
//! );
//! # Ok::<(), dirgrab_core::location::LocationError>(())
//! ```

mod error;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

pub use error::{LocationError, MAX_URL_LENGTH};

/// Host assumed when the browse URL carries no host token.
pub const DEFAULT_HOST: &str = "github.com";

/// Path marker separating `owner/repo` from the ref in browse URLs.
const BROWSE_MARKER: &str = "tree";

/// How to name the local directory when the URL points at the repository root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootDirPolicy {
    /// Use the repository name.
    #[default]
    RepoName,
    /// Refuse to guess; an explicit name must be supplied.
    Require,
}

impl FromStr for RootDirPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "repo" | "repo-name" => Ok(Self::RepoName),
            "require" => Ok(Self::Require),
            other => Err(format!("unknown root naming policy '{other}' (expected repo or require)")),
        }
    }
}

/// A directory inside a hosted repository at a specific ref.
///
/// Constructed once from a browse URL via [`RepositoryLocation::parse`] and
/// immutable afterwards. `owner`, `repo` and `git_ref` are never empty;
/// `path_segments` is empty when the URL points at the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocation {
    host: String,
    owner: String,
    repo: String,
    git_ref: String,
    path_segments: Vec<String>,
}

impl RepositoryLocation {
    /// Parses a browse URL into its structural parts.
    ///
    /// The URL is split on `/`; empty tokens, the scheme, the host and the
    /// `tree` marker following `owner/repo` are discarded. The first three
    /// remaining tokens are owner, repository and ref; the rest is the
    /// directory path. Query strings and fragments are ignored and path
    /// segments are percent-decoded.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::MalformedUrl`] when fewer than three tokens
    /// remain or the input exceeds [`MAX_URL_LENGTH`].
    #[instrument(level = "debug", fields(url_len = url.len()))]
    pub fn parse(url: &str) -> Result<Self, LocationError> {
        let trimmed = url.trim();
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(LocationError::too_long(trimmed));
        }

        let without_suffix = trimmed.split(['?', '#']).next().unwrap_or_default();
        let mut tokens: Vec<&str> = without_suffix
            .split('/')
            .filter(|token| !token.is_empty())
            .collect();

        let mut host = None;
        if tokens.first().is_some_and(|token| token.ends_with(':')) {
            tokens.remove(0);
            if !tokens.is_empty() {
                host = Some(tokens.remove(0));
            }
        } else if tokens.first().is_some_and(|token| token.contains('.')) {
            host = Some(tokens.remove(0));
        }

        if tokens.get(2) == Some(&BROWSE_MARKER) {
            tokens.remove(2);
        }

        let [owner, repo, git_ref, rest @ ..] = tokens.as_slice() else {
            debug!(found = tokens.len(), "too few URL segments");
            return Err(LocationError::too_few_segments(trimmed, tokens.len()));
        };

        let location = Self {
            host: host.unwrap_or(DEFAULT_HOST).to_ascii_lowercase(),
            owner: decode_segment(owner),
            repo: decode_segment(repo),
            git_ref: decode_segment(git_ref),
            path_segments: rest.iter().map(|segment| decode_segment(segment)).collect(),
        };
        debug!(location = %location, "resolved browse URL");
        Ok(location)
    }

    /// Host of the browse URL (lowercased), e.g. `github.com`.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository owner (user or organization).
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Branch, tag or commit the contents are resolved against.
    #[must_use]
    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// Directory path inside the repository, one element per segment.
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    /// Returns `true` when the URL points at the repository root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path_segments.is_empty()
    }

    /// Final path segment, which names the local directory to create.
    #[must_use]
    pub fn dir_name(&self) -> Option<&str> {
        self.path_segments.last().map(String::as_str)
    }

    /// Default API base for this host: `https://api.<host>`.
    #[must_use]
    pub fn default_api_base(&self) -> String {
        let host = self.host.strip_prefix("www.").unwrap_or(&self.host);
        format!("https://api.{host}")
    }

    /// Contents-listing API URL on the public API endpoint.
    #[must_use]
    pub fn api_url(&self) -> String {
        self.api_url_with_base(&self.default_api_base())
    }

    /// Contents-listing API URL against an explicit API base.
    ///
    /// Path segments and the ref are percent-encoded.
    #[must_use]
    pub fn api_url_with_base(&self, api_base: &str) -> String {
        let joined = self
            .path_segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            api_base.trim_end_matches('/'),
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo),
            joined,
            urlencoding::encode(&self.git_ref),
        )
    }

    /// Decides the local directory name.
    ///
    /// An explicit name always wins. Otherwise the final path segment is used;
    /// for the repository root the [`RootDirPolicy`] decides. Whichever name
    /// is chosen must be a single path component.
    ///
    /// # Errors
    ///
    /// - [`LocationError::MissingDirName`] for a root URL under
    ///   [`RootDirPolicy::Require`] with no explicit name
    /// - [`LocationError::UnsafeDirName`] if the chosen name is `.`, `..` or
    ///   contains a path separator
    pub fn local_dir_name(
        &self,
        explicit: Option<&str>,
        policy: RootDirPolicy,
    ) -> Result<String, LocationError> {
        let name = match explicit.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => match (self.dir_name(), policy) {
                (Some(name), _) => name,
                (None, RootDirPolicy::RepoName) => self.repo.as_str(),
                (None, RootDirPolicy::Require) => {
                    return Err(LocationError::MissingDirName {
                        owner: self.owner.clone(),
                        repo: self.repo.clone(),
                    });
                }
            },
        };

        if !is_single_component(name) {
            debug!(name, "rejecting local directory name");
            return Err(LocationError::UnsafeDirName {
                name: name.to_string(),
            });
        }
        Ok(name.to_string())
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}:/{}", self.owner, self.repo, self.git_ref, self.path_segments.join("/"))
    }
}

impl FromStr for RepositoryLocation {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Returns `true` when `name` is a single path component: not empty, not
/// `.` or `..`, and free of separators and NUL.
pub(crate) fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |decoded| decoded.into_owned())
}
