//! Error types for browse-URL resolution.

use thiserror::Error;

/// Maximum browse URL length to accept (standard browser limit).
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors that can occur while turning a browse URL into a [`RepositoryLocation`].
///
/// [`RepositoryLocation`]: super::RepositoryLocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The URL does not decompose into at least owner, repository and ref.
    #[error("malformed repository URL '{url}': {reason}\n  Suggestion: {suggestion}")]
    MalformedUrl {
        /// The URL as supplied (truncated when very long).
        url: String,
        /// Why the URL was rejected.
        reason: String,
        /// How to fix the issue.
        suggestion: &'static str,
    },

    /// The URL points at the repository root and no local directory name was given.
    #[error(
        "no local directory name for the root of {owner}/{repo}\n  Suggestion: pass --name <DIR> or use --root-name repo"
    )]
    MissingDirName {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
    },

    /// The local directory name would not be a single new directory.
    #[error(
        "unsafe local directory name '{name}'\n  Suggestion: pass --name <DIR> with a plain directory name"
    )]
    UnsafeDirName {
        /// The rejected name.
        name: String,
    },
}

impl LocationError {
    /// Creates a `MalformedUrl` error for a URL with too few structural tokens.
    #[must_use]
    pub fn too_few_segments(url: &str, found: usize) -> Self {
        Self::MalformedUrl {
            url: preview(url),
            reason: format!("expected owner, repository and ref, found {found} segment(s)"),
            suggestion: "Use a URL like https://github.com/<owner>/<repo>/tree/<ref>/<path>",
        }
    }

    /// Creates a `MalformedUrl` error for a URL exceeding [`MAX_URL_LENGTH`].
    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::MalformedUrl {
            url: preview(url),
            reason: format!("URL is {} characters long (max {MAX_URL_LENGTH})", url.len()),
            suggestion: "Check for extraneous content pasted with the URL",
        }
    }
}

fn preview(url: &str) -> String {
    if url.chars().count() > 80 {
        let head: String = url.chars().take(80).collect();
        format!("{head}...")
    } else {
        url.to_string()
    }
}
