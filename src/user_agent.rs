//! User-Agent string shared by listing and file requests.
//!
//! The contents API rejects requests without a User-Agent, so every request
//! made by [`HttpClient`](crate::download::HttpClient) carries this one.

/// Default User-Agent identifying the tool and its version.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    format!("{name}/{version} (directory-fetch-tool)")
}
