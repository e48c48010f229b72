//! Typed errors raised by the repository fetch service.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while fetching repositories from the GitHub upstream.
///
/// The API route maps these to HTTP statuses; see `server::error_response`.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Upstream signalled the unauthenticated rate limit is exhausted
    /// (403 with `x-ratelimit-remaining: 0`).
    #[error("GitHub API rate limit exceeded{}", reset_suffix(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// The requested username does not exist upstream.
    #[error("GitHub user '{username}' not found")]
    NotFound { username: String },

    /// Any other non-2xx upstream response.
    #[error("GitHub API request failed with status {status}")]
    Api { status: u16 },

    /// Transport-level failure (DNS, connection refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed as a repository list.
    #[error("failed to decode GitHub response: {0}")]
    Decode(String),
}

fn reset_suffix(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(ts) => format!(", resets at {}", ts.to_rfc3339()),
        None => String::new(),
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GitHubError::Decode(err.to_string())
        } else {
            GitHubError::Network(err.to_string())
        }
    }
}
