//! Transport used by the client-side fetcher to reach the same-origin API
//! route. Behind a trait so orchestration tests can count network calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::github::client::parse_rate_limit_reset;
use crate::github::{RepoQuery, Repository};

/// Errors surfaced to the fetcher. Cloneable because a single settled outcome
/// is shared with every coalesced waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The route answered 429. Carries the reset time when the response
    /// included one.
    #[error("GitHub API rate limit exceeded. Please try again later or add a GITHUB_TOKEN.")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// The route answered 404 for this username.
    #[error("GitHub user '{username}' not found")]
    NotFound { username: String },

    /// Any other non-2xx route response, with the error body when present.
    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),
}

/// Same-origin API route client, seen from the fetcher's side.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsApi: Send + Sync {
    async fn fetch_repos(&self, query: &RepoQuery) -> Result<Vec<Repository>, FetchError>;
}

/// HTTP implementation that calls `GET /api/github` on the serving origin.
pub struct HttpProjectsApi {
    http: reqwest::Client,
    origin: String,
}

impl HttpProjectsApi {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            origin: origin.into(),
        }
    }

    fn route_url(&self, query: &RepoQuery) -> String {
        format!("{}/api/github?{}", self.origin, query.to_query_string())
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

#[async_trait]
impl ProjectsApi for HttpProjectsApi {
    async fn fetch_repos(&self, query: &RepoQuery) -> Result<Vec<Repository>, FetchError> {
        let response = self
            .http
            .get(self.route_url(query))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited {
                reset_at: parse_rate_limit_reset(response.headers()),
            });
        }

        if status.as_u16() == 404 {
            return Err(FetchError::NotFound {
                username: query.username.clone(),
            });
        }

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<Repository>>()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}
