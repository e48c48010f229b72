//! GitHub upstream client.
//!
//! `GitHubApi` performs the actual HTTP call against the GitHub REST API.
//! It sits behind the `RepoSource` trait so the service cache and the API
//! route can be exercised with a mock upstream in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;

use super::error::GitHubError;
use super::types::{RepoQuery, Repository};
use crate::constants::REPOS_PER_PAGE;

/// Source of raw repository lists. Implemented by the real GitHub client and
/// by mocks in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn list_repositories(&self, query: &RepoQuery) -> Result<Vec<Repository>, GitHubError>;
}

/// GitHub REST API client for the public repositories endpoint.
///
/// Attaches a bearer token when one is configured, which raises the upstream
/// rate limit from 60 to 5000 requests per hour. Unauthenticated otherwise.
pub struct GitHubApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn repos_url(&self, query: &RepoQuery) -> String {
        format!(
            "{}/users/{}/repos?sort={}&direction={}&per_page={}",
            self.base_url,
            urlencoding::encode(&query.username),
            query.sort.as_str(),
            query.direction.as_str(),
            REPOS_PER_PAGE
        )
    }
}

/// Parse the `x-ratelimit-reset` header as a UTC timestamp (Unix seconds).
pub fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
}

/// True when a 403 response is actually the rate limit talking.
fn is_rate_limit_response(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "0")
        .unwrap_or(false)
}

#[async_trait]
impl RepoSource for GitHubApi {
    async fn list_repositories(&self, query: &RepoQuery) -> Result<Vec<Repository>, GitHubError> {
        let url = self.repos_url(query);

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "gitfolio");

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| GitHubError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();

        if status.as_u16() == 403 && is_rate_limit_response(&headers) {
            return Err(GitHubError::RateLimited {
                reset_at: parse_rate_limit_reset(&headers),
            });
        }

        if status.as_u16() == 404 {
            return Err(GitHubError::NotFound {
                username: query.username.clone(),
            });
        }

        if !status.is_success() {
            return Err(GitHubError::Api {
                status: status.as_u16(),
            });
        }

        let repos: Vec<Repository> = response
            .json()
            .await
            .map_err(|e| GitHubError::Decode(e.to_string()))?;

        tracing::debug!(
            username = %query.username,
            count = repos.len(),
            "fetched repositories from GitHub"
        );

        Ok(repos)
    }
}
