//! Same-origin API route.
//!
//! Thin axum surface over `RepoService`: one JSON route for repository
//! lists plus a health probe. Typed fetch errors map onto HTTP statuses
//! here and nowhere else.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::github::{GitHubError, RepoQuery, RepoService, RepoSort, SortDirection};

/// Shared route state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<RepoService>,
    pub default_username: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/github", get(github_repos))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RepoParams {
    username: Option<String>,
    sort: Option<RepoSort>,
    direction: Option<SortDirection>,
}

async fn github_repos(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Response {
    let query = RepoQuery::new(
        params.username.unwrap_or(state.default_username),
        params.sort.unwrap_or_default(),
        params.direction.unwrap_or_default(),
    );

    match state.repos.fetch_repositories(&query).await {
        Ok(repos) => Json(repos.as_ref()).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Map a fetch error to its HTTP shape: status, `{error}` body, and the
/// `x-ratelimit-reset` header when the upstream gave us one.
pub fn error_response(err: &GitHubError) -> Response {
    let status = match err {
        GitHubError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        GitHubError::NotFound { .. } => StatusCode::NOT_FOUND,
        // Pass a representable upstream error status through, else 502.
        GitHubError::Api { status } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        GitHubError::Network(_) | GitHubError::Decode(_) => StatusCode::BAD_GATEWAY,
    };

    let mut headers = HeaderMap::new();
    if let GitHubError::RateLimited {
        reset_at: Some(reset),
    } = err
    {
        if let Ok(value) = HeaderValue::from_str(&reset.timestamp().to_string()) {
            headers.insert("x-ratelimit-reset", value);
        }
    }

    tracing::warn!(status = status.as_u16(), error = %err, "api route error");

    (status, headers, Json(json!({ "error": err.to_string() }))).into_response()
}
