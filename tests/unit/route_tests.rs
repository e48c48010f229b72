// API route tests driven through the router with oneshot requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::DateTime;
use http_body_util::BodyExt;
use tower::ServiceExt;

use gitfolio::github::{GitHubError, RepoQuery, RepoService, RepoSource, Repository};
use gitfolio::server::{router, AppState};

type SourceFn =
    Box<dyn Fn(&RepoQuery) -> Result<Vec<Repository>, GitHubError> + Send + Sync>;

struct StubSource(SourceFn);

#[async_trait]
impl RepoSource for StubSource {
    async fn list_repositories(&self, query: &RepoQuery) -> Result<Vec<Repository>, GitHubError> {
        (self.0)(query)
    }
}

fn repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        full_name: format!("dacrab/{name}"),
        html_url: format!("https://github.com/dacrab/{name}"),
        description: Some("a project".to_string()),
        homepage: None,
        stargazers_count: 1,
        language: Some("Rust".to_string()),
        topics: vec![],
        fork: false,
        archived: false,
        created_at: None,
        updated_at: None,
        pushed_at: None,
        default_branch: None,
    }
}

fn app_with(source: SourceFn) -> axum::Router {
    let repos = Arc::new(RepoService::new(
        Arc::new(StubSource(source)),
        Duration::from_secs(3600),
        16,
    ));
    router(AppState {
        repos,
        default_username: "dacrab".to_string(),
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_repos_route_returns_json_array() {
    let app = app_with(Box::new(|_| Ok(vec![repo(1, "one"), repo(2, "two")])));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/github?username=dacrab")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["name"], "one");
}

#[tokio::test]
async fn test_missing_username_falls_back_to_default() {
    let app = app_with(Box::new(|query| {
        assert_eq!(query.username, "dacrab");
        Ok(vec![])
    }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/github")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limited_returns_429_with_reset_header() {
    let app = app_with(Box::new(|_| {
        Err(GitHubError::RateLimited {
            reset_at: DateTime::from_timestamp(1_700_000_000, 0),
        })
    }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/github")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.headers().get("x-ratelimit-reset").unwrap(),
        "1700000000"
    );
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("rate limit exceeded"));
}

#[tokio::test]
async fn test_unknown_user_returns_404_with_error_body() {
    let app = app_with(Box::new(|query| {
        Err(GitHubError::NotFound {
            username: query.username.clone(),
        })
    }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/github?username=ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_network_failure_returns_502() {
    let app = app_with(Box::new(|_| {
        Err(GitHubError::Network("connection refused".to_string()))
    }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/github")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_upstream_status_passes_through() {
    let app = app_with(Box::new(|_| Err(GitHubError::Api { status: 503 })));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/github")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_route() {
    let app = app_with(Box::new(|_| Ok(vec![])));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_second_request_serves_cached_repositories() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = app_with(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(vec![repo(1, "one")])
    }));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/github?username=dacrab")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
