use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use gitfolio::config::Config;
use gitfolio::constants::DEFAULT_REPO_CACHE_CAPACITY;
use gitfolio::github::{GitHubApi, RepoService};
use gitfolio::server::{router, AppState};

#[derive(Parser)]
#[command(name = "gitfolio", about = "GitHub project showcase API", version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    gitfolio::logging::init(args.json_logs);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let source = Arc::new(GitHubApi::new(
        config.github.api_base.clone(),
        config.github.token.clone(),
    ));
    let repos = Arc::new(RepoService::new(
        source,
        Duration::from_secs(config.cache.repository_ttl_seconds),
        DEFAULT_REPO_CACHE_CAPACITY,
    ));

    let state = AppState {
        repos,
        default_username: config.github.username.clone(),
    };

    let bind = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!(
        address = %bind,
        username = %config.github.username,
        authenticated = config.github.token.is_some(),
        "gitfolio listening"
    );

    axum::serve(listener, router(state))
        .await
        .context("server error")?;

    Ok(())
}
