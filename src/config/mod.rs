//! YAML configuration with environment variable substitution.
//!
//! `${VAR_NAME}` references inside the file are replaced from the process
//! environment before parsing; a missing variable is a load error, not an
//! empty string. Every field has a default so a minimal file (or none at
//! all) still yields a runnable configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_BIND_ADDRESS, DEFAULT_CLIENT_TTL_SECS, DEFAULT_DEBOUNCE_MS,
    DEFAULT_PORT, DEFAULT_REPO_TTL_SECS, DEFAULT_USERNAME,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Username served when the route query omits one.
    #[serde(default = "default_username")]
    pub username: String,
    /// Optional API token; raises the upstream rate limit when set.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_repo_ttl")]
    pub repository_ttl_seconds: u64,
    #[serde(default = "default_client_ttl")]
    pub client_ttl_seconds: u64,
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_repo_ttl() -> u64 {
    DEFAULT_REPO_TTL_SECS
}

fn default_client_ttl() -> u64 {
    DEFAULT_CLIENT_TTL_SECS
}

fn default_debounce() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            token: None,
            api_base: default_api_base(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            repository_ttl_seconds: default_repo_ttl(),
            client_ttl_seconds: default_client_ttl(),
            debounce_ms: default_debounce(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            github: GitHubConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_with_env(&raw)
    }

    /// Parse YAML after substituting `${VAR}` references from the
    /// environment.
    pub fn from_yaml_with_env(raw: &str) -> Result<Self> {
        let substituted = substitute_env_vars(raw)?;
        let config: Config =
            serde_yaml::from_str(&substituted).context("failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.github.username.trim().is_empty() {
            bail!("github.username must not be empty");
        }
        if !self.github.api_base.starts_with("http") {
            bail!("github.api_base must be an http(s) URL");
        }
        if self.cache.repository_ttl_seconds == 0 || self.cache.client_ttl_seconds == 0 {
            bail!("cache TTLs must be non-zero");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }
}

fn substitute_env_vars(raw: &str) -> Result<String> {
    // Only uppercase names qualify; `${foo}` passes through untouched.
    // Comment lines are skipped so sample files can show the syntax.
    let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").context("invalid env var pattern")?;

    let mut missing = Vec::new();
    let mut lines = Vec::new();

    for line in raw.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }
        let substituted = pattern.replace_all(line, |caps: &regex::Captures| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        });
        lines.push(substituted.into_owned());
    }

    if !missing.is_empty() {
        bail!("missing environment variables: {}", missing.join(", "));
    }

    Ok(lines.join("\n"))
}
