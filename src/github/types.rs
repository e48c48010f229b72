//! Raw repository records and query types for the GitHub upstream.

use serde::{Deserialize, Serialize};

/// Raw repository metadata as returned by the GitHub users/{username}/repos
/// endpoint. Immutable once fetched; owned by the service cache entry.
///
/// Only the fields the service inspects are modeled; everything else in the
/// upstream body is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    pub stargazers_count: u32,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Sort order accepted by the upstream repositories endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoSort {
    #[default]
    Updated,
    Created,
    Pushed,
    FullName,
}

impl RepoSort {
    /// Query-string value understood by the GitHub API.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSort::Updated => "updated",
            RepoSort::Created => "created",
            RepoSort::Pushed => "pushed",
            RepoSort::FullName => "full_name",
        }
    }
}

/// Sort direction accepted by the upstream repositories endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Cache key for a repository list fetch: one entry per distinct
/// username/sort/direction combination ever requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoQuery {
    pub username: String,
    pub sort: RepoSort,
    pub direction: SortDirection,
}

impl RepoQuery {
    pub fn new(username: impl Into<String>, sort: RepoSort, direction: SortDirection) -> Self {
        Self {
            username: username.into(),
            sort,
            direction,
        }
    }

    /// Serialize as the same-origin route query string. Used as the
    /// client-side cache and coalescing key.
    pub fn to_query_string(&self) -> String {
        format!(
            "username={}&sort={}&direction={}",
            urlencoding::encode(&self.username),
            self.sort.as_str(),
            self.direction.as_str()
        )
    }
}
