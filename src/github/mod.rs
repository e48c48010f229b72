//! GitHub upstream integration: raw repository types, the REST client, and
//! the cached fetch service the API route is built on.

pub mod client;
pub mod error;
pub mod service;
pub mod types;

pub use client::{GitHubApi, RepoSource};
pub use error::GitHubError;
pub use service::RepoService;
pub use types::{RepoQuery, RepoSort, Repository, SortDirection};
