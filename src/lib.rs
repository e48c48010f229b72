//! gitfolio: GitHub project showcase service.
//!
//! Fetches a user's public repositories through a cached, rate-limit-aware
//! pipeline and serves them on a small JSON API. The `fetch` module is the
//! client-side counterpart: debounced, coalesced, cache-backed orchestration
//! that turns raw repositories into display-ready projects.

pub mod config;
pub mod constants;
pub mod fetch;
pub mod github;
pub mod logging;
pub mod projects;
pub mod server;
