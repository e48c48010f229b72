// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Server defaults
// =============================================================================

/// Default address to bind the API route to
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default port for the API route
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// GitHub upstream defaults
// =============================================================================

/// Default GitHub REST API base URL
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default username to fetch repositories for
pub const DEFAULT_USERNAME: &str = "dacrab";

/// Page size requested from the upstream repositories endpoint
pub const REPOS_PER_PAGE: u32 = 100;

// =============================================================================
// Cache defaults
// =============================================================================

/// Server-side repository cache TTL in seconds (1 hour)
pub const DEFAULT_REPO_TTL_SECS: u64 = 3600;

/// Maximum entries retained in the server-side repository cache
pub const DEFAULT_REPO_CACHE_CAPACITY: u64 = 1024;

/// Client-side raw-result cache TTL in seconds (15 minutes)
pub const DEFAULT_CLIENT_TTL_SECS: u64 = 900;

// =============================================================================
// Fetch orchestration defaults
// =============================================================================

/// Debounce applied between a visibility trigger and the actual fetch
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Cooldown applied after a 429 when the response carries no reset header
pub const DEFAULT_RATE_LIMIT_COOLDOWN_SECS: u64 = 3600;

// =============================================================================
// Project derivation defaults
// =============================================================================

/// Maximum number of topics carried into a project's tag list
pub const MAX_TOPIC_TAGS: usize = 3;

/// Tag used when a repository has neither a language nor topics
pub const FALLBACK_TAG: &str = "Code";

/// Language shown when the repository reports none
pub const UNKNOWN_LANGUAGE: &str = "Unknown";
