//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Filter comes from `RUST_LOG` when set,
/// otherwise defaults to info for this crate. `json` switches the output
/// format for log shippers.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gitfolio=info,tower_http=info"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
