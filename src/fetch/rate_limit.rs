//! Process-wide rate-limit gate.
//!
//! Once any fetch sees a 429, every fetcher in the process stops calling the
//! route until the reset time passes or a success clears the gate. Prevents
//! a burst of components from hammering an already exhausted limit.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;

use crate::constants::DEFAULT_RATE_LIMIT_COOLDOWN_SECS;

#[derive(Debug, Default)]
struct GateState {
    limited_until: Option<DateTime<Utc>>,
    trip_count: u64,
}

/// Shared gate; one instance per process, cloned by handle (wrap in Arc).
#[derive(Debug)]
pub struct RateLimitGate {
    state: Mutex<GateState>,
    fallback_cooldown: ChronoDuration,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::with_cooldown_secs(DEFAULT_RATE_LIMIT_COOLDOWN_SECS)
    }

    pub fn with_cooldown_secs(secs: u64) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            fallback_cooldown: ChronoDuration::seconds(secs as i64),
        }
    }

    /// Record a 429. Uses the reset time from the response when given, or
    /// the fallback cooldown from now otherwise.
    pub fn trip(&self, reset_at: Option<DateTime<Utc>>) {
        self.trip_at(reset_at, Utc::now());
    }

    pub fn trip_at(&self, reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        let until = reset_at.unwrap_or(now + self.fallback_cooldown);
        let mut state = self.state.lock();
        state.limited_until = Some(until);
        state.trip_count += 1;
        tracing::warn!(until = %until.to_rfc3339(), "rate limit gate tripped");
    }

    /// Record a successful fetch; re-opens the gate immediately.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        if state.limited_until.take().is_some() {
            tracing::info!("rate limit gate cleared");
        }
    }

    pub fn is_limited(&self) -> bool {
        self.is_limited_at(Utc::now())
    }

    /// True while `now` is before the recorded reset time. Expiry is lazy:
    /// the gate re-opens on the first check past the deadline.
    pub fn is_limited_at(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        match state.limited_until {
            Some(until) if now < until => true,
            Some(_) => {
                state.limited_until = None;
                false
            }
            None => false,
        }
    }

    pub fn limited_until(&self) -> Option<DateTime<Utc>> {
        self.state.lock().limited_until
    }

    pub fn trip_count(&self) -> u64 {
        self.state.lock().trip_count
    }
}

impl Default for RateLimitGate {
    fn default() -> Self {
        Self::new()
    }
}
