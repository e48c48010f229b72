//! Request coalescing for identical in-flight fetches.
//!
//! The first caller for a key becomes the leader and performs the real work;
//! every caller that arrives while the leader is in flight becomes a follower
//! and receives the leader's settled outcome over a watch channel. If the
//! leader is dropped before completing (task cancelled, panic unwound), the
//! followers race to elect a new leader instead of hanging.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

/// Progress of the leader's work, broadcast to followers.
#[derive(Debug, Clone)]
enum CoalesceState<T> {
    Pending,
    Done(T),
    Abandoned,
}

type InFlightMap<T> = Arc<Mutex<HashMap<String, watch::Receiver<CoalesceState<T>>>>>;

/// What `join_or_lead` hands back: either the duty to do the work, or the
/// outcome someone else produced.
pub enum Acquired<T: Clone> {
    Leader(LeaderGuard<T>),
    Follower(T),
}

/// Held by the leader while its fetch is in flight. Completing publishes the
/// outcome to followers; dropping without completing signals abandonment so
/// a follower can take over.
pub struct LeaderGuard<T: Clone> {
    key: String,
    tx: watch::Sender<CoalesceState<T>>,
    in_flight: InFlightMap<T>,
    settled: bool,
}

impl<T: Clone> LeaderGuard<T> {
    /// Publish the outcome and release the key.
    pub fn complete(mut self, value: T) {
        self.settle(CoalesceState::Done(value));
    }

    fn settle(&mut self, state: CoalesceState<T>) {
        self.in_flight.lock().remove(&self.key);
        let _ = self.tx.send(state);
        self.settled = true;
    }
}

impl<T: Clone> Drop for LeaderGuard<T> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(CoalesceState::Abandoned);
        }
    }
}

/// Coalesces concurrent requests for the same key into one unit of work.
pub struct RequestCoalescer<T: Clone> {
    in_flight: InFlightMap<T>,
}

impl<T: Clone> RequestCoalescer<T> {
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join an in-flight request for `key`, or become its leader.
    ///
    /// Leaders must call `complete` on the returned guard once the work
    /// settles. Followers suspend until the leader publishes.
    pub async fn join_or_lead(&self, key: &str) -> Acquired<T> {
        let mut rx = {
            let mut map = self.in_flight.lock();
            match map.get(key) {
                Some(rx) => rx.clone(),
                None => {
                    let (tx, rx) = watch::channel(CoalesceState::Pending);
                    map.insert(key.to_string(), rx);
                    return Acquired::Leader(LeaderGuard {
                        key: key.to_string(),
                        tx,
                        in_flight: Arc::clone(&self.in_flight),
                        settled: false,
                    });
                }
            }
        };

        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                CoalesceState::Done(value) => return Acquired::Follower(value),
                // Leader went away without an outcome; race for leadership.
                CoalesceState::Abandoned => return Box::pin(self.join_or_lead(key)).await,
                CoalesceState::Pending => {
                    if rx.changed().await.is_err() {
                        return Box::pin(self.join_or_lead(key)).await;
                    }
                }
            }
        }
    }

    /// Number of keys currently in flight. Used by tests and stats.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

impl<T: Clone> Default for RequestCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}
