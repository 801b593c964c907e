//! Per-identifier sliding-window admission control.
//!
//! Keeps the raw request timestamps for each caller inside the trailing
//! window; entries age out lazily on access. Single-process and in-memory:
//! state lives exactly as long as the process, reset only by [`RateLimiter::clear`]
//! or restart.
//!
//! Check and record are two separate calls in the middleware, so two
//! concurrent requests from the same identifier can both pass the check
//! before either records. Accepted for a best-effort, single-process
//! limiter.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// How many record operations pass between sweeps of identifiers whose
/// windows have fully expired.
const SWEEP_EVERY: u64 = 256;

#[derive(Debug, Default)]
struct LimiterState {
    requests: HashMap<String, Vec<Instant>>,
    records_since_sweep: u64,
}

/// Sliding-window counter keyed by caller identifier.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    state: RwLock<LimiterState>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            state: RwLock::new(LimiterState::default()),
        }
    }

    /// Whether a request from `identifier` is currently admissible. Prunes
    /// expired timestamps and writes the cleaned list back, but records
    /// nothing.
    pub async fn check_limit(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.write().await;
        let Some(timestamps) = state.requests.get_mut(identifier) else {
            return true;
        };
        timestamps.retain(|t| now.duration_since(*t) < self.window);
        timestamps.len() < self.max_requests
    }

    /// Records a request from `identifier` at the current instant.
    pub async fn record_request(&self, identifier: &str) {
        let now = Instant::now();
        let window = self.window;
        let mut state = self.state.write().await;
        {
            let timestamps = state.requests.entry(identifier.to_string()).or_default();
            timestamps.retain(|t| now.duration_since(*t) < window);
            timestamps.push(now);
        }

        state.records_since_sweep += 1;
        if state.records_since_sweep >= SWEEP_EVERY {
            state.records_since_sweep = 0;
            state
                .requests
                .retain(|_, timestamps| timestamps.iter().any(|t| now.duration_since(*t) < window));
        }
    }

    /// Time until the oldest recorded timestamp ages out of the window,
    /// which is when exactly one slot frees up (not a full reset). Zero for
    /// an identifier with nothing recorded.
    pub async fn time_until_reset(&self, identifier: &str) -> Duration {
        let state = self.state.read().await;
        let Some(oldest) = state
            .requests
            .get(identifier)
            .and_then(|timestamps| timestamps.iter().min())
        else {
            return Duration::ZERO;
        };
        (*oldest + self.window).saturating_duration_since(Instant::now())
    }

    /// Drops all identifiers. Supports test isolation.
    pub async fn clear(&self) {
        self.state.write().await.requests.clear();
    }

    /// Number of identifiers currently held, including ones whose windows
    /// have expired but have not been swept yet.
    pub async fn tracked_identifiers(&self) -> usize {
        self.state.read().await.requests.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }
}
