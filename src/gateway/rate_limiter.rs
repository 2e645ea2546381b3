//! Per-client fixed-window rate limiting
//!
//! Each client identity gets a window that opens on its first request and
//! admits `max_requests` requests. Once the window is older than the
//! configured length the next request opens a fresh one. The store is owned
//! by the gateway state and reads time through a [`Clock`], so tests can
//! drive it deterministically.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::RateLimitConfig;

/// Time source for the rate limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: std::sync::Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: std::sync::Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

/// Quota state for one client identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub window_start: Instant,
    pub count: u32,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

struct StoreState {
    windows: HashMap<String, RateLimitWindow>,
    last_sweep: Instant,
}

/// Client identity -> window map shared by all gateway requests
pub struct RateLimitStore {
    window: Duration,
    max_requests: u32,
    sweep_interval: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<StoreState>,
}

impl RateLimitStore {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            window: config.window(),
            max_requests: config.max_requests,
            sweep_interval: config.sweep_interval(),
            clock,
            state: Mutex::new(StoreState {
                windows: HashMap::new(),
                last_sweep: now,
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request for `client`, or refuse it when its window is full
    pub async fn check(&self, client: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        if now.saturating_duration_since(state.last_sweep) >= self.sweep_interval {
            state.last_sweep = now;
            self.remove_stale(&mut state.windows, now);
        }

        let window = state
            .windows
            .entry(client.to_string())
            .or_insert(RateLimitWindow {
                window_start: now,
                count: 0,
            });

        let elapsed = now.saturating_duration_since(window.window_start);
        if elapsed > self.window {
            *window = RateLimitWindow {
                window_start: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(window.window_start));
            return RateLimitDecision::Limited { retry_after };
        }

        window.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }

    fn remove_stale(&self, windows: &mut HashMap<String, RateLimitWindow>, now: Instant) -> usize {
        let horizon = self.window.saturating_mul(2);
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.window_start) <= horizon);
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Swept stale rate limit windows");
        }
        removed
    }
}

/// Human wording of a window length for the `retryAfter` hint
pub fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (amount, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };

    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

#[cfg(test)]
impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[cfg(test)]
impl RateLimitStore {
    /// Force a sweep now, returning the number of entries removed
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        state.last_sweep = now;
        self.remove_stale(&mut state.windows, now)
    }

    pub async fn tracked_clients(&self) -> usize {
        self.state.lock().await.windows.len()
    }

    pub async fn window_for(&self, client: &str) -> Option<RateLimitWindow> {
        self.state.lock().await.windows.get(client).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_requests: u32) -> RateLimitConfig {
        RateLimitConfig {
            window_secs: 15 * 60,
            max_requests,
            sweep_interval_secs: 60,
        }
    }

    fn store(max_requests: u32) -> (RateLimitStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (RateLimitStore::with_clock(&config(max_requests), clock.clone()), clock)
    }

    #[tokio::test]
    async fn eleventh_request_in_window_is_limited() {
        let (limiter, clock) = store(10);

        for i in 0..10 {
            let decision = limiter.check("10.0.0.1").await;
            assert_eq!(decision, RateLimitDecision::Allowed { remaining: 9 - i });
            clock.advance(Duration::from_secs(5));
        }

        match limiter.check("10.0.0.1").await {
            RateLimitDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(15 * 60 - 50));
            }
            other => panic!("expected a limited decision, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn window_resets_once_it_has_elapsed() {
        let (limiter, clock) = store(2);
        assert!(limiter.check("a").await.is_allowed());
        assert!(limiter.check("a").await.is_allowed());
        assert!(!limiter.check("a").await.is_allowed());

        clock.advance(Duration::from_secs(15 * 60));
        assert!(!limiter.check("a").await.is_allowed(), "window must be exceeded, not just reached");

        clock.advance(Duration::from_secs(1));
        assert_eq!(limiter.check("a").await, RateLimitDecision::Allowed { remaining: 1 });
    }

    #[tokio::test]
    async fn clients_are_limited_independently() {
        let (limiter, _clock) = store(1);
        assert!(limiter.check("a").await.is_allowed());
        assert!(!limiter.check("a").await.is_allowed());
        assert!(limiter.check("b").await.is_allowed());
    }

    #[tokio::test]
    async fn stale_clients_are_swept_on_access() {
        let (limiter, clock) = store(10);
        limiter.check("old-1").await;
        limiter.check("old-2").await;
        assert_eq!(limiter.tracked_clients().await, 2);

        clock.advance(Duration::from_secs(31 * 60));
        limiter.check("fresh").await;

        assert_eq!(limiter.tracked_clients().await, 1);
        assert!(limiter.window_for("old-1").await.is_none());
        assert_eq!(limiter.window_for("fresh").await.map(|w| w.count), Some(1));
    }

    #[tokio::test]
    async fn recently_expired_clients_survive_a_sweep() {
        let (limiter, clock) = store(10);
        limiter.check("recent").await;

        clock.advance(Duration::from_secs(20 * 60));
        assert_eq!(limiter.sweep().await, 0);
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[test]
    fn durations_read_naturally() {
        assert_eq!(describe_duration(Duration::from_secs(900)), "15 minutes");
        assert_eq!(describe_duration(Duration::from_secs(3600)), "1 hour");
        assert_eq!(describe_duration(Duration::from_secs(90)), "90 seconds");
        assert_eq!(describe_duration(Duration::from_secs(60)), "1 minute");
    }
}
