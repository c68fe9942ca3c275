//! Application state management.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Application state shared across request handlers.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Fixed-window counters by client key (usually the IP).
    rate_limiters: RwLock<HashMap<String, RateLimitWindow>>,
    /// Start time.
    start_time: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            rate_limiters: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Start background cleanup task that runs periodically.
    /// Call this after wrapping AppState in Arc to start the cleanup loop.
    pub fn start_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let state = Arc::clone(self);
        let cleanup_interval = Duration::from_secs(60);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cleanup_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                state.cleanup_rate_limiters().await;
            }
        })
    }

    /// Get uptime duration.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Count one request against `key`'s current window.
    ///
    /// Returns the quota left in the window, or
    /// [`AppError::RateLimitExceeded`] once the window is used up.
    pub async fn check_rate_limit(&self, key: &str) -> AppResult<RateLimitStatus> {
        let limit = self.config.rate_limit.max_requests;
        let window = self.config.rate_limit.window_duration();

        if !self.config.rate_limit.enabled {
            return Ok(RateLimitStatus {
                limit,
                remaining: limit,
                reset_after: window,
            });
        }

        let now = Instant::now();
        let mut limiters = self.rate_limiters.write().await;

        let entry = limiters
            .entry(key.to_string())
            .or_insert_with(|| RateLimitWindow {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }

        let reset_after = window.saturating_sub(now.duration_since(entry.started));

        if entry.count >= limit {
            tracing::warn!(client = key, "rate limit exceeded");
            // Round up so clients never retry a moment too early.
            let retry_after_secs = reset_after.as_secs() + u64::from(reset_after.subsec_nanos() > 0);
            return Err(AppError::RateLimitExceeded {
                retry_after_secs: retry_after_secs.max(1),
            });
        }

        entry.count += 1;

        Ok(RateLimitStatus {
            limit,
            remaining: limit - entry.count,
            reset_after,
        })
    }

    /// Drop counters whose window has already closed.
    pub async fn cleanup_rate_limiters(&self) {
        let window = self.config.rate_limit.window_duration();
        let now = Instant::now();

        let mut limiters = self.rate_limiters.write().await;
        let initial_count = limiters.len();
        limiters.retain(|_, w| now.duration_since(w.started) < window);

        let removed = initial_count - limiters.len();
        if removed > 0 {
            tracing::debug!("Evicted {} stale rate limiter entries", removed);
        }
    }

    /// Number of clients currently tracked by the rate limiter.
    pub async fn tracked_clients(&self) -> usize {
        self.rate_limiters.read().await.len()
    }
}

/// Quota snapshot returned for an admitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Time until the window resets.
    pub reset_after: Duration,
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started: Instant,
    count: u32,
}
