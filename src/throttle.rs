//! In-process request throttle
//!
//! A coarse, per-IP sliding-window gate in front of the write surfaces. This
//! is infrastructure-level protection scoped to process lifetime; the
//! Submission Guard's per-user/per-IP limits are store-backed and survive
//! restarts. The counter is injected behind a trait so multi-instance
//! deployments can swap in a shared external counter.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::ThrottleConfig;

/// Error returned when the throttle rejects a request
#[derive(Debug, Clone)]
pub struct ThrottleError {
    /// Number of seconds until the window opens again
    pub retry_after_seconds: u64,
}

/// Swappable sliding-window counter.
pub trait RequestCounter: Send + Sync {
    /// Record a request for `action:identifier` and reject it if more than
    /// `max_requests` landed within `window`.
    fn check(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), ThrottleError>;

    /// Drop bookkeeping for identifiers with no recent requests.
    fn cleanup(&self);
}

/// In-memory counter suitable for single-instance deployments.
#[derive(Default)]
pub struct MemoryCounter {
    /// Map of (action:identifier) -> request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys (for monitoring/debugging)
    pub fn tracked_keys_count(&self) -> usize {
        self.requests.len()
    }
}

impl RequestCounter for MemoryCounter {
    fn check(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), ThrottleError> {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Slide the window
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            let oldest = entry[0];
            let retry_after = window.saturating_sub(now.duration_since(oldest));
            return Err(ThrottleError {
                retry_after_seconds: retry_after.as_secs() + 1, // Round up
            });
        }

        entry.push(now);
        Ok(())
    }

    fn cleanup(&self) {
        self.requests.retain(|_, timestamps| !timestamps.is_empty());
    }
}

/// Throttle over an injected counter and a config snapshot.
pub struct Throttle {
    counter: Arc<dyn RequestCounter>,
    config: ThrottleConfig,
}

impl Throttle {
    pub fn new(counter: Arc<dyn RequestCounter>, config: ThrottleConfig) -> Self {
        Self { counter, config }
    }

    /// In-memory throttle with the given config.
    pub fn in_memory(config: ThrottleConfig) -> Self {
        Self::new(Arc::new(MemoryCounter::new()), config)
    }

    /// Gate a review submission by client IP.
    pub fn check_submission(&self, ip: &str) -> Result<(), ThrottleError> {
        self.counter.check(
            "submit_review",
            ip,
            self.config.submission_max,
            Duration::from_secs(self.config.submission_window_seconds),
        )
    }

    /// Gate a report submission by client IP.
    pub fn check_report(&self, ip: &str) -> Result<(), ThrottleError> {
        self.counter.check(
            "submit_report",
            ip,
            self.config.report_max,
            Duration::from_secs(self.config.report_window_seconds),
        )
    }

    /// Periodic cleanup hook for the background task.
    pub fn cleanup(&self) {
        self.counter.cleanup();
    }
}
