//! Rate Limiter Service
//!
//! Throttles outbound calls to the external search API. Tracks the remaining
//! quota and reset time reported by the API and enforces a minimum spacing
//! between consecutive requests. Waiting is timer-based, never busy, and a
//! caller-supplied cancellation token aborts a pending wait without consuming
//! quota.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Remaining-quota level at or below which the limiter waits for the reset
const LOW_WATER_MARK: u32 = 100;

/// Errors that can occur while waiting for request clearance
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit wait cancelled by caller")]
    Cancelled,
}

/// Quota state; mutated only by the limiter itself
#[derive(Debug)]
struct RateLimitState {
    remaining: u32,
    /// Epoch seconds at which the API resets the quota
    reset_time: i64,
    /// When the last request was cleared to go out
    last_request: Option<Instant>,
}

/// Read-only snapshot of the limiter state
#[derive(Debug, Clone, Copy)]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub reset_time: i64,
}

/// Rate Limiter Service
///
/// Shared across concurrent requests; the lock is held only around the
/// synchronous state transition, never across a sleep.
#[derive(Debug, Clone)]
pub struct RateLimiterService {
    state: Arc<Mutex<RateLimitState>>,
    max_quota: u32,
    min_interval: Duration,
}

impl RateLimiterService {
    pub fn new(max_quota: u32, min_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState {
                remaining: max_quota,
                reset_time: 0,
                last_request: None,
            })),
            max_quota,
            min_interval,
        }
    }

    /// Block until it is safe to issue the next external call
    ///
    /// The quota decrement and last-request stamp are recorded only once no
    /// further waiting is required, so a cancelled (or dropped) wait never
    /// consumes quota. Starvation delays, it never errors.
    pub async fn wait_if_needed(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), RateLimitError> {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now_epoch = Utc::now().timestamp();

                if now_epoch >= state.reset_time && state.remaining < self.max_quota {
                    debug!(remaining = state.remaining, "quota window reset");
                    state.remaining = self.max_quota;
                }

                let mut wait = Duration::ZERO;
                if state.remaining <= LOW_WATER_MARK {
                    let until_reset = state.reset_time - now_epoch;
                    if until_reset > 0 {
                        wait = Duration::from_secs(until_reset as u64);
                    }
                }

                if wait.is_zero() {
                    if let Some(last) = state.last_request {
                        let gap = last.elapsed();
                        if gap < self.min_interval {
                            wait = self.min_interval - gap;
                        }
                    }
                }

                if wait.is_zero() {
                    state.last_request = Some(Instant::now());
                    state.remaining = state.remaining.saturating_sub(1);
                    return Ok(());
                }
                wait
            };

            debug!(wait_ms = wait.as_millis() as u64, "throttling outbound request");
            tokio::select! {
                _ = cancel.cancelled() => return Err(RateLimitError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Reconcile with the true quota reported by the last response headers
    pub async fn update_limits(&self, remaining: u32, reset_time: i64) {
        let mut state = self.state.lock().await;
        state.remaining = remaining;
        state.reset_time = reset_time;
    }

    /// Current quota snapshot (for monitoring and tests)
    pub async fn status(&self) -> RateLimitStatus {
        let state = self.state.lock().await;
        RateLimitStatus {
            remaining: state.remaining,
            reset_time: state.reset_time,
        }
    }
}
