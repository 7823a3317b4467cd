//! Single token bucket.
//!
//! Time is passed in explicitly so the refill math can be driven by tests
//! (and property tests) without a runtime clock.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Burst size and sustained rate for one key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    /// Maximum tokens a bucket can hold (burst)
    pub capacity: u32,
    /// Tokens added per second
    pub refill_per_sec: f64,
}

impl Quota {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            refill_per_sec: if refill_per_sec.is_finite() {
                refill_per_sec.max(0.0)
            } else {
                0.0
            },
        }
    }

    /// `n` requests per second with a burst of `n`
    pub fn per_second(n: u32) -> Self {
        Self::new(n, f64::from(n))
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::per_second(1)
    }
}

/// Token bucket state for one key.
///
/// Invariant: `0.0 <= tokens <= capacity`.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    quota: Quota,
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl TokenBucket {
    /// New buckets start full.
    pub fn new(quota: Quota, now: Instant) -> Self {
        Self {
            quota,
            tokens: f64::from(quota.capacity),
            last_refill: now,
            last_seen: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        // Instants from a monotonic clock never go backwards, but saturate anyway
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        let capacity = f64::from(self.quota.capacity);
        self.tokens = (self.tokens + elapsed * self.quota.refill_per_sec).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }

    /// Refill, then take one token if available.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.refill(now);
        if now > self.last_seen {
            self.last_seen = now;
        }
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens available at `now`, without consuming any
    pub fn available(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.quota.refill_per_sec).min(f64::from(self.quota.capacity))
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Last time anyone asked this bucket for a token
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }
}
