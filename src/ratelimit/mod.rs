//! Per-key token-bucket admission control shared by all outbound provider calls.
//!
//! # Design
//!
//! Bucket state lives in a fixed number of shards, each a `parking_lot::Mutex`
//! around a small map. A key always hashes to the same shard, so one key's
//! state is serialized, while keys on different shards never touch the same
//! lock. Locks are held only for the O(1) refill-and-take, never across an
//! await point.
//!
//! Buckets are created lazily on the first `allow` for a key. Idle buckets can
//! be evicted by [`RateLimiter::evict_idle`] (or the background
//! [`spawn_sweeper`] task); a recreated bucket starts full, so eviction only
//! drops buckets that have refilled to capacity.

mod bucket;
mod sweeper;

pub use bucket::{Quota, TokenBucket};
pub use sweeper::spawn_sweeper;

use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Default number of lock shards
const DEFAULT_SHARDS: usize = 16;

type Shard = Mutex<HashMap<String, TokenBucket>>;

/// Keyed token-bucket rate limiter
pub struct RateLimiter {
    shards: Box<[Shard]>,
    hasher: RandomState,
    quotas: HashMap<String, Quota>,
    default_quota: Quota,
}

impl RateLimiter {
    /// Create a limiter where every key gets `default_quota`
    pub fn new(default_quota: Quota) -> Self {
        Self::with_shards(default_quota, DEFAULT_SHARDS)
    }

    /// Create a limiter with an explicit shard count (minimum 1)
    pub fn with_shards(default_quota: Quota, shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            hasher: RandomState::new(),
            quotas: HashMap::new(),
            default_quota,
        }
    }

    /// Register a quota for one key. Builder-style; quotas are fixed once
    /// the limiter is shared.
    pub fn with_quota(mut self, key: impl Into<String>, quota: Quota) -> Self {
        self.quotas.insert(key.into(), quota);
        self
    }

    /// Whether `key` has an explicitly registered quota
    pub fn has_quota(&self, key: &str) -> bool {
        self.quotas.contains_key(key)
    }

    /// Quota that applies to `key`
    pub fn quota_for(&self, key: &str) -> Quota {
        self.quotas.get(key).copied().unwrap_or(self.default_quota)
    }

    fn shard(&self, key: &str) -> &Shard {
        let idx = (self.hasher.hash_one(key) as usize) % self.shards.len();
        &self.shards[idx]
    }

    /// Try to admit one request for `key`. Never blocks on token availability.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut shard = self.shard(key).lock();
        if let Some(bucket) = shard.get_mut(key) {
            return bucket.try_acquire(now);
        }
        let mut bucket = TokenBucket::new(self.quota_for(key), now);
        let admitted = bucket.try_acquire(now);
        shard.insert(key.to_string(), bucket);
        admitted
    }

    /// Tokens currently available for `key`, or `None` if it has no bucket yet
    pub fn available(&self, key: &str) -> Option<f64> {
        let now = Instant::now();
        self.shard(key).lock().get(key).map(|b| b.available(now))
    }

    /// Number of keys with live buckets
    pub fn tracked_keys(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    /// Drop buckets not asked for within `horizon` that have refilled to
    /// capacity. Returns how many were removed.
    ///
    /// A bucket still owed tokens is kept however long it has been idle: a
    /// recreated bucket starts full and would hand out credit never earned.
    pub fn evict_idle(&self, horizon: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in self.shards.iter() {
            let mut map = shard.lock();
            let before = map.len();
            map.retain(|_, bucket| {
                let idle = now.saturating_duration_since(bucket.last_seen()) >= horizon;
                let full = bucket.available(now) >= f64::from(bucket.quota().capacity);
                !(idle && full)
            });
            removed += before - map.len();
        }
        if removed > 0 {
            tracing::debug!(removed, "Evicted idle rate limiter buckets");
        }
        removed
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Quota::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("shards", &self.shards.len())
            .field("quotas", &self.quotas)
            .field("default_quota", &self.default_quota)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_lazy_bucket_creation() {
        let limiter = RateLimiter::new(Quota::new(2, 1.0));
        assert_eq!(limiter.available("omdb"), None);
        assert!(limiter.allow("omdb"));
        assert_eq!(limiter.available("omdb"), Some(1.0));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registered_quota_applies() {
        let limiter = RateLimiter::new(Quota::new(1, 1.0)).with_quota("discogs", Quota::new(3, 1.0));
        assert!(limiter.allow("discogs"));
        assert!(limiter.allow("discogs"));
        assert!(limiter.allow("discogs"));
        assert!(!limiter.allow("discogs"));

        assert!(limiter.allow("other"));
        assert!(!limiter.allow("other"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_independence() {
        let limiter = RateLimiter::new(Quota::new(2, 0.5));
        while limiter.allow("a") {}
        assert!(!limiter.allow("a"));
        // Exhausting "a" has no effect on "b", even when they share a shard
        let single_shard = RateLimiter::with_shards(Quota::new(2, 0.5), 1);
        while single_shard.allow("a") {}
        assert!(single_shard.allow("b"));
        assert!(limiter.allow("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refills_with_clock() {
        let limiter = RateLimiter::new(Quota::new(1, 1.0));
        assert!(limiter.allow("musicbrainz"));
        assert!(!limiter.allow("musicbrainz"));
        tokio::time::advance(Duration::from_millis(1100)).await;
        assert!(limiter.allow("musicbrainz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_only_drops_stale_keys() {
        let limiter = RateLimiter::new(Quota::new(1, 1.0));
        limiter.allow("stale");
        tokio::time::advance(Duration::from_secs(600)).await;
        limiter.allow("fresh");

        let removed = limiter.evict_idle(Duration::from_secs(300));

        assert_eq!(removed, 1);
        assert_eq!(limiter.available("stale"), None);
        assert!(limiter.available("fresh").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_never_over_admits() {
        let limiter = RateLimiter::new(Quota::new(1, 0.01));
        assert!(limiter.allow("itunes"));
        tokio::time::advance(Duration::from_secs(200)).await;
        limiter.evict_idle(Duration::from_secs(100));
        // Fresh bucket holds `capacity` tokens, the same the old one refilled to
        assert!(limiter.allow("itunes"));
        assert!(!limiter.allow("itunes"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_keeps_buckets_still_refilling() {
        let limiter = RateLimiter::new(Quota::new(1, 0.01));
        assert!(limiter.allow("upcitemdb"));
        tokio::time::advance(Duration::from_secs(10)).await;

        // Idle past the horizon but only 0.1 tokens back
        assert_eq!(limiter.evict_idle(Duration::from_secs(5)), 0);
        assert!(
            !limiter.allow("upcitemdb"),
            "eviction granted a token the bucket had not refilled"
        );
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_never_exceed_capacity() {
        // Zero refill so the total admitted is exactly the burst
        let limiter = Arc::new(RateLimiter::new(Quota::new(25, 0.0)));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                let mut admitted = 0usize;
                for _ in 0..50 {
                    if limiter.allow("upcitemdb") {
                        admitted += 1;
                    }
                    tokio::task::yield_now().await;
                }
                admitted
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 25);
    }
}
