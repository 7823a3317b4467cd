//! Background eviction of idle buckets.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::RateLimiter;

/// Periodically evict buckets idle for longer than `horizon`.
///
/// Runs until the returned handle is aborted. Admission decisions never
/// depend on this task running.
pub fn spawn_sweeper(
    limiter: Arc<RateLimiter>,
    interval: Duration,
    horizon: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; nothing can be idle yet
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.evict_idle(horizon);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::Quota;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let limiter = Arc::new(RateLimiter::new(Quota::new(1, 1.0)));
        limiter.allow("omdb");

        let handle = spawn_sweeper(
            Arc::clone(&limiter),
            Duration::from_secs(60),
            Duration::from_secs(120),
        );

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(limiter.tracked_keys(), 1, "not idle long enough yet");

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(limiter.tracked_keys(), 0);

        handle.abort();
    }
}
