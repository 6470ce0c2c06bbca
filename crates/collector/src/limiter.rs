//! Per-provider token discipline.
//!
//! Each provider key owns a token bucket over a rolling one-second window.
//! Tokens are only ever observed — there is no background refill task.
//! `acquire` computes a monotonic grant deadline under the bucket mutex, so
//! waiters are served in arrival order and a ready token can never be stolen
//! by a later arrival.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use tw_domain::config::{LimitsConfig, ProviderKey};
use tw_domain::{Error, Result};
use tw_providers::RequestCtx;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TokenBucket
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Rolling-window token bucket.
///
/// Holds the grant deadlines of the most recent `capacity` acquisitions.
/// A new arrival is granted `now` while a slot is free in the window,
/// otherwise the instant the oldest retained grant leaves the window.
/// Invariant: any half-open window of `refill_interval` length contains at
/// most `capacity` grants.
struct TokenBucket {
    capacity: usize,
    refill_interval: Duration,
    grants: VecDeque<Instant>,
}

impl TokenBucket {
    fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            capacity: capacity.max(1) as usize,
            refill_interval,
            grants: VecDeque::with_capacity(capacity.max(1) as usize),
        }
    }

    /// Reserve the next grant deadline. Deadlines are non-decreasing across
    /// calls, which is what makes the queue fair.
    fn schedule(&mut self, now: Instant) -> Instant {
        let grant = if self.grants.len() < self.capacity {
            now
        } else {
            let oldest = self.grants.pop_front().unwrap_or(now);
            now.max(oldest + self.refill_interval)
        };
        self.grants.push_back(grant);
        grant
    }

    /// Tokens currently observable: capacity minus grants inside the window.
    fn tokens(&self, now: Instant) -> u32 {
        let cutoff = now.checked_sub(self.refill_interval);
        let spent = self
            .grants
            .iter()
            .filter(|g| match cutoff {
                Some(cutoff) => **g > cutoff,
                None => true,
            })
            .count();
        (self.capacity - spent.min(self.capacity)) as u32
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RateLimiter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-provider rate limiter shared by every request pipeline.
pub struct RateLimiter {
    buckets: HashMap<ProviderKey, Mutex<TokenBucket>>,
}

impl RateLimiter {
    /// Build one bucket per provider from the configured caps.
    pub fn new(limits: &LimitsConfig) -> Self {
        let window = Duration::from_secs(1);
        let buckets = ProviderKey::ALL
            .iter()
            .map(|p| (*p, Mutex::new(TokenBucket::new(limits.qps(*p), window))))
            .collect();
        Self { buckets }
    }

    /// Wait for a call slot on `provider`.
    ///
    /// Returns `Ok(())` once the slot's deadline has passed, or
    /// `Err(Canceled)` if the context is canceled first. A slot reserved by
    /// a canceled waiter stays consumed — the window treats it as spent.
    pub async fn acquire(&self, provider: ProviderKey, ctx: &RequestCtx) -> Result<()> {
        if ctx.is_canceled() {
            return Err(Error::Canceled);
        }

        let bucket = self
            .buckets
            .get(&provider)
            .ok_or_else(|| Error::Internal(format!("no bucket for provider {provider}")))?;

        let grant = bucket.lock().schedule(Instant::now());

        tokio::select! {
            _ = tokio::time::sleep_until(grant) => Ok(()),
            _ = ctx.cancelled() => Err(Error::Canceled),
        }
    }

    /// Observable free tokens for a provider (diagnostics and tests).
    pub fn available(&self, provider: ProviderKey) -> u32 {
        self.buckets
            .get(&provider)
            .map(|b| b.lock().tokens(Instant::now()))
            .unwrap_or(0)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn limits_with_qps(qps: u32) -> LimitsConfig {
        LimitsConfig {
            default_qps: qps,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_up_to_capacity_is_immediate() {
        let limiter = RateLimiter::new(&limits_with_qps(3));
        let ctx = RequestCtx::new();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire(ProviderKey::Poi, &ctx).await.unwrap();
        }
        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.available(ProviderKey::Poi), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fourth_acquire_waits_a_window() {
        let limiter = RateLimiter::new(&limits_with_qps(3));
        let ctx = RequestCtx::new();
        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire(ProviderKey::Poi, &ctx).await.unwrap();
        }
        assert_eq!(Instant::now() - start, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn rolling_window_never_exceeds_capacity() {
        let limiter = RateLimiter::new(&limits_with_qps(3));
        let ctx = RequestCtx::new();
        let mut grants: Vec<Instant> = Vec::new();
        for _ in 0..10 {
            limiter.acquire(ProviderKey::Weather, &ctx).await.unwrap();
            grants.push(Instant::now());
        }
        // Any 3 consecutive grants span at least the window.
        for w in grants.windows(4) {
            assert!(w[3] - w[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn providers_do_not_share_buckets() {
        let limiter = RateLimiter::new(&limits_with_qps(1));
        let ctx = RequestCtx::new();
        let start = Instant::now();
        limiter.acquire(ProviderKey::Weather, &ctx).await.unwrap();
        limiter.acquire(ProviderKey::Traffic, &ctx).await.unwrap();
        // Different providers, no contention.
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_waiter_unblocks_with_canceled() {
        let limiter = std::sync::Arc::new(RateLimiter::new(&limits_with_qps(1)));
        let ctx = RequestCtx::new();
        limiter.acquire(ProviderKey::Hints, &ctx).await.unwrap();

        let waiter_ctx = ctx.child();
        let waiter_limiter = limiter.clone();
        let waiter = tokio::spawn(async move {
            waiter_limiter
                .acquire(ProviderKey::Hints, &waiter_ctx)
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel();
        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(Error::Canceled)));
    }

    #[tokio::test(start_paused = true)]
    async fn already_canceled_context_never_schedules() {
        let limiter = RateLimiter::new(&limits_with_qps(3));
        let ctx = RequestCtx::new();
        ctx.cancel();
        assert!(matches!(
            limiter.acquire(ProviderKey::Poi, &ctx).await,
            Err(Error::Canceled)
        ));
        // The bucket is untouched.
        assert_eq!(limiter.available(ProviderKey::Poi), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_refill_on_observation() {
        let limiter = RateLimiter::new(&limits_with_qps(2));
        let ctx = RequestCtx::new();
        limiter.acquire(ProviderKey::Navigation, &ctx).await.unwrap();
        limiter.acquire(ProviderKey::Navigation, &ctx).await.unwrap();
        assert_eq!(limiter.available(ProviderKey::Navigation), 0);

        tokio::time::advance(Duration::from_millis(1100)).await;
        assert_eq!(limiter.available(ProviderKey::Navigation), 2);
    }
}
