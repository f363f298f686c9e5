use std::time::Duration;
use tokio::time::Instant;

/// Token bucket parameters: `burst` frames at once, one more every `refill`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub burst: u32,
    pub refill: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            burst: 30,
            refill: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    limit: RateLimit,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            tokens: limit.burst, // Start with full bucket
            limit,
            last_refill: Instant::now(),
        }
    }

    /// Take one token. Returns `false` when the bucket is empty.
    pub fn check_rate_limit(&mut self) -> bool {
        self.refill_tokens();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_tokens(&mut self) {
        let refill_ms = self.limit.refill.as_millis().max(1);
        let elapsed_ms = self.last_refill.elapsed().as_millis();
        let earned = elapsed_ms / refill_ms;
        if earned == 0 {
            return;
        }

        if self.tokens as u128 + earned >= self.limit.burst as u128 {
            self.tokens = self.limit.burst;
            self.last_refill = Instant::now();
        } else {
            self.tokens += earned as u32;
            // Keep the partial interval so slow senders aren't penalized
            self.last_refill += self.limit.refill * earned as u32;
        }
    }

    pub fn remaining_tokens(&mut self) -> u32 {
        self.refill_tokens();
        self.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimit::default())
    }
}
