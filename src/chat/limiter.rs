use tokio::time::Instant;

/// Token bucket owned by a single connection's read loop.
///
/// Starts full, so a fresh client may send `burst` messages back to back
/// before throttling kicks in.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    rate: f64,
    burst: f64,
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(rate_per_second: f64, burst: f64, now: Instant) -> Self {
        let burst = burst.max(1.0);
        Self {
            rate: rate_per_second.max(0.0),
            burst,
            tokens: burst,
            last_refill: now,
        }
    }

    /// Refill by elapsed time, then spend one token if a whole one is available.
    pub fn allow(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.burst);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
