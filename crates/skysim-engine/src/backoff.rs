//! Exponential backoff for background loops that call the durable
//! store, so an outage doesn't turn into a tight retry loop.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    next_attempt_at: Instant,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
            next_attempt_at: Instant::now(),
        }
    }

    pub fn ready(&self) -> bool {
        Instant::now() >= self.next_attempt_at
    }

    pub fn reset(&mut self) {
        self.current = self.base;
        self.next_attempt_at = Instant::now();
    }

    /// Record a failure; returns the delay before the next attempt.
    pub fn fail(&mut self) -> Duration {
        self.current = self.current.saturating_mul(2).min(self.max);
        self.next_attempt_at = Instant::now() + self.current;
        self.current
    }
}
