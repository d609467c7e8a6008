//! Clock port
//!
//! The scheduler never reads wall-clock time or sleeps directly; it goes
//! through [`IClock`]. [`TokioClock`] is the real implementation and
//! [`ManualClock`] is a virtual clock whose `sleep` returns immediately after
//! advancing virtual time, so many ticks can be simulated without delay.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Time source and sleep capability
#[async_trait::async_trait]
pub trait IClock: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Suspends the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

// ============================================================================
// TokioClock
// ============================================================================

/// Real clock backed by `std::time::Instant` and `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    /// Create a new `TokioClock`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IClock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// ManualClock
// ============================================================================

/// Virtual clock for tests and simulations
///
/// Time only moves when [`advance`](ManualClock::advance) or
/// [`IClock::sleep`] is called. Every requested sleep is recorded.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock positioned at virtual time zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Moves virtual time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }

    /// Every duration passed to `sleep`, in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IClock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        self.advance(duration);
        // Let other tasks observe the new time, like a real sleep would.
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.advance(Duration::from_secs(5));

        assert_eq!(clock.elapsed(), Duration::from_secs(5));
        assert_eq!(clock.now() - start, Duration::from_secs(5));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_manual_clock_sleep_records_and_advances() {
        let clock = ManualClock::new();

        clock.sleep(Duration::from_secs(3)).await;
        clock.sleep(Duration::from_secs(2)).await;

        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(3), Duration::from_secs(2)]
        );
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_tokio_clock_sleeps() {
        let clock = TokioClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_millis(10)).await;
        assert!(clock.now() - start >= Duration::from_millis(10));
    }
}
