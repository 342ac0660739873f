//! Frame timing and pacing.
//!
//! This module provides:
//! - [`Clock`] - Split timer measuring work done in a frame
//! - [`FramePacer`] - Sleep planning that carries oversleep into the next frame
//!
//! # Examples
//!
//! ```
//! use glyph_engine::time::FramePacer;
//! use std::time::Duration;
//!
//! let mut pacer = FramePacer::new(Duration::from_millis(40), Duration::from_millis(1));
//! // 15 ms of work leaves 25 ms to sleep
//! assert_eq!(pacer.plan(Duration::from_millis(15)), Duration::from_millis(25));
//!
//! // slept 3 ms too long; the next frame sleeps 3 ms less
//! pacer.record(Duration::from_millis(25), Duration::from_millis(28));
//! assert_eq!(pacer.plan(Duration::from_millis(15)), Duration::from_millis(22));
//! ```

use std::time::{Duration, Instant};

/// Split timer
#[derive(Clone, Debug)]
pub struct Clock {
    previous: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
        }
    }

    /// Time since the last `delta` call, and reset
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.previous);
        self.previous = now;
        elapsed
    }

    /// Time since the last `delta` call, without resetting
    pub fn split(&self) -> Duration {
        self.previous.elapsed()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-period frame pacing.
///
/// Each frame sleeps `target - work - debt`, never less than `min_sleep`,
/// where `debt` is how much the previous sleep overshot.
#[derive(Clone, Debug)]
pub struct FramePacer {
    target: Duration,
    min_sleep: Duration,
    debt: Duration,
}

impl FramePacer {
    pub fn new(target: Duration, min_sleep: Duration) -> Self {
        Self {
            target,
            min_sleep,
            debt: Duration::ZERO,
        }
    }

    /// Intended sleep after `work` of frame time
    pub fn plan(&self, work: Duration) -> Duration {
        self.target
            .saturating_sub(work)
            .saturating_sub(self.debt)
            .max(self.min_sleep)
    }

    /// Remember how far the real sleep overshot the intended one
    pub fn record(&mut self, intended: Duration, actual: Duration) {
        self.debt = actual.saturating_sub(intended);
    }

    /// Sleep for the planned time and record the overshoot.
    ///
    /// Returns the time actually slept.
    pub fn sleep(&mut self, work: Duration) -> Duration {
        let intended = self.plan(work);
        let start = Instant::now();
        std::thread::sleep(intended);
        let actual = start.elapsed();
        self.record(intended, actual);
        actual
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    pub fn min_sleep(&self) -> Duration {
        self.min_sleep
    }

    pub fn debt(&self) -> Duration {
        self.debt
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(40), Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_plan_subtracts_work() {
        let pacer = FramePacer::default();
        assert_eq!(pacer.plan(ms(10)), ms(30));
        assert_eq!(pacer.plan(ms(0)), ms(40));
    }

    #[test]
    fn test_plan_clamps_to_min_sleep() {
        let pacer = FramePacer::default();
        assert_eq!(pacer.plan(ms(39)), ms(1));
        assert_eq!(pacer.plan(ms(100)), ms(1));
    }

    #[test]
    fn test_debt_carried_once() {
        let mut pacer = FramePacer::default();
        pacer.record(ms(30), ms(35));
        assert_eq!(pacer.debt(), ms(5));
        assert_eq!(pacer.plan(ms(10)), ms(25));

        // an undershoot clears the debt
        pacer.record(ms(25), ms(20));
        assert_eq!(pacer.debt(), Duration::ZERO);
    }

    #[test]
    fn test_sleep_at_least_intended() {
        let mut pacer = FramePacer::new(ms(3), ms(1));
        let slept = pacer.sleep(ms(0));
        assert!(slept >= ms(3));
    }

    #[test]
    fn test_clock_split() {
        let mut clock = Clock::new();
        std::thread::sleep(ms(2));
        assert!(clock.split() >= ms(2));
        assert!(clock.delta() >= ms(2));
    }
}
