//! Cancellable one-second countdown
//!
//! The controller holds at most one of these while in `Playing`. Dropping the
//! handle is cancellation; nothing keeps ticking in the background.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    interval: Duration,
    next_tick: Instant,
}

impl CountdownTimer {
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next_tick: now + interval,
        }
    }

    /// Number of whole intervals elapsed since the last poll
    pub fn poll(&mut self, now: Instant) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        let mut fired = 0;
        while now >= self.next_tick {
            fired += 1;
            self.next_tick += self.interval;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::start(t0, Duration::from_secs(1));
        assert_eq!(timer.poll(t0), 0);
        assert_eq!(timer.poll(t0 + Duration::from_millis(999)), 0);
        assert_eq!(timer.poll(t0 + Duration::from_secs(1)), 1);
        assert_eq!(timer.poll(t0 + Duration::from_millis(1500)), 0);
        assert_eq!(timer.poll(t0 + Duration::from_millis(4100)), 3);
        assert_eq!(timer.poll(t0 + Duration::from_millis(4999)), 0);
        assert_eq!(timer.poll(t0 + Duration::from_secs(5)), 1);
    }

    #[test]
    fn test_zero_interval_never_fires() {
        let t0 = Instant::now();
        let mut timer = CountdownTimer::start(t0, Duration::ZERO);
        assert_eq!(timer.poll(t0 + Duration::from_secs(10)), 0);
    }
}
