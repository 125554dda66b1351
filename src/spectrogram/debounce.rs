//! Single-slot debounce timer for resize handling.

use std::time::{Duration, Instant};

/// Holds at most one pending deadline. Scheduling again replaces it.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    pending: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Cancels any pending deadline and sets a new one `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns true once, when the pending deadline has been reached.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn test_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        assert!(!debounce.fire(t0 + Duration::from_secs(1)));

        debounce.schedule(t0);
        assert!(!debounce.fire(t0 + Duration::from_millis(99)));
        assert!(debounce.fire(t0 + Duration::from_millis(100)));
        assert!(!debounce.fire(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_burst_of_events_fires_once() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(DELAY);

        let mut fired = 0;
        // a drag delivering an event every 20 ms for half a second
        for step in 0..25u64 {
            let now = t0 + Duration::from_millis(step * 20);
            if debounce.fire(now) {
                fired += 1;
            }
            debounce.schedule(now);
            assert!(debounce.is_pending());
        }
        let last = t0 + Duration::from_millis(24 * 20);
        assert_eq!(fired, 0);
        assert!(!debounce.fire(last + Duration::from_millis(99)));
        assert!(debounce.is_pending());
        assert!(debounce.fire(last + Duration::from_millis(100)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_cancel_drops_pending() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.schedule(t0);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(t0 + Duration::from_secs(1)));
    }
}
