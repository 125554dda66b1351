//! Fixed-rate frame gating on top of a faster refresh tick.
//!
//! The refresh loop calls [`FrameClock::tick`] at whatever rate the terminal is
//! polled. A frame is due once a full frame interval has elapsed; the remainder
//! of the elapsed time is carried into the next interval so the average rate
//! matches the target even when the refresh interval does not divide it.

/// What the caller should do for this refresh tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The clock was stopped; do not schedule another tick
    Stopped,
    /// Not enough time has passed; render nothing
    Idle,
    /// Render exactly one frame
    Render,
}

/// Frame rate limiter with drift correction.
///
/// Times are milliseconds on any monotonic timeline.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval_ms: f64,
    last_frame_ms: f64,
    start_ms: f64,
    frame_count: u64,
    running: bool,
}

impl FrameClock {
    pub fn new(target_frame_rate: u32) -> Self {
        Self {
            interval_ms: 1000.0 / target_frame_rate.max(1) as f64,
            last_frame_ms: 0.0,
            start_ms: 0.0,
            frame_count: 0,
            running: false,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.last_frame_ms = now_ms;
        self.start_ms = now_ms;
        self.frame_count = 0;
        self.running = true;
        tracing::debug!("Frame clock started at {:.2} fps", 1000.0 / self.interval_ms);
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!("Frame clock stopped after {} frames", self.frame_count);
        }
        self.running = false;
    }

    /// Decides whether a frame is due at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        if !self.running {
            return Tick::Stopped;
        }

        let elapsed = now_ms - self.last_frame_ms;
        if elapsed < self.interval_ms {
            return Tick::Idle;
        }

        self.last_frame_ms = now_ms - elapsed % self.interval_ms;
        self.frame_count += 1;
        Tick::Render
    }

    /// Frames rendered since [`FrameClock::start`].
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frame rate since start, or 0 before the first frame.
    pub fn measured_fps(&self, now_ms: f64) -> f64 {
        let since_start = now_ms - self.start_ms;
        if self.frame_count == 0 || since_start <= 0.0 {
            return 0.0;
        }
        self.frame_count as f64 * 1000.0 / since_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_matches_target_over_one_second() {
        let mut clock = FrameClock::new(24);
        clock.start(0.0);

        let refresh = 1000.0 / 60.0;
        let mut frames = 0;
        let mut now = refresh;
        while now <= 1000.0 {
            if clock.tick(now) == Tick::Render {
                frames += 1;
            }
            now += refresh;
        }

        assert!((23..=25).contains(&frames), "rendered {frames} frames");
        assert_eq!(clock.frame_count(), frames);
    }

    #[test]
    fn test_rate_holds_over_long_runs() {
        let mut clock = FrameClock::new(24);
        clock.start(0.0);

        let mut frames = 0u64;
        for k in 1..=60 * 60 {
            if clock.tick(k as f64 * 16.67) == Tick::Render {
                frames += 1;
            }
        }

        // one minute of ticks at a refresh interval that does not divide 1000 / 24
        let expected = 3600.0 * 16.67 / (1000.0 / 24.0);
        assert!((frames as f64 - expected).abs() <= 1.0, "{frames} vs {expected}");
    }

    #[test]
    fn test_no_catch_up_after_stall() {
        let mut clock = FrameClock::new(10);
        clock.start(0.0);

        assert_eq!(clock.tick(1050.0), Tick::Render);
        // the backlog is dropped, only the partial interval is carried
        assert_eq!(clock.tick(1051.0), Tick::Idle);
        assert_eq!(clock.tick(1099.0), Tick::Idle);
        assert_eq!(clock.tick(1100.0), Tick::Render);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_idle_before_first_interval() {
        let mut clock = FrameClock::new(24);
        clock.start(100.0);
        assert_eq!(clock.tick(100.0), Tick::Idle);
        assert_eq!(clock.tick(141.0), Tick::Idle);
        assert_eq!(clock.tick(142.0), Tick::Render);
    }

    #[test]
    fn test_stopped_clock_never_renders() {
        let mut clock = FrameClock::new(24);
        assert_eq!(clock.tick(5000.0), Tick::Stopped);

        clock.start(0.0);
        clock.stop();
        assert_eq!(clock.tick(5000.0), Tick::Stopped);
        assert_eq!(clock.frame_count(), 0);
    }

    #[test]
    fn test_measured_fps() {
        let mut clock = FrameClock::new(20);
        clock.start(0.0);
        assert_eq!(clock.measured_fps(0.0), 0.0);
        for k in 1..=20 {
            clock.tick(k as f64 * 50.0);
        }
        assert!((clock.measured_fps(1000.0) - 20.0).abs() < 1e-9);
    }
}
