/// Default stand-in for frames declaring no duration: one 60 Hz display tick.
pub const DEFAULT_ZERO_DURATION_MS: f64 = 1000.0 / 60.0;

/// Tracks how long the current frame has left on screen.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Time left before the current frame should end. Negative when a
    /// boundary has been overshot and not yet replenished.
    remaining_ms: f64,
    /// Duration used in place of zero or negative frame durations.
    zero_duration_ms: f64,
}

impl PlaybackClock {
    pub fn new(zero_duration_ms: f64) -> Self {
        let zero_duration_ms = if zero_duration_ms > 0.0 {
            zero_duration_ms
        } else {
            DEFAULT_ZERO_DURATION_MS
        };
        Self {
            remaining_ms: 0.0,
            zero_duration_ms,
        }
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Duration a frame actually occupies. NaN, zero and negative durations
    /// would stall or spin the clock, so they become one display tick.
    pub fn effective_duration(&self, duration_ms: f64) -> f64 {
        if duration_ms > 0.0 {
            duration_ms
        } else {
            self.zero_duration_ms
        }
    }

    /// Begin a freshly shown frame with its full duration.
    pub fn start_frame(&mut self, duration_ms: f64) {
        self.remaining_ms = self.effective_duration(duration_ms);
    }

    /// Consume `delta_ms` of playback time.
    ///
    /// Each time the budget runs out, `next_duration` is called to move to
    /// the next frame and report its duration; the overshoot carries into
    /// that frame. Returning `None` ends the walk (playback finished or
    /// failed). Returns the number of frame boundaries crossed.
    pub fn advance<F>(&mut self, delta_ms: f64, mut next_duration: F) -> u32
    where
        F: FnMut() -> Option<f64>,
    {
        self.remaining_ms -= delta_ms;
        let mut crossed = 0;
        while self.remaining_ms <= 0.0 {
            crossed += 1;
            match next_duration() {
                Some(duration) => self.remaining_ms += self.effective_duration(duration),
                None => break,
            }
        }
        crossed
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_DURATION_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_boundary_before_duration_elapses() {
        let mut clock = PlaybackClock::default();
        clock.start_frame(100.0);
        let crossed = clock.advance(40.0, || panic!("no frame should be requested"));
        assert_eq!(crossed, 0);
        assert!((clock.remaining_ms() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn exact_duration_crosses_boundary() {
        let mut clock = PlaybackClock::default();
        clock.start_frame(100.0);
        assert_eq!(clock.advance(100.0, || Some(100.0)), 1);
        assert!((clock.remaining_ms() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn large_delta_walks_every_frame() {
        let mut clock = PlaybackClock::default();
        clock.start_frame(10.0);
        let mut requested = 0;
        let crossed = clock.advance(35.0, || {
            requested += 1;
            Some(10.0)
        });
        assert_eq!(crossed, 3);
        assert_eq!(requested, 3);
        assert!((clock.remaining_ms() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn none_stops_the_walk() {
        let mut clock = PlaybackClock::default();
        clock.start_frame(10.0);
        let mut calls = 0;
        let crossed = clock.advance(100.0, || {
            calls += 1;
            if calls < 2 { Some(10.0) } else { None }
        });
        assert_eq!(crossed, 2);
        assert!(clock.remaining_ms() <= 0.0);
    }

    #[test]
    fn zero_duration_becomes_one_tick() {
        let mut clock = PlaybackClock::new(16.0);
        clock.start_frame(0.0);
        assert!((clock.remaining_ms() - 16.0).abs() < 1e-9);
        assert!((clock.effective_duration(-5.0) - 16.0).abs() < 1e-9);
        assert!((clock.effective_duration(f64::NAN) - 16.0).abs() < 1e-9);

        // a stream of zero-length frames cannot spin forever
        let crossed = clock.advance(40.0, || Some(0.0));
        assert_eq!(crossed, 2);
    }

    #[test]
    fn fractional_durations() {
        let mut clock = PlaybackClock::default();
        clock.start_frame(0.5);
        assert_eq!(clock.advance(0.25, || Some(0.5)), 0);
        assert_eq!(clock.advance(0.25, || Some(0.5)), 1);
    }

    #[test]
    fn invalid_tick_falls_back_to_default() {
        let clock = PlaybackClock::new(0.0);
        assert!((clock.effective_duration(0.0) - DEFAULT_ZERO_DURATION_MS).abs() < 1e-9);
    }
}
