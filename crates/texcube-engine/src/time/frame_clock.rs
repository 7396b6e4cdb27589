use std::time::{Duration, Instant};

/// Timing of one idle tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds since the clock started (sum of clamped deltas).
    pub elapsed: f64,

    /// Monotonic tick counter, starting at 0.
    pub frame_index: u64,
}

/// Per-loop tick clock.
///
/// Delta time is clamped so a stall (debugger, window drag) does not turn into
/// one huge time-based rotation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock whose first tick is measured from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            elapsed: 0.0,
            frame_index: 0,
            dt_min: Duration::ZERO,
            dt_max: Duration::from_millis(250),
        }
    }

    pub fn with_clamps(mut self, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        self
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();
        self.last = now;
        self.elapsed += dt as f64;

        let ft = FrameTime {
            dt,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_count_up_from_zero() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let a = clock.tick_at(start + Duration::from_millis(16));
        let b = clock.tick_at(start + Duration::from_millis(32));
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert!((a.dt - 0.016).abs() < 1e-6);
        assert!((b.elapsed - 0.032).abs() < 1e-6);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(ft.dt, 0.25);
    }

    #[test]
    fn time_going_backwards_yields_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.tick_at(start - Duration::from_millis(10));
        assert_eq!(ft.dt, 0.0);
    }

    #[test]
    fn custom_minimum_applies() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start)
            .with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let ft = clock.tick_at(start);
        assert!((ft.dt - 0.001).abs() < 1e-6);
    }
}
