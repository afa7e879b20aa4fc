use std::time::{Duration, Instant};

/// Monotonic frame clock.
///
/// Read once per frame via [`Clock::tick`], which consumes the elapsed delta.
/// Never needs a reset: the first tick after construction reports the time
/// since creation.
pub struct Clock {
    start_time: Instant,
    last_tick: Instant,
    /// Total elapsed time since creation.
    pub elapsed: Duration,
    /// Total number of ticks.
    pub frame_count: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a new clock starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_tick: now,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the clock and returns the delta since the previous tick,
    /// in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        self.elapsed = now - self.start_time;
        self.frame_count += 1;
        delta.as_secs_f32()
    }

    /// Total elapsed seconds since the clock was created.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
