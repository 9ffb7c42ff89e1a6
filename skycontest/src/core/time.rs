//! Implements timing for the application. Will compute delta times between
//! frames and the time elapsed since start
use std::time::{Duration, Instant};

pub struct Time {
    start_time: Instant,
    last_time: Instant,
    delta_time: Duration,
}

impl Time {
    pub fn new(current_instant: Instant) -> Self {
        Time {
            start_time: current_instant,
            last_time: current_instant,
            delta_time: Duration::ZERO,
        }
    }

    #[inline(always)]
    pub fn delta_seconds(&self) -> f32 {
        self.delta_time.as_secs_f32()
    }

    #[inline(always)]
    pub fn delta_milliseconds(&self) -> f32 {
        self.delta_seconds() * 1000.0
    }

    /// Seconds between the creation of this timer and the last step
    #[inline(always)]
    pub fn elapsed_seconds(&self) -> f32 {
        (self.last_time - self.start_time).as_secs_f32()
    }

    /// Frames per second derived from the last delta, 0 before the first step
    pub fn fps(&self) -> f32 {
        let delta = self.delta_seconds();
        if delta > 0.0 {
            1.0 / delta
        } else {
            0.0
        }
    }

    pub fn step(&mut self, instant: Instant) {
        self.delta_time = instant.saturating_duration_since(self.last_time);
        self.last_time = instant;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}
