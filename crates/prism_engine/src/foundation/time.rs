//! Frame timing utilities

use std::time::Instant;

/// Per-frame clock driving camera movement and animation
///
/// Call [`FrameClock::tick`] once at the top of each frame; the returned
/// delta is the elapsed time since the previous tick in seconds.
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock; the first tick measures from this point
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the clock by one frame and return the delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Time since the last tick in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total elapsed time across all ticks in seconds
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_accumulates() {
        let mut clock = FrameClock::new();
        let d1 = clock.tick();
        let d2 = clock.tick();
        assert!(d1 >= 0.0 && d2 >= 0.0);
        assert_eq!(clock.frame_count(), 2);
        assert!(clock.total_time() >= d2);
    }
}
