//! Frame clock for the render loop.

use std::time::{Duration, Instant};

/// Longest frame delta handed to gameplay. Window drags and debugger pauses otherwise
/// produce multi-second steps.
const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(100);

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame (after clamping).
    delta: Duration,
    /// Total simulated time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Upper bound on a single frame delta.
    max_delta: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Update timing at the start of a new frame from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let raw = now - self.last_frame;
        self.last_frame = now;
        self.advance(raw);
    }

    /// Advance by an explicit delta (clamped to the max delta).
    pub fn advance(&mut self, raw: Duration) {
        if raw > self.max_delta {
            log::debug!("Frame hitch of {:?} clamped to {:?}", raw, self.max_delta);
        }
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (from the last frame).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_elapsed_and_frames() {
        let mut t = Time::new();
        for _ in 0..3 {
            t.advance(Duration::from_millis(20));
        }
        assert_eq!(t.frame_count(), 3);
        assert!((t.elapsed_seconds() - 0.06).abs() < 1e-6);
        assert!((t.fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut t = Time::new();
        t.advance(Duration::from_secs(3));
        assert!((t.delta_seconds() - 0.1).abs() < 1e-6);
    }
}
