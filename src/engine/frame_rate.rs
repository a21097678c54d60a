//! Frame timing
//!
//! [`FrameClock`] turns monotonic timestamps into per-iteration deltas;
//! [`FrameRateTracker`] turns iterations into one FPS sample per real second.

use crate::consts::SECOND_MS;

/// Delta-time source for the loop
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_frame_ms: u64,
}

impl FrameClock {
    pub fn new(now_ms: u64) -> Self {
        Self { last_frame_ms: now_ms }
    }

    /// Milliseconds since the previous call, never negative
    pub fn delta(&mut self, now_ms: u64) -> f32 {
        let dt = now_ms.saturating_sub(self.last_frame_ms);
        self.last_frame_ms = self.last_frame_ms.max(now_ms);
        dt as f32
    }
}

/// Counts iterations and reports a measurement once per rollover
#[derive(Debug, Clone, Copy)]
pub struct FrameRateTracker {
    mark_ms: u64,
    frames_this_second: u32,
    current_fps: u32,
}

impl FrameRateTracker {
    pub fn new(now_ms: u64) -> Self {
        Self {
            mark_ms: now_ms,
            frames_this_second: 0,
            current_fps: 0,
        }
    }

    /// Most recent completed measurement (0 before the first rollover)
    pub fn current_fps(&self) -> u32 {
        self.current_fps
    }

    /// Call exactly once per loop iteration.
    ///
    /// Returns the number of iterations in the second that just completed
    /// when at least 1000 ms have passed since the last rollover, 0 otherwise.
    pub fn on_update(&mut self, now_ms: u64) -> u32 {
        self.frames_this_second += 1;

        if now_ms.saturating_sub(self.mark_ms) as f32 >= SECOND_MS {
            self.current_fps = self.frames_this_second;
            self.frames_this_second = 0;
            self.mark_ms = now_ms;
            return self.current_fps;
        }

        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_delta_clamps_backwards_time() {
        let mut clock = FrameClock::new(100);
        assert_eq!(clock.delta(116), 16.0);
        assert_eq!(clock.delta(110), 0.0);
        assert_eq!(clock.delta(132), 16.0);
    }

    #[test]
    fn test_no_measurement_before_a_second() {
        let mut fps = FrameRateTracker::new(0);
        for i in 1..=60 {
            assert_eq!(fps.on_update(i * 16), 0, "call {} at {} ms", i, i * 16);
        }
        assert_eq!(fps.current_fps(), 0);
    }

    #[test]
    fn test_rollover_reports_updates_since_mark() {
        let mut fps = FrameRateTracker::new(0);
        let mut calls = 0;
        let mut t = 0;
        let sample = loop {
            t += 16;
            calls += 1;
            let sample = fps.on_update(t);
            if sample != 0 {
                break sample;
            }
        };
        assert!(t >= 1000);
        assert_eq!(sample, calls);
        assert_eq!(fps.current_fps(), calls);

        // Counter restarts from the new mark
        assert_eq!(fps.on_update(t + 16), 0);
    }

    #[test]
    fn test_exactly_one_second_rolls_over() {
        let mut fps = FrameRateTracker::new(500);
        assert_eq!(fps.on_update(1499), 0);
        assert_eq!(fps.on_update(1500), 2);
    }
}
