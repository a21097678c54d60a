//! Movement cadence
//!
//! Converts per-frame deltas into simulation ticks at a fixed logical rate,
//! independent of how fast frames arrive.

use crate::consts::SECOND_MS;

/// Tick scheduler counting moves within the current real second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCadence {
    moves_per_second: f32,
    /// Time into the current second (ms)
    second_elapsed: f32,
    moves_this_second: u32,
}

impl MoveCadence {
    pub fn new(moves_per_second: f32) -> Self {
        Self {
            moves_per_second,
            second_elapsed: 0.0,
            moves_this_second: 0,
        }
    }

    pub fn reset(&mut self) {
        self.second_elapsed = 0.0;
        self.moves_this_second = 0;
    }

    /// Feed one frame of `dt` ms. Returns true when a tick is due this frame.
    ///
    /// At most one tick fires per frame, and no second holds more than
    /// `moves_per_second` of them. The frame that crosses a second boundary
    /// may still land that second's last move before the rollover.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.second_elapsed += dt.max(0.0);

        let target = self.second_elapsed.min(SECOND_MS) * self.moves_per_second / SECOND_MS;
        let due = (self.moves_this_second as f32) < target;
        if due {
            self.moves_this_second += 1;
        }

        if self.second_elapsed >= SECOND_MS {
            self.second_elapsed %= SECOND_MS;
            self.moves_this_second = 0;
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_frames_of_100ms_fire_ten_ticks() {
        let mut cadence = MoveCadence::new(10.0);
        let ticks = (0..10).filter(|_| cadence.advance(100.0)).count();
        assert_eq!(ticks, 10);
    }

    #[test]
    fn test_fast_frames_hold_the_rate() {
        let mut cadence = MoveCadence::new(10.0);
        // Five seconds of 16 ms frames
        let ticks = (0..(5000 / 16)).filter(|_| cadence.advance(16.0)).count();
        assert_eq!(ticks, 50);
    }

    #[test]
    fn test_each_real_second_gets_exactly_its_moves() {
        let mut cadence = MoveCadence::new(10.0);
        let mut per_second = [0u32; 3];
        let mut now = 0u32;
        while now + 16 < 3000 {
            now += 16;
            if cadence.advance(16.0) {
                per_second[(now / 1000) as usize] += 1;
            }
        }
        assert_eq!(per_second, [10, 10, 10]);
    }

    #[test]
    fn test_boundary_frame_cannot_borrow_from_next_second() {
        let mut cadence = MoveCadence::new(10.0);
        // Nine moves land in the first 900 ms
        let early = (0..9).filter(|_| cadence.advance(100.0)).count();
        assert_eq!(early, 9);
        // A long frame crossing the boundary completes the second with one move
        assert!(cadence.advance(150.0));
        // 50 ms into the new second only its first move is owed
        assert!(cadence.advance(0.0));
        assert!(!cadence.advance(0.0));
    }

    #[test]
    fn test_one_tick_per_frame_at_most() {
        let mut cadence = MoveCadence::new(10.0);
        assert!(cadence.advance(900.0));
        // Eight more were due but only one fires per frame
        assert!(cadence.advance(0.0));
        assert!(cadence.advance(0.0));
    }

    #[test]
    fn test_reset() {
        let mut cadence = MoveCadence::new(10.0);
        cadence.advance(50.0);
        cadence.reset();
        assert_eq!(cadence, MoveCadence::new(10.0));
    }
}
