//! Sample-accurate linear parameter ramps.

use std::time::Duration;

/// A scalar audio parameter with scheduled linear transitions.
///
/// Scheduling a new ramp cancels any ramp already in flight (last writer
/// wins; competing ramps never stack). The ramp is advanced once per
/// rendered frame, so transitions are sample-accurate rather than tied to
/// the UI frame rate.
#[derive(Debug, Clone, Copy)]
pub struct Ramp {
    current: f32,
    target: f32,
    step: f32,
    remaining_frames: u32,
}

impl Ramp {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining_frames: 0,
        }
    }

    /// Schedule a linear transition to `target` over `duration`.
    pub fn ramp_to(&mut self, target: f32, duration: Duration, sample_rate: u32) {
        let frames = (duration.as_secs_f64() * sample_rate as f64).round() as u32;
        if frames == 0 {
            self.set(target);
            return;
        }
        self.target = target;
        self.remaining_frames = frames;
        self.step = (target - self.current) / frames as f32;
    }

    /// Jump immediately, cancelling any ramp.
    pub fn set(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining_frames = 0;
    }

    /// Advance one frame and return the value to apply to it.
    pub fn advance(&mut self) -> f32 {
        if self.remaining_frames > 0 {
            self.current += self.step;
            self.remaining_frames -= 1;
            if self.remaining_frames == 0 {
                // Land exactly on target, independent of rounding drift.
                self.current = self.target;
            }
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining_frames > 0
    }
}
