//! Equal-power 3D panner stage.

use crate::graph::gain::Ramp;
use crate::math::{SpatialPose, Vec3};
use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

/// Panner parameters in the style of a WebAudio `PannerNode`.
///
/// Distance rolloff defaults to neutral (0.0): distance gain is the
/// attenuation curve's job, applied through the gain stage. The parameters
/// still propagate to a live graph for callers that want panner-side
/// rolloff or directional cones.
#[derive(Debug, Clone, Copy)]
pub struct PannerConfig {
    pub ref_distance: f32,
    pub max_distance: f32,
    pub rolloff_factor: f32,
    /// Cone angles in degrees; 360 means omnidirectional.
    pub cone_inner_angle: f32,
    pub cone_outer_angle: f32,
    pub cone_outer_gain: f32,
}

impl Default for PannerConfig {
    fn default() -> Self {
        Self {
            ref_distance: 1.0,
            max_distance: 10000.0,
            rolloff_factor: 0.0,
            cone_inner_angle: 360.0,
            cone_outer_angle: 360.0,
            cone_outer_gain: 0.0,
        }
    }
}

/// Positions the mono voice in the stereo field from the listener's point
/// of view.
///
/// Pan and directional gain are ramped over the pose smoothing window
/// rather than snapped: the driving loop samples poses at a reduced rate,
/// and the ramps keep the perceived motion fluid over that coarser
/// sampling.
#[derive(Debug)]
pub struct PannerStage {
    config: PannerConfig,
    /// Orientation of the emitter, for cone shaping. Fixed facing -Z by
    /// default; irrelevant while the cones are omni.
    emitter_forward: Vec3,
    pan: Ramp,
    directional_gain: Ramp,
}

impl PannerStage {
    pub fn new(config: PannerConfig) -> Self {
        Self {
            config,
            emitter_forward: -Vec3::Z,
            pan: Ramp::new(0.0),
            directional_gain: Ramp::new(1.0),
        }
    }

    pub fn config(&self) -> PannerConfig {
        self.config
    }

    /// Live parameter update; takes effect from the next pose sample.
    pub fn set_config(&mut self, config: PannerConfig) {
        self.config = config;
    }

    pub fn set_emitter_forward(&mut self, forward: Vec3) {
        self.emitter_forward = forward.normalize_or_zero();
    }

    /// Re-aim the smoothing ramps from a fresh pose sample.
    pub fn update_pose(&mut self, pose: &SpatialPose, smoothing: Duration, sample_rate: u32) {
        let target_pan = Self::pan_for(pose);
        let gain = self.distance_gain(pose.distance()) * self.cone_gain(pose);
        self.pan.ramp_to(target_pan, smoothing, sample_rate);
        self.directional_gain.ramp_to(gain, smoothing, sample_rate);
    }

    /// Per-frame stereo weights `(left, right)`, advancing the ramps.
    ///
    /// Constant-power panning: left^2 + right^2 stays at the directional
    /// gain squared across the stereo field.
    pub fn advance(&mut self) -> (f32, f32) {
        let pan = self.pan.advance();
        let gain = self.directional_gain.advance();
        let angle = (pan + 1.0) * FRAC_PI_4;
        (gain * angle.cos(), gain * angle.sin())
    }

    /// Current (smoothed) pan position in [-1, 1].
    pub fn pan(&self) -> f32 {
        self.pan.current()
    }

    /// Snap the ramps, for session starts where gliding in from stale
    /// values would be audible.
    pub fn reset_to_pose(&mut self, pose: &SpatialPose) {
        self.pan.set(Self::pan_for(pose));
        self.directional_gain
            .set(self.distance_gain(pose.distance()) * self.cone_gain(pose));
    }

    /// Pan target from the emitter direction in listener space: the
    /// right-axis component of the normalized direction.
    fn pan_for(pose: &SpatialPose) -> f32 {
        let to_emitter = pose.emitter - pose.listener.position;
        let length = to_emitter.length();
        if length < 1e-4 {
            // Emitter at the listener's head: keep it centered.
            return 0.0;
        }
        (to_emitter / length).dot(pose.listener.right()).clamp(-1.0, 1.0)
    }

    /// Inverse-distance rolloff; unity when `rolloff_factor` is 0.
    fn distance_gain(&self, distance: f32) -> f32 {
        if self.config.rolloff_factor <= 0.0 {
            return 1.0;
        }
        let clamped = distance.clamp(self.config.ref_distance, self.config.max_distance);
        self.config.ref_distance
            / (self.config.ref_distance
                + self.config.rolloff_factor * (clamped - self.config.ref_distance))
    }

    /// Directional cone gain; unity while the inner cone is omni.
    fn cone_gain(&self, pose: &SpatialPose) -> f32 {
        if self.config.cone_inner_angle >= 360.0 {
            return 1.0;
        }
        let to_listener = pose.listener.position - pose.emitter;
        if to_listener.length_squared() < 1e-8 {
            return 1.0;
        }
        let angle = self
            .emitter_forward
            .angle_between(to_listener.normalize())
            .to_degrees();
        let inner = self.config.cone_inner_angle * 0.5;
        let outer = self.config.cone_outer_angle * 0.5;
        if angle <= inner {
            1.0
        } else if angle >= outer {
            self.config.cone_outer_gain
        } else {
            let t = (angle - inner) / (outer - inner);
            1.0 + (self.config.cone_outer_gain - 1.0) * t
        }
    }
}
