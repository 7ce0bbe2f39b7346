//! Configuration for lipsonic

use crate::analysis::VolumeShaping;
use crate::attenuation::AttenuationCurve;
use crate::error::{LipSonicError, Result};
use crate::graph::PannerConfig;
use std::time::Duration;

/// Couples the throttled distance-update interval with the gain ramp that
/// smooths over it.
///
/// Distance gain is recomputed every `update_interval` frames of the driving
/// loop as a performance optimization. The throttling must never change where
/// the gain converges, only how smooth the path is, so the ramp has to cover
/// the sampling interval; [`FrameTiming::validate`] enforces that.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Recompute distance gain every N frames of the driving loop.
    pub update_interval: u32,
    /// Nominal frame rate of the driving loop, used to validate ramp cover.
    pub nominal_frame_rate: f32,
    /// Ramp duration for distance-driven gain changes.
    pub gain_ramp: Duration,
    /// Ramp duration for master-volume changes in stereo routing.
    pub volume_ramp: Duration,
    /// Smoothing window for listener/emitter pose updates.
    pub pose_smoothing: Duration,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            update_interval: 3,
            nominal_frame_rate: 60.0,
            gain_ramp: Duration::from_millis(100),
            volume_ramp: Duration::from_millis(50),
            pose_smoothing: Duration::from_millis(100),
        }
    }
}

impl FrameTiming {
    pub fn validate(&self) -> Result<()> {
        if self.update_interval == 0 {
            return Err(LipSonicError::Configuration(
                "update_interval must be at least 1 frame".to_string(),
            ));
        }
        if self.nominal_frame_rate <= 0.0 {
            return Err(LipSonicError::Configuration(
                "nominal_frame_rate must be positive".to_string(),
            ));
        }
        let sampling_interval = self.update_interval as f32 / self.nominal_frame_rate;
        if self.gain_ramp.as_secs_f32() < sampling_interval {
            return Err(LipSonicError::Configuration(format!(
                "gain_ramp ({:?}) must cover the distance sampling interval ({} frames at {} fps = {:.0} ms)",
                self.gain_ramp,
                self.update_interval,
                self.nominal_frame_rate,
                sampling_interval * 1000.0,
            )));
        }
        Ok(())
    }
}

/// Top-level engine and graph configuration.
#[derive(Debug, Clone)]
pub struct LipSonicConfig {
    pub sample_rate: u32,
    pub block_size: usize,
    pub channels: u16,
    /// Analysis window in samples; power of two.
    pub analysis_window: usize,
    pub shaping: VolumeShaping,
    pub attenuation: AttenuationCurve,
    pub panner: PannerConfig,
    pub timing: FrameTiming,
    pub spatial_enabled: bool,
    pub master_volume: f32,
}

impl Default for LipSonicConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 512,
            channels: 2,
            analysis_window: 2048,
            shaping: VolumeShaping::default(),
            attenuation: AttenuationCurve::default(),
            panner: PannerConfig::default(),
            timing: FrameTiming::default(),
            spatial_enabled: true,
            master_volume: 0.5,
        }
    }
}

impl LipSonicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn analysis_window(mut self, samples: usize) -> Self {
        self.analysis_window = samples;
        self
    }

    pub fn attenuation(mut self, curve: AttenuationCurve) -> Self {
        self.attenuation = curve;
        self
    }

    pub fn timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn spatial_enabled(mut self, enabled: bool) -> Self {
        self.spatial_enabled = enabled;
        self
    }

    pub fn master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(LipSonicError::Configuration(
                "sample_rate must be greater than 0".to_string(),
            ));
        }
        if self.channels == 0 {
            return Err(LipSonicError::Configuration(
                "channel count must be greater than 0".to_string(),
            ));
        }
        if self.analysis_window == 0 || !self.analysis_window.is_power_of_two() {
            return Err(LipSonicError::Configuration(format!(
                "analysis_window must be a power of two, got {}",
                self.analysis_window
            )));
        }
        self.timing.validate()
    }
}
