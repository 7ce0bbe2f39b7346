//! Decoded audio data and the loading pipeline.

mod load_options;
mod loader;
mod resampler;

pub use load_options::LoadOptions;
pub use resampler::AudioResampler;

use crate::error::{LipSonicError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Decoded PCM audio.
///
/// Samples are stored interleaved (`[L0, R0, L1, R1, ...]` for stereo,
/// plain `[M0, M1, ...]` for mono). Voice sessions run mono at the engine
/// sample rate; [`to_mono`](Self::to_mono) and [`resample`](Self::resample)
/// convert on load.
#[derive(Debug, Clone)]
pub struct AudioData {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    duration: Duration,
    total_frames: usize,
}

impl AudioData {
    /// Build from raw interleaved samples.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let total_frames = samples.len() / channels.max(1) as usize;
        let duration = if sample_rate > 0 {
            Duration::from_secs_f64(total_frames as f64 / sample_rate as f64)
        } else {
            Duration::ZERO
        };
        Self {
            samples,
            sample_rate,
            channels,
            duration,
            total_frames,
        }
    }

    /// Decode an audio file (WAV, MP3, FLAC, OGG, M4A, ...) with default
    /// options.
    pub fn from_path(path: &str) -> Result<Arc<Self>> {
        Ok(Arc::new(loader::load_audio_file(path, &LoadOptions::default())?))
    }

    /// Decode an audio file with custom loading options.
    pub fn from_path_with_options(path: &str, options: &LoadOptions) -> Result<Arc<Self>> {
        Ok(Arc::new(loader::load_audio_file(path, options)?))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Downmix all channels to mono by averaging each frame.
    pub fn to_mono(&self) -> Result<Self> {
        if self.channels == 1 {
            return Ok(self.clone());
        }
        if self.channels == 0 {
            return Err(LipSonicError::AudioFormat(
                "Cannot downmix audio with 0 channels".to_string(),
            ));
        }

        let mono_samples: Vec<f32> = self
            .samples
            .chunks(self.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / self.channels as f32)
            .collect();

        Ok(Self::from_samples(mono_samples, self.sample_rate, 1))
    }

    /// Resample to a different rate, returning a new `AudioData`.
    pub fn resample(&self, target_sample_rate: u32) -> Result<Self> {
        if target_sample_rate == self.sample_rate {
            return Ok(self.clone());
        }

        let resampler = AudioResampler::new(
            self.sample_rate,
            target_sample_rate,
            self.channels,
            None,
        )?;
        let resampled = resampler.resample_interleaved(&self.samples)?;

        Ok(Self::from_samples(
            resampled,
            target_sample_rate,
            self.channels,
        ))
    }
}
