//! Waveform volume analysis driving the mouth-open blend shape.
//!
//! The render path taps the most recent pre-gain source samples into a
//! fixed-size rolling window; [`VolumeAnalyzer::volume`] reduces that window
//! to a single lip-sync weight in `[0, 1]` on demand. Peak amplitude is used
//! instead of RMS so the mouth reacts to transients.

use std::sync::{Arc, Mutex};

/// Sigmoid shaping constants for the lip-sync volume curve.
///
/// `1 / (1 + exp(multiplier * peak + offset))` maps near-silence to ~0 and
/// any meaningful peak rapidly to ~1, which reads as a snappy, almost binary
/// mouth movement. Results below `threshold` are forced to exactly zero to
/// suppress noise-floor jitter.
#[derive(Debug, Clone, Copy)]
pub struct VolumeShaping {
    pub multiplier: f32,
    pub offset: f32,
    pub threshold: f32,
}

impl Default for VolumeShaping {
    fn default() -> Self {
        Self {
            multiplier: -45.0,
            offset: 5.0,
            threshold: 0.1,
        }
    }
}

impl VolumeShaping {
    /// Map a peak amplitude to a mouth-open weight in `[0, 1]`.
    pub fn shape(&self, peak: f32) -> f32 {
        let volume = 1.0 / (1.0 + (self.multiplier * peak + self.offset).exp());
        if volume < self.threshold { 0.0 } else { volume }
    }
}

/// Rolling window of the most recent source samples.
#[derive(Debug)]
struct AnalysisWindow {
    samples: Vec<f32>,
    write_pos: usize,
}

impl AnalysisWindow {
    fn new(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
            write_pos: 0,
        }
    }

    fn extend(&mut self, block: &[f32]) {
        for &sample in block {
            self.samples[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.samples.len();
        }
    }

    fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_pos = 0;
    }
}

/// Shared volume analyzer: the render path writes, the frame driver reads.
///
/// Cloning is cheap and shares the underlying window.
#[derive(Debug, Clone)]
pub struct VolumeAnalyzer {
    window: Arc<Mutex<AnalysisWindow>>,
    shaping: VolumeShaping,
}

impl VolumeAnalyzer {
    /// `window_size` is the analysis window in samples (power of two,
    /// validated at config level).
    pub fn new(window_size: usize, shaping: VolumeShaping) -> Self {
        Self {
            window: Arc::new(Mutex::new(AnalysisWindow::new(window_size))),
            shaping,
        }
    }

    /// Render-side tap. Never blocks the audio deadline: on lock contention
    /// the block is skipped and the window keeps its previous contents.
    pub fn write(&self, block: &[f32]) {
        match self.window.try_lock() {
            Ok(mut window) => window.extend(block),
            Err(_) => log::warn!("Analysis window contended, skipping tap write"),
        }
    }

    /// Current lip-sync weight in `[0, 1]`.
    pub fn volume(&self) -> f32 {
        let window = self.window.lock().unwrap();
        self.shaping.shape(window.peak())
    }

    pub fn clear(&self) {
        self.window.lock().unwrap().clear();
    }
}
