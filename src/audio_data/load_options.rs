use std::time::Duration;

/// Options controlling how an audio asset is decoded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Target sample rate for resampling (None = keep original)
    pub target_sample_rate: Option<u32>,
    /// Convert to mono after loading
    pub convert_to_mono: bool,
    /// Maximum duration to load (None = load entire file)
    pub max_duration: Option<Duration>,
    /// Which channel to use for mono conversion (None = mix all channels)
    pub mono_channel: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            target_sample_rate: None,
            convert_to_mono: false,
            max_duration: None,
            mono_channel: None,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a voice session: mono, resampled to the engine rate.
    pub fn voice(engine_sample_rate: u32) -> Self {
        Self::new()
            .convert_to_mono(true)
            .target_sample_rate(engine_sample_rate)
    }

    pub fn target_sample_rate(mut self, rate: u32) -> Self {
        self.target_sample_rate = Some(rate);
        self
    }

    pub fn convert_to_mono(mut self, convert: bool) -> Self {
        self.convert_to_mono = convert;
        self
    }

    pub fn max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    pub fn mono_channel(mut self, channel: usize) -> Self {
        self.mono_channel = Some(channel);
        self
    }
}
