//! Audio output engine: pulls rendered blocks from the shared graph into a
//! cpal output stream.

use crate::config::LipSonicConfig;
use crate::error::{LipSonicError, Result};
use crate::graph::AudioGraph;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Owns the output stream and drives [`AudioGraph::render`] from the audio
/// callback.
///
/// The controller stays usable without an engine (tests render the graph
/// directly); the engine is only the path to a real output device.
pub struct AudioEngine {
    config: LipSonicConfig,
    graph: Arc<Mutex<AudioGraph>>,
    stream: Option<cpal::Stream>,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
}

impl AudioEngine {
    pub fn new(config: LipSonicConfig, graph: Arc<Mutex<AudioGraph>>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            graph,
            stream: None,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Open the default output device and start streaming.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            LipSonicError::AudioDevice("No default output device available".to_string())
        })?;

        let config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.config.block_size as u32),
        };

        let default_config = device.default_output_config().map_err(|e| {
            LipSonicError::AudioDevice(format!("Failed to get default config: {}", e))
        })?;

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.create_stream::<f32>(&device, &config)?,
            cpal::SampleFormat::I16 => self.create_stream::<i16>(&device, &config)?,
            cpal::SampleFormat::U16 => self.create_stream::<u16>(&device, &config)?,
            _ => {
                return Err(LipSonicError::AudioFormat(
                    "Unsupported sample format".to_string(),
                ));
            }
        };

        stream.play().map_err(|e| {
            LipSonicError::AudioDevice(format!("Failed to start stream: {}", e))
        })?;

        self.stream = Some(stream);
        self.is_running.store(true, Ordering::Relaxed);
        log::info!(
            "Audio engine started ({} Hz, {} channels, block {})",
            self.config.sample_rate,
            self.config.channels,
            self.config.block_size
        );

        Ok(())
    }

    /// Stop the output stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            self.is_running.store(false, Ordering::Relaxed);
            drop(stream); // This stops the stream
            log::info!("Audio engine stopped");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Audio frames rendered since start.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &LipSonicConfig {
        &self.config
    }

    fn create_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let graph = Arc::clone(&self.graph);
        let is_running = Arc::clone(&self.is_running);
        let frames_processed = Arc::clone(&self.frames_processed);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    let mut temp_buffer = vec![0.0f32; data.len()];

                    // Never block the audio deadline on the graph lock; a
                    // skipped block renders as silence.
                    match graph.try_lock() {
                        Ok(mut graph) => {
                            let result = graph.render(&mut temp_buffer);
                            frames_processed.fetch_add(result.frames_filled, Ordering::Relaxed);
                        }
                        Err(_) => {
                            log::warn!("Audio graph contended, rendering silence");
                        }
                    }

                    for (out, &rendered) in data.iter_mut().zip(temp_buffer.iter()) {
                        *out = T::from_sample(rendered);
                    }
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| LipSonicError::AudioDevice(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
