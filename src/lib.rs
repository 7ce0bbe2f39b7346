//! # lipsonic
//!
//! Audio-reactive lip-sync and 3D spatial audio for character viewers.
//!
//! lipsonic plays a single voice channel, derives a per-frame mouth-open
//! weight from the waveform for blend-shape animation, and positions the
//! voice in 3D relative to a listener with smooth, click-free gain and pan
//! transitions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lipsonic::*;
//!
//! let config = LipSonicConfig::default();
//! let mut controller = PlaybackController::new(config.clone())?;
//!
//! // Route the graph to the default output device.
//! let mut engine = AudioEngine::new(config, controller.graph())?;
//! engine.start()?;
//!
//! // Start a voice line; decoding happens off-thread.
//! controller.play("voice.wav")?;
//!
//! // Every frame, the render loop drives the controller:
//! let pose = SpatialPose::new(
//!     Pose::from_position(Vec3::new(0.0, 1.5, 2.0)), // camera
//!     Vec3::new(0.0, 1.5, 0.0),                      // character mouth
//! );
//! controller.update(pose);
//! let mouth_open = controller.volume(); // drive the blend shape
//!
//! for event in controller.poll_events() {
//!     if let PlaybackEvent::SourceCompleted { .. } = event {
//!         println!("voice line finished");
//!     }
//! }
//! # Ok::<(), LipSonicError>(())
//! ```
//!
//! ## Key Components
//!
//! - [`PlaybackController`]: session lifecycle and the per-frame surface
//! - [`AudioGraph`]: gain stage + optional equal-power panner, switched
//!   between stereo and spatial routing without discontinuity
//! - [`AttenuationCurve`]: distance to gain, exponential decay
//! - [`VolumeAnalyzer`]: waveform peak to mouth-open weight
//! - [`AudioEngine`]: cpal output stream driving the graph
//!
//! ## Architecture
//!
//! The rendering layer owns the frame loop and calls
//! [`PlaybackController::update`] once per frame with the current listener
//! and character transforms; distance gain is recomputed on a throttled
//! interval and smoothed by sample-accurate ramps inside the graph, so the
//! coarser control rate is inaudible. Asset decoding is the only
//! long-latency operation and runs on a worker thread; everything else is
//! cooperative and frame-driven.

pub mod analysis;
pub mod attenuation;
pub mod audio_data;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod graph;
pub mod math;
pub mod session;

pub use analysis::{VolumeAnalyzer, VolumeShaping};
pub use attenuation::AttenuationCurve;
pub use audio_data::{AudioData, LoadOptions};
pub use config::{FrameTiming, LipSonicConfig};
pub use controller::PlaybackController;
pub use engine::AudioEngine;
pub use error::LipSonicError;
pub use events::PlaybackEvent;
pub use graph::{AudioGraph, PannerConfig, Routing};
pub use math::{Pose, Quat, SpatialPose, Vec3};
pub use session::{PlaybackHandle, PlaybackState};
