//! The live audio signal graph: gain stage, optional 3D panner, destination.
//!
//! The graph is a small state machine with two routing topologies. In
//! `Stereo` routing the voice passes through the gain stage straight to the
//! output; in `Spatial` routing it passes through the gain stage and the
//! equal-power panner. Switching topologies goes through one exclusive
//! entry point ([`AudioGraph::set_routing`]) between render blocks, so a
//! partially rewired graph is never rendered and the voice can never reach
//! the output through both paths at once.

mod gain;
mod panner;

pub use gain::Ramp;
pub use panner::{PannerConfig, PannerStage};

use crate::analysis::VolumeAnalyzer;
use crate::config::{FrameTiming, LipSonicConfig};
use crate::math::SpatialPose;
use crate::session::{PlaybackHandle, PlaybackSession};
use std::time::Duration;

/// Signal routing topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// gain -> destination
    Stereo,
    /// gain -> panner -> destination
    Spatial,
}

/// Result of rendering one block.
#[derive(Debug, Clone, Copy)]
pub struct RenderResult {
    pub frames_filled: usize,
}

/// Owns and wires the signal-processing stages.
///
/// All operations are no-ops rather than errors when no session is loaded;
/// callers are not required to check readiness. Mutated only by the
/// controller and the render path, which share it behind a mutex.
pub struct AudioGraph {
    sample_rate: u32,
    channels: u16,
    timing: FrameTiming,
    routing: Routing,
    gain: Ramp,
    panner: PannerStage,
    master_volume: f32,
    session: Option<PlaybackSession>,
    /// Natural-end notification, consumed exactly once by the controller.
    completed: Option<PlaybackHandle>,
    analyzer: VolumeAnalyzer,
    scratch: Vec<f32>,
}

impl AudioGraph {
    pub fn new(config: &LipSonicConfig, analyzer: VolumeAnalyzer) -> Self {
        let routing = if config.spatial_enabled {
            Routing::Spatial
        } else {
            Routing::Stereo
        };
        let master_volume = config.master_volume.clamp(0.0, 1.0);
        Self {
            sample_rate: config.sample_rate,
            channels: config.channels,
            timing: config.timing.clone(),
            routing,
            // In stereo routing the gain node carries master volume
            // directly; in spatial routing the first distance-driven
            // apply_gain anchors it.
            gain: Ramp::new(master_volume),
            panner: PannerStage::new(config.panner),
            master_volume,
            session: None,
            completed: None,
            analyzer,
            scratch: vec![0.0; config.block_size],
        }
    }

    pub fn routing(&self) -> Routing {
        self.routing
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn current_gain(&self) -> f32 {
        self.gain.current()
    }

    pub fn target_gain(&self) -> f32 {
        self.gain.target()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_handle(&self) -> Option<PlaybackHandle> {
        self.session.as_ref().map(|s| s.handle())
    }

    pub fn panner(&self) -> &PannerStage {
        &self.panner
    }

    pub fn set_panner_config(&mut self, config: PannerConfig) {
        self.panner.set_config(config);
    }

    /// Switch between stereo and spatial routing. Idempotent: repeating the
    /// current value changes nothing.
    pub fn set_routing(&mut self, spatial_enabled: bool) {
        let desired = if spatial_enabled {
            Routing::Spatial
        } else {
            Routing::Stereo
        };
        if desired == self.routing {
            return;
        }
        self.routing = desired;
        log::debug!("Audio graph rerouted to {:?}", desired);
        if desired == Routing::Stereo {
            // Distance attenuation no longer applies: the gain node goes
            // back to carrying master volume alone.
            self.gain
                .ramp_to(self.master_volume, self.timing.volume_ramp, self.sample_rate);
        }
        // Entering Spatial: the next distance-driven apply_gain anchors the
        // gain; until then the ramp holds its current value.
    }

    /// Schedule a smooth gain transition, cancelling any ramp in flight.
    /// In spatial routing `target` is distance gain already multiplied by
    /// master volume at the call site.
    pub fn apply_gain(&mut self, target: f32, ramp: Duration) {
        self.gain.ramp_to(target, ramp, self.sample_rate);
    }

    /// Master volume, clamped to `[0, 1]`. Stereo routing applies it to the
    /// gain node through a short ramp; spatial routing only stores the
    /// multiplier, anchored by the next distance-driven
    /// [`Self::apply_gain`].
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        if self.routing == Routing::Stereo {
            self.gain
                .ramp_to(self.master_volume, self.timing.volume_ramp, self.sample_rate);
        }
    }

    /// Push a fresh listener/emitter pose. Only meaningful in spatial
    /// routing; a no-op otherwise.
    pub fn update_pose(&mut self, pose: &SpatialPose) {
        if self.routing == Routing::Spatial {
            self.panner
                .update_pose(pose, self.timing.pose_smoothing, self.sample_rate);
        }
    }

    /// Install a new session, replacing any previous one. `initial_gain`
    /// anchors the gain node so playback does not glide in from a stale
    /// value, and the panner snaps to `pose`.
    pub fn load_session(
        &mut self,
        session: PlaybackSession,
        initial_gain: f32,
        pose: &SpatialPose,
    ) {
        if let Some(old) = self.session.take() {
            log::debug!("Session {} replaced before completion", old.handle());
        }
        self.completed = None;
        self.gain.set(initial_gain);
        self.panner.reset_to_pose(pose);
        self.analyzer.clear();
        log::info!("Session {} loaded into audio graph", session.handle());
        self.session = Some(session);
    }

    /// Remove the active session, if any. The pending natural-end
    /// notification (if one was already earned) is left intact.
    pub fn clear_session(&mut self) -> Option<PlaybackSession> {
        self.session.take()
    }

    /// Natural-end notification; `Some` at most once per session.
    pub fn take_completed(&mut self) -> Option<PlaybackHandle> {
        self.completed.take()
    }

    /// Render one block of interleaved output, mixing into `out`.
    ///
    /// Ramps advance per rendered frame here, sample-accurate and
    /// independent of the UI frame rate.
    pub fn render(&mut self, out: &mut [f32]) -> RenderResult {
        out.fill(0.0);
        let channels = self.channels as usize;
        let frame_count = out.len() / channels;

        let Some(session) = self.session.as_mut() else {
            return RenderResult { frames_filled: 0 };
        };

        if self.scratch.len() < frame_count {
            self.scratch.resize(frame_count, 0.0);
        }
        let frames = session.pull(&mut self.scratch[..frame_count]);

        // The analysis tap reads pre-gain source samples, like an analyser
        // wired directly to the source.
        self.analyzer.write(&self.scratch[..frames]);

        match self.routing {
            Routing::Stereo => {
                for i in 0..frames {
                    let sample = self.scratch[i] * self.gain.advance();
                    for ch in 0..channels {
                        out[i * channels + ch] += sample;
                    }
                }
            }
            Routing::Spatial => {
                for i in 0..frames {
                    let sample = self.scratch[i] * self.gain.advance();
                    let (left, right) = self.panner.advance();
                    if channels >= 2 {
                        out[i * channels] += sample * left;
                        out[i * channels + 1] += sample * right;
                    } else {
                        // Mono output: fold the panned pair back down.
                        out[i] += sample * (left + right) * std::f32::consts::FRAC_1_SQRT_2;
                    }
                }
            }
        }

        if session.finished() {
            let handle = session.handle();
            log::info!("Session {} completed naturally", handle);
            self.completed = Some(handle);
            self.session = None;
        }

        RenderResult {
            frames_filled: frames,
        }
    }
}
