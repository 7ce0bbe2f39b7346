//! Playback control: session lifecycle and the per-frame surface the UI
//! and animation layers drive.
//!
//! The controller owns the only [`AudioGraph`] and is the single place
//! sessions are created and destroyed. Asset decoding is the one
//! long-latency operation, so it runs on a short-lived worker thread and
//! hands its result back over a channel; [`PlaybackController::update`]
//! drains that channel every frame without ever blocking the driving loop.

use crate::analysis::VolumeAnalyzer;
use crate::attenuation::AttenuationCurve;
use crate::audio_data::{AudioData, LoadOptions};
use crate::config::LipSonicConfig;
use crate::error::{LipSonicError, Result};
use crate::events::PlaybackEvent;
use crate::graph::{AudioGraph, PannerConfig, Routing};
use crate::math::SpatialPose;
use crate::session::{PlaybackHandle, PlaybackSession, PlaybackState};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::{Arc, Mutex};
use std::thread;

struct DecodeResult {
    handle: PlaybackHandle,
    outcome: Result<Arc<AudioData>>,
}

/// Orchestrates playback of a single voice channel.
///
/// At most one session is active per controller; starting a new one stops
/// the previous one first. The rendering layer drives
/// [`update`](Self::update) once per frame and reads
/// [`volume`](Self::volume) to animate the mouth.
pub struct PlaybackController {
    config: LipSonicConfig,
    graph: Arc<Mutex<AudioGraph>>,
    analyzer: VolumeAnalyzer,
    attenuation: AttenuationCurve,
    state: PlaybackState,
    frame_counter: u64,
    last_pose: SpatialPose,
    decode_tx: Sender<DecodeResult>,
    decode_rx: Receiver<DecodeResult>,
    event_tx: Sender<PlaybackEvent>,
    event_rx: Receiver<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new(config: LipSonicConfig) -> Result<Self> {
        config.validate()?;

        let analyzer = VolumeAnalyzer::new(config.analysis_window, config.shaping);
        let graph = Arc::new(Mutex::new(AudioGraph::new(&config, analyzer.clone())));
        let attenuation = config.attenuation;
        let (decode_tx, decode_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        Ok(Self {
            config,
            graph,
            analyzer,
            attenuation,
            state: PlaybackState::Idle,
            frame_counter: 0,
            last_pose: SpatialPose::default(),
            decode_tx,
            decode_rx,
            event_tx,
            event_rx,
        })
    }

    /// Shared graph handle, for wiring into an
    /// [`AudioEngine`](crate::engine::AudioEngine) or rendering headless.
    pub fn graph(&self) -> Arc<Mutex<AudioGraph>> {
        Arc::clone(&self.graph)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing(_))
    }

    /// Start playback of an audio asset.
    ///
    /// Any prior session is stopped first. Decoding happens off-thread; the
    /// session starts from a later [`update`](Self::update) call once the
    /// decode lands. Fetch/decode failures surface as
    /// [`PlaybackEvent::PlaybackFailed`] and leave the controller idle. A
    /// decode superseded by another `play()` or a `stop()` is discarded
    /// when it resolves; its audio never reaches the output.
    pub fn play(&mut self, path: &str) -> Result<PlaybackHandle> {
        self.stop_session();

        let handle = PlaybackHandle::new();
        let tx = self.decode_tx.clone();
        let path = path.to_string();
        let options = LoadOptions::voice(self.config.sample_rate);

        let decode_path = path.clone();
        thread::Builder::new()
            .name("lipsonic-decode".to_string())
            .spawn(move || {
                let outcome = AudioData::from_path_with_options(&decode_path, &options);
                // The controller may be gone; a dead channel is fine.
                let _ = tx.send(DecodeResult { handle, outcome });
            })
            .map_err(|e| LipSonicError::Engine(format!("Failed to spawn decode thread: {}", e)))?;

        self.state = PlaybackState::Decoding(handle);
        log::info!("Session {} decoding '{}'", handle, path);
        Ok(handle)
    }

    /// Start playback of pre-decoded audio, skipping the worker round-trip.
    pub fn play_data(&mut self, audio: Arc<AudioData>) -> Result<PlaybackHandle> {
        self.stop_session();
        let handle = PlaybackHandle::new();
        let audio = self.prepare(audio)?;
        self.start_session(handle, audio);
        Ok(handle)
    }

    /// Stop the active session and return to idle. Idempotent; stopping
    /// with no active session is a no-op, and no completion event is
    /// emitted for an explicit stop.
    pub fn stop(&mut self) {
        self.stop_session();
    }

    /// Current lip-sync weight in `[0, 1]`; `0.0` whenever no session is
    /// playing.
    pub fn volume(&self) -> f32 {
        match self.state {
            PlaybackState::Playing(_) => self.analyzer.volume(),
            _ => 0.0,
        }
    }

    /// Per-frame driver entry point.
    ///
    /// Drains pending decode results (discarding stale ones), reports
    /// natural session completion, pushes the pose into the graph, and —
    /// every [`FrameTiming::update_interval`](crate::config::FrameTiming)
    /// frames — recomputes distance gain through the attenuation curve and
    /// schedules the smoothing ramp.
    pub fn update(&mut self, pose: SpatialPose) {
        self.last_pose = pose;
        self.drain_decodes();

        let mut graph = self.graph.lock().unwrap();

        if let Some(handle) = graph.take_completed() {
            if self.state == PlaybackState::Playing(handle) {
                self.state = PlaybackState::Idle;
                self.analyzer.clear();
                let _ = self
                    .event_tx
                    .send(PlaybackEvent::SourceCompleted { handle });
            }
        }

        graph.update_pose(&pose);

        if matches!(self.state, PlaybackState::Playing(_)) {
            if graph.routing() == Routing::Spatial
                && self.frame_counter % self.config.timing.update_interval as u64 == 0
            {
                let gain =
                    self.attenuation.gain_for_distance(pose.distance()) * graph.master_volume();
                graph.apply_gain(gain, self.config.timing.gain_ramp);
            }
            self.frame_counter += 1;
        }
    }

    /// Drain events produced since the last poll.
    pub fn poll_events(&self) -> Vec<PlaybackEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Toggle between stereo and spatial routing; valid before or during
    /// playback.
    pub fn set_spatial_enabled(&mut self, enabled: bool) {
        self.graph.lock().unwrap().set_routing(enabled);
    }

    /// Master volume in `[0, 1]`; valid before or during playback.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.graph.lock().unwrap().set_master_volume(volume);
    }

    pub fn set_attenuation(&mut self, curve: AttenuationCurve) {
        self.attenuation = curve;
    }

    pub fn set_panner_config(&mut self, config: PannerConfig) {
        self.graph.lock().unwrap().set_panner_config(config);
    }

    fn drain_decodes(&mut self) {
        while let Ok(result) = self.decode_rx.try_recv() {
            if self.state != PlaybackState::Decoding(result.handle) {
                log::debug!("Discarding stale decode for {}", result.handle);
                continue;
            }
            match result.outcome.and_then(|audio| self.prepare(audio)) {
                Ok(audio) => self.start_session(result.handle, audio),
                Err(error) => {
                    log::warn!("Playback failed for {}: {}", result.handle, error);
                    self.state = PlaybackState::Idle;
                    let _ = self.event_tx.send(PlaybackEvent::PlaybackFailed {
                        handle: result.handle,
                        error: error.to_string(),
                    });
                }
            }
        }
    }

    /// Ensure mono at the engine rate. Cheap no-op for audio the loader
    /// already prepared.
    fn prepare(&self, audio: Arc<AudioData>) -> Result<Arc<AudioData>> {
        let audio = if audio.channels() > 1 {
            Arc::new(audio.to_mono()?)
        } else {
            audio
        };
        let audio = if audio.sample_rate() != self.config.sample_rate {
            Arc::new(audio.resample(self.config.sample_rate)?)
        } else {
            audio
        };
        Ok(audio)
    }

    fn start_session(&mut self, handle: PlaybackHandle, audio: Arc<AudioData>) {
        let mut graph = self.graph.lock().unwrap();
        let initial_gain = match graph.routing() {
            Routing::Stereo => graph.master_volume(),
            Routing::Spatial => {
                self.attenuation.gain_for_distance(self.last_pose.distance())
                    * graph.master_volume()
            }
        };
        graph.load_session(
            PlaybackSession::new(handle, audio),
            initial_gain,
            &self.last_pose,
        );
        drop(graph);

        self.state = PlaybackState::Playing(handle);
        self.frame_counter = 0;
        let _ = self.event_tx.send(PlaybackEvent::SourceStarted { handle });
        log::info!("Session {} playing", handle);
    }

    /// Tear down the active session. Bumping the state away from the old
    /// handle is what invalidates any in-flight decode.
    fn stop_session(&mut self) {
        match self.state {
            PlaybackState::Idle => {}
            PlaybackState::Decoding(handle) => {
                log::debug!("Session {} cancelled while decoding", handle);
                self.state = PlaybackState::Idle;
            }
            PlaybackState::Playing(handle) => {
                let mut graph = self.graph.lock().unwrap();
                // The session may have ended naturally since the last
                // update(); its earned notification still gets delivered.
                if graph.take_completed() == Some(handle) {
                    let _ = self
                        .event_tx
                        .send(PlaybackEvent::SourceCompleted { handle });
                }
                graph.clear_session();
                drop(graph);
                self.analyzer.clear();
                self.state = PlaybackState::Idle;
                log::info!("Session {} stopped", handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Pose, Vec3};

    fn controller() -> PlaybackController {
        PlaybackController::new(LipSonicConfig::default()).unwrap()
    }

    fn sine(frames: usize, amplitude: f32) -> Arc<AudioData> {
        let samples = (0..frames)
            .map(|i| (i as f32 * 0.05).sin() * amplitude)
            .collect();
        Arc::new(AudioData::from_samples(samples, 48000, 1))
    }

    fn render_block(controller: &PlaybackController, frames: usize) {
        let mut out = vec![0.0f32; frames * 2];
        controller.graph().lock().unwrap().render(&mut out);
    }

    #[test]
    fn volume_is_zero_when_idle() {
        let controller = controller();
        assert_eq!(controller.volume(), 0.0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut controller = controller();
        controller.stop();
        controller.stop();
        assert_eq!(controller.state(), PlaybackState::Idle);

        controller.play_data(sine(4096, 0.5)).unwrap();
        controller.stop();
        controller.stop();
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn play_data_starts_a_session() {
        let mut controller = controller();
        let handle = controller.play_data(sine(4096, 0.5)).unwrap();
        assert_eq!(controller.state(), PlaybackState::Playing(handle));

        let events = controller.poll_events();
        assert_eq!(events, vec![PlaybackEvent::SourceStarted { handle }]);
    }

    #[test]
    fn volume_reflects_rendered_audio() {
        let mut controller = controller();
        controller.play_data(sine(48000, 0.8)).unwrap();

        // Fill the analysis window from the render path.
        for _ in 0..8 {
            render_block(&controller, 512);
        }
        assert!(controller.volume() > 0.5);

        controller.stop();
        assert_eq!(controller.volume(), 0.0);
    }

    #[test]
    fn new_play_replaces_active_session() {
        let mut controller = controller();
        let first = controller.play_data(sine(48000, 0.5)).unwrap();
        let second = controller.play_data(sine(48000, 0.5)).unwrap();
        assert_ne!(first, second);
        assert_eq!(controller.state(), PlaybackState::Playing(second));
        assert_eq!(
            controller.graph().lock().unwrap().session_handle(),
            Some(second)
        );
    }

    #[test]
    fn natural_end_emits_completed_exactly_once() {
        let mut controller = controller();
        let handle = controller.play_data(sine(100, 0.5)).unwrap();
        controller.poll_events();

        render_block(&controller, 512);
        controller.update(SpatialPose::default());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(
            controller.poll_events(),
            vec![PlaybackEvent::SourceCompleted { handle }]
        );

        // Further updates must not re-emit.
        controller.update(SpatialPose::default());
        controller.update(SpatialPose::default());
        assert!(controller.poll_events().is_empty());
    }

    #[test]
    fn completion_survives_stop_after_natural_end() {
        let mut controller = controller();
        let handle = controller.play_data(sine(100, 0.5)).unwrap();
        controller.poll_events();

        // The session ends naturally inside the render path; stop() lands
        // before the next update() gets to report it.
        render_block(&controller, 512);
        controller.stop();
        assert_eq!(
            controller.poll_events(),
            vec![PlaybackEvent::SourceCompleted { handle }]
        );

        controller.update(SpatialPose::default());
        assert!(controller.poll_events().is_empty());
    }

    #[test]
    fn explicit_stop_emits_no_completion() {
        let mut controller = controller();
        controller.play_data(sine(48000, 0.5)).unwrap();
        controller.poll_events();

        controller.stop();
        for _ in 0..5 {
            controller.update(SpatialPose::default());
        }
        assert!(controller.poll_events().is_empty());
    }

    #[test]
    fn distance_update_is_throttled() {
        let mut controller = controller();
        controller.set_master_volume(1.0);
        controller.play_data(sine(480000, 0.5)).unwrap();

        // Move the emitter far away; the first update (frame 0) recomputes
        // the distance gain.
        let far = SpatialPose::new(Pose::identity(), Vec3::new(0.0, 0.0, -20.0));
        controller.update(far);
        let target_after_first = controller.graph().lock().unwrap().target_gain();
        let expected = AttenuationCurve::default().gain_for_distance(20.0);
        assert!((target_after_first - expected).abs() < 1e-5);

        // Frames 1 and 2 fall inside the throttle window: moving the
        // emitter back must not retarget the gain yet.
        let near = SpatialPose::new(Pose::identity(), Vec3::ZERO);
        controller.update(near);
        controller.update(near);
        assert_eq!(
            controller.graph().lock().unwrap().target_gain(),
            target_after_first
        );

        // Frame 3 recomputes.
        controller.update(near);
        let retargeted = controller.graph().lock().unwrap().target_gain();
        assert!((retargeted - 1.0).abs() < 1e-5);
    }

    #[test]
    fn stereo_routing_skips_distance_gain() {
        let mut controller = controller();
        controller.set_spatial_enabled(false);
        controller.set_master_volume(0.5);
        controller.play_data(sine(48000, 0.5)).unwrap();

        let far = SpatialPose::new(Pose::identity(), Vec3::new(0.0, 0.0, -20.0));
        for _ in 0..6 {
            controller.update(far);
        }
        // Gain stays anchored to master volume regardless of distance.
        assert_eq!(controller.graph().lock().unwrap().target_gain(), 0.5);
    }

    #[test]
    fn settings_apply_before_playback() {
        let mut controller = controller();
        controller.set_spatial_enabled(false);
        controller.set_master_volume(0.25);
        let graph = controller.graph();
        assert_eq!(graph.lock().unwrap().routing(), Routing::Stereo);
        assert_eq!(graph.lock().unwrap().master_volume(), 0.25);
    }
}
