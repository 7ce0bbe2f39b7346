//! Controller-level playback scenarios driven headless: the graph is
//! rendered directly with plain buffers, no audio device involved.

use lipsonic::{
    AudioData, LipSonicConfig, PlaybackController, PlaybackEvent, PlaybackState, Pose,
    SpatialPose, Vec3,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Write a minimal 16-bit PCM mono WAV file.
fn write_wav(path: &PathBuf, samples: &[f32], sample_rate: u32) {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        data.extend_from_slice(&v.to_le_bytes());
    }
    let byte_rate = sample_rate * 2;
    let mut wav = Vec::with_capacity(44 + data.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data.len() as u32).to_le_bytes());
    wav.extend_from_slice(&data);
    std::fs::write(path, wav).unwrap();
}

fn temp_wav(name: &str, samples: &[f32], sample_rate: u32) -> String {
    let path = std::env::temp_dir().join(format!("lipsonic-test-{}-{}", std::process::id(), name));
    write_wav(&path, samples, sample_rate);
    path.to_string_lossy().into_owned()
}

fn controller() -> PlaybackController {
    let _ = env_logger::builder().is_test(true).try_init();
    PlaybackController::new(LipSonicConfig::default()).unwrap()
}

/// Pump update() until `cond` holds or a timeout expires.
fn pump_until(
    controller: &mut PlaybackController,
    events: &mut Vec<PlaybackEvent>,
    cond: impl Fn(&PlaybackState) -> bool,
) -> bool {
    for _ in 0..500 {
        controller.update(SpatialPose::default());
        events.extend(controller.poll_events());
        if cond(&controller.state()) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn render_block(controller: &PlaybackController, frames: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; frames * 2];
    controller.graph().lock().unwrap().render(&mut out);
    out
}

#[test]
fn play_decodes_and_completes_naturally() {
    let path = temp_wav("complete.wav", &vec![0.5; 4800], 48000);
    let mut controller = controller();
    let mut events = Vec::new();

    let handle = controller.play(&path).unwrap();
    assert_eq!(controller.state(), PlaybackState::Decoding(handle));
    assert!(pump_until(&mut controller, &mut events, |s| {
        *s == PlaybackState::Playing(handle)
    }));
    assert_eq!(events, vec![PlaybackEvent::SourceStarted { handle }]);

    // Render the 4800-frame session to its natural end.
    for _ in 0..12 {
        render_block(&controller, 512);
    }
    controller.update(SpatialPose::default());
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(
        controller.poll_events(),
        vec![PlaybackEvent::SourceCompleted { handle }]
    );

    // Exactly once: further frames are quiet.
    controller.update(SpatialPose::default());
    assert!(controller.poll_events().is_empty());
    assert_eq!(controller.volume(), 0.0);
}

#[test]
fn undecodable_asset_fails_and_stays_idle() {
    let path = std::env::temp_dir().join(format!("lipsonic-test-{}-garbage.bin", std::process::id()));
    std::fs::write(&path, b"this is not audio data at all, not even close").unwrap();
    let path = path.to_string_lossy().into_owned();

    let mut controller = controller();
    let mut events = Vec::new();
    let handle = controller.play(&path).unwrap();

    assert!(pump_until(&mut controller, &mut events, |s| {
        *s == PlaybackState::Idle
    }));
    assert_eq!(events.len(), 1);
    match &events[0] {
        PlaybackEvent::PlaybackFailed { handle: h, .. } => assert_eq!(*h, handle),
        other => panic!("expected PlaybackFailed, got {:?}", other),
    }
}

#[test]
fn missing_asset_fails_and_stays_idle() {
    let mut controller = controller();
    let mut events = Vec::new();
    controller.play("/nonexistent/definitely-missing.wav").unwrap();

    assert!(pump_until(&mut controller, &mut events, |s| {
        *s == PlaybackState::Idle
    }));
    assert!(matches!(
        events.as_slice(),
        [PlaybackEvent::PlaybackFailed { .. }]
    ));
}

#[test]
fn superseding_play_discards_inflight_decode() {
    // Two assets with distinguishable constant amplitudes.
    let path_a = temp_wav("stale-a.wav", &vec![0.25; 48000], 48000);
    let path_b = temp_wav("stale-b.wav", &vec![0.75; 48000], 48000);

    let mut controller = controller();
    controller.set_spatial_enabled(false);
    controller.set_master_volume(1.0);
    let mut events = Vec::new();

    let handle_a = controller.play(&path_a).unwrap();
    // Supersede immediately, while a's decode is still in flight.
    let handle_b = controller.play(&path_b).unwrap();

    assert!(pump_until(&mut controller, &mut events, |s| {
        matches!(s, PlaybackState::Playing(_))
    }));
    assert_eq!(controller.state(), PlaybackState::Playing(handle_b));

    // Only the second session may ever reach the output, even after both
    // decodes have resolved.
    thread::sleep(Duration::from_millis(200));
    controller.update(SpatialPose::default());
    assert_eq!(controller.state(), PlaybackState::Playing(handle_b));

    let out = render_block(&controller, 512);
    for &sample in &out {
        assert!(
            (sample - 0.75).abs() < 0.01,
            "superseded audio leaked into the output: {}",
            sample
        );
    }

    events.extend(controller.poll_events());
    assert!(events.iter().all(|e| e.handle() != handle_a));
}

#[test]
fn stop_while_decoding_discards_result() {
    let path = temp_wav("stop-decode.wav", &vec![0.5; 48000], 48000);
    let mut controller = controller();
    let mut events = Vec::new();

    controller.play(&path).unwrap();
    controller.stop();
    assert_eq!(controller.state(), PlaybackState::Idle);

    // Give the decode time to resolve, then confirm it was dropped.
    thread::sleep(Duration::from_millis(300));
    for _ in 0..5 {
        controller.update(SpatialPose::default());
    }
    events.extend(controller.poll_events());
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(events.is_empty());
    let out = render_block(&controller, 512);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn non_native_sample_rate_is_resampled() {
    let samples: Vec<f32> = (0..44100)
        .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin() * 0.8)
        .collect();
    let path = temp_wav("rate-44100.wav", &samples, 44100);

    let mut controller = controller();
    let mut events = Vec::new();
    let handle = controller.play(&path).unwrap();
    assert!(pump_until(&mut controller, &mut events, |s| {
        *s == PlaybackState::Playing(handle)
    }));

    for _ in 0..8 {
        render_block(&controller, 512);
    }
    assert!(controller.volume() > 0.5);
}

#[test]
fn spatial_motion_shifts_stereo_balance() {
    let mut controller = controller();
    controller.set_master_volume(1.0);
    let audio = Arc::new(AudioData::from_samples(vec![0.5; 480000], 48000, 1));
    controller.play_data(audio).unwrap();

    // Character on the camera's right.
    let right_pose = SpatialPose::new(Pose::identity(), Vec3::new(2.0, 0.0, 0.0));
    for _ in 0..30 {
        controller.update(right_pose);
        render_block(&controller, 512);
    }
    let out = render_block(&controller, 512);
    let left: f32 = out.chunks(2).map(|f| f[0].abs()).sum();
    let right: f32 = out.chunks(2).map(|f| f[1].abs()).sum();
    assert!(right > left * 2.0, "left={} right={}", left, right);

    // Walk the character over to the camera's left; the smoothed pan
    // follows within a few frames' worth of audio.
    let left_pose = SpatialPose::new(Pose::identity(), Vec3::new(-2.0, 0.0, 0.0));
    for _ in 0..30 {
        controller.update(left_pose);
        render_block(&controller, 512);
    }
    let out = render_block(&controller, 512);
    let left: f32 = out.chunks(2).map(|f| f[0].abs()).sum();
    let right: f32 = out.chunks(2).map(|f| f[1].abs()).sum();
    assert!(left > right * 2.0, "left={} right={}", left, right);
}

#[test]
fn distance_attenuates_gain_over_time() {
    let mut controller = controller();
    controller.set_master_volume(1.0);
    let audio = Arc::new(AudioData::from_samples(vec![0.5; 480000], 48000, 1));
    controller.play_data(audio).unwrap();

    // Start close: gain anchors near max volume.
    let near = SpatialPose::new(Pose::identity(), Vec3::ZERO);
    controller.update(near);
    let near_gain = controller.graph().lock().unwrap().target_gain();

    // Move far away and let the throttled update + ramp settle. Each
    // recompute re-aims the 100 ms ramp, so convergence takes a few
    // throttle cycles.
    let far = SpatialPose::new(Pose::identity(), Vec3::new(0.0, 0.0, -10.0));
    for _ in 0..40 {
        controller.update(far);
        render_block(&controller, 512);
    }
    let far_gain = controller.graph().lock().unwrap().current_gain();
    assert!(
        far_gain < near_gain * 0.2,
        "near={} far={}",
        near_gain,
        far_gain
    );
}
