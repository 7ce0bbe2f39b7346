//! Orbiting-voice demo: a synthetic voice line circles the listener while
//! the console shows the lip-sync weight the animation layer would consume.
//!
//! Runs against the default output device when one is available, otherwise
//! drives the graph headless.

use anyhow::Result;
use lipsonic::{
    AudioData, AudioEngine, LipSonicConfig, PlaybackController, PlaybackEvent, Pose, SpatialPose,
    Vec3,
};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn synthesize_voice(sample_rate: u32, seconds: f32) -> Arc<AudioData> {
    let frames = (sample_rate as f32 * seconds) as usize;
    let samples = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            // 180 Hz carrier under a syllable-ish 4 Hz envelope
            let envelope = (2.0 * std::f32::consts::PI * 4.0 * t).sin().max(0.0);
            (2.0 * std::f32::consts::PI * 180.0 * t).sin() * envelope * 0.8
        })
        .collect();
    Arc::new(AudioData::from_samples(samples, sample_rate, 1))
}

fn main() -> Result<()> {
    env_logger::init();

    let config = LipSonicConfig::default();
    let mut controller = PlaybackController::new(config.clone())?;
    controller.set_master_volume(0.8);

    let mut engine = AudioEngine::new(config.clone(), controller.graph())?;
    let live = match engine.start() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("No audio device ({}), running headless", e);
            false
        }
    };

    controller.play_data(synthesize_voice(config.sample_rate, 6.0))?;

    let listener = Pose::from_position(Vec3::new(0.0, 1.5, 0.0));
    let frame = Duration::from_millis(16);
    let mut t = 0.0f32;

    'outer: loop {
        let angle = t * 0.6;
        let emitter = Vec3::new(angle.cos() * 3.0, 1.5, angle.sin() * 3.0);
        let pose = SpatialPose::new(listener, emitter);
        controller.update(pose);

        if !live {
            let mut block = vec![0.0f32; 512 * config.channels as usize];
            controller.graph().lock().unwrap().render(&mut block);
        }

        let volume = controller.volume();
        let bar = "#".repeat((volume * 30.0) as usize);
        print!(
            "\rmouth {:4.2} |{:<30}| dist {:4.2}",
            volume,
            bar,
            pose.distance()
        );
        std::io::stdout().flush()?;

        for event in controller.poll_events() {
            if matches!(event, PlaybackEvent::SourceCompleted { .. }) {
                break 'outer;
            }
        }

        thread::sleep(frame);
        t += 0.016;
    }

    println!("\nvoice line finished");
    engine.stop()?;
    Ok(())
}
