use crate::audio_data::{AudioData, LoadOptions};
use crate::error::{LipSonicError, Result};
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Decode an audio file into an [`AudioData`] buffer.
///
/// Opening failures map to [`LipSonicError::AssetIo`]; anything symphonia
/// cannot probe or decode maps to [`LipSonicError::Decode`].
pub(crate) fn load_audio_file(path: &str, options: &LoadOptions) -> Result<AudioData> {
    let file = File::open(path)
        .map_err(|e| LipSonicError::AssetIo(format!("Failed to open {}: {}", path, e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probe = get_probe();
    let probed = probe
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| LipSonicError::Decode(format!("Failed to probe audio format: {:?}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| LipSonicError::Decode("No default audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| LipSonicError::Decode("Sample rate not found".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| LipSonicError::Decode("Channel count not found".to_string()))?
        .count() as u16;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| LipSonicError::Decode(format!("Failed to create decoder: {:?}", e)))?;

    let mut samples: Vec<f32> = Vec::new();
    let max_frames = options
        .max_duration
        .map(|d| (d.as_secs_f64() * sample_rate as f64) as usize)
        .unwrap_or(usize::MAX);

    let mut frames_decoded = 0;

    loop {
        if frames_decoded >= max_frames {
            break;
        }

        // Read the next packet from the container
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break, // end-of-file
            Err(e) => {
                return Err(LipSonicError::Decode(format!(
                    "Error reading packet: {:?}",
                    e
                )));
            }
        };

        // Decode the packet into audio samples
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::IoError(_)) => break, // also EOF in some formats
            Err(Error::DecodeError(_)) => continue, // recoverable corruption
            Err(e) => {
                return Err(LipSonicError::Decode(format!(
                    "Error decoding packet: {:?}",
                    e
                )));
            }
        };

        // Always convert to interleaved f32
        let spec = *decoded.spec();
        let capacity = decoded.capacity();
        let mut tmp = SampleBuffer::<f32>::new(capacity as u64, spec);
        tmp.copy_interleaved_ref(decoded);

        if let Some(mono_ch) = options.mono_channel {
            if mono_ch >= channels as usize {
                return Err(LipSonicError::AudioFormat(format!(
                    "Channel {} out of range (max: {})",
                    mono_ch,
                    channels - 1
                )));
            }
            samples.extend(
                tmp.samples()
                    .chunks(channels as usize)
                    .map(|frame| frame[mono_ch]),
            );
        } else {
            samples.extend_from_slice(tmp.samples());
        }

        frames_decoded += capacity / channels as usize;
    }

    let (final_samples, final_channels) = if (options.convert_to_mono
        || options.mono_channel.is_some())
        && channels > 1
    {
        if options.mono_channel.is_some() {
            // Already extracted a single channel during decoding
            (samples, 1)
        } else {
            let mono: Vec<f32> = samples
                .chunks(channels as usize)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect();
            (mono, 1)
        }
    } else {
        (samples, channels)
    };

    let mut audio_data = AudioData::from_samples(final_samples, sample_rate, final_channels);

    if let Some(target_rate) = options.target_sample_rate {
        if target_rate != sample_rate {
            audio_data = audio_data.resample(target_rate)?;
        }
    }

    log::debug!(
        "Loaded {}: {} frames, {} Hz, {} channel(s)",
        path,
        audio_data.total_frames(),
        audio_data.sample_rate(),
        audio_data.channels()
    );

    Ok(audio_data)
}
