//! Audio Test File Generation Utilities
//!
//! Generates small WAV files with known content so the decode → resample →
//! cursor path can be checked frame by frame.

use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;

/// Generate a 16-bit PCM sine wave WAV file.
///
/// # Arguments
/// * `path` - Output file path
/// * `sample_rate` - File sample rate in Hz
/// * `frames` - Number of frames to write
/// * `frequency_hz` - Sine frequency
/// * `amplitude` - Peak amplitude 0.0-1.0
/// * `channels` - 1 (mono) or 2 (same signal in both channels)
pub fn generate_sine_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    frames: usize,
    frequency_hz: f32,
    amplitude: f32,
    channels: u16,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    let amplitude_i16 = amplitude * i16::MAX as f32;

    for frame_idx in 0..frames {
        let t = frame_idx as f32 / sample_rate as f32;
        let sample = ((2.0 * PI * frequency_hz * t).sin() * amplitude_i16) as i16;
        for _ in 0..channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Generate a stereo 32-bit float WAV whose frame `i` is
/// `(i * step, -i * step)`.
///
/// Values survive decoding bit-exact, so tests can identify which source
/// frame landed in which output slot.
pub fn generate_ramp_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    frames: usize,
    step: f32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for frame_idx in 0..frames {
        let value = frame_idx as f32 * step;
        writer.write_sample(value)?;
        writer.write_sample(-value)?;
    }

    writer.finalize()?;
    Ok(())
}
