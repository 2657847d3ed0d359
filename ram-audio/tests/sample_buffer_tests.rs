//! SampleBuffer load tests
//!
//! Decode real WAV files written by the test helpers, then check the
//! load-once rules and the resample-on-load path.

mod helpers;

use helpers::{generate_ramp_wav, generate_sine_wav};
use ram_audio::{Error, SampleBuffer, StereoFrame};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// Path to a committed audio fixture
fn audio_fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/audio");
    path.push(name);
    path
}

#[test]
fn test_load_same_rate_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "ramp.wav");
    generate_ramp_wav(&path, 100, 100, 0.001).unwrap();

    let mut buffer = SampleBuffer::new(100).unwrap();
    buffer.load(&path).unwrap();

    assert!(buffer.is_valid());
    assert_eq!(buffer.frame_count(), 100);
    assert!((buffer.get_length() - 1.0).abs() < 1e-6);

    for (i, frame) in buffer.frames().iter().enumerate() {
        let value = i as f32 * 0.001;
        assert_eq!(*frame, StereoFrame::new(value, -value), "frame {}", i);
    }
}

#[test]
fn test_load_resamples_to_target_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "sine_48k.wav");
    generate_sine_wav(&path, 48_000, 48_000, 440.0, 0.5, 2).unwrap();

    let mut buffer = SampleBuffer::new(44_100).unwrap();
    buffer.load(&path).unwrap();

    assert_eq!(buffer.target_rate(), 44_100);
    assert_eq!(buffer.frame_count(), 44_100);
    assert_eq!(buffer.capacity(), 44_100);
    assert!((buffer.get_length() - 1.0).abs() < 1e-4);

    // Cubic interpolation of a half-scale sine stays near half scale
    let peak = buffer
        .frames()
        .iter()
        .map(|f| f.left.abs())
        .fold(0.0f32, f32::max);
    assert!(peak > 0.45 && peak < 0.55, "peak {}", peak);
}

#[test]
fn test_load_upsamples_within_one_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "sine_22k.wav");
    generate_sine_wav(&path, 22_050, 10_000, 220.0, 0.5, 2).unwrap();

    let mut buffer = SampleBuffer::new(44_100).unwrap();
    buffer.load(&path).unwrap();

    let expected = 20_000i64;
    assert!((buffer.frame_count() as i64 - expected).abs() <= 1);
}

#[test]
fn test_load_mono_duplicates_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "mono.wav");
    generate_sine_wav(&path, 8_000, 800, 100.0, 0.5, 1).unwrap();

    let mut buffer = SampleBuffer::new(8_000).unwrap();
    buffer.load(&path).unwrap();

    assert_eq!(buffer.frame_count(), 800);
    assert!(buffer.frames().iter().all(|f| f.left == f.right));
    assert!(buffer.frames().iter().any(|f| !f.is_silent()));
}

#[test]
fn test_load_uppercase_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "LOUD.WAV");
    generate_ramp_wav(&path, 100, 10, 0.01).unwrap();

    let mut buffer = SampleBuffer::new(100).unwrap();
    buffer.load(&path).unwrap();
    assert_eq!(buffer.frame_count(), 10);
}

// 8 kHz mono Vorbis: 64 short-block packets, the first of which only
// primes the overlap, so 63 * 128 frames decode.
#[test]
fn test_load_ogg_vorbis() {
    let path = audio_fixture("tone_mono_8k.ogg");
    assert!(path.exists(), "Vorbis fixture not found at: {}", path.display());

    let mut buffer = SampleBuffer::new(8_000).unwrap();
    buffer.load(&path).unwrap();

    assert!(buffer.is_valid());
    assert_eq!(buffer.frame_count(), 8_064);
    assert!((buffer.get_length() - 1.008).abs() < 1e-3);

    let frames = buffer.frames();
    assert!(frames.iter().all(|f| f.left == f.right));
    assert!(frames.iter().all(|f| f.left.abs() <= 1.0));
    assert!(frames.iter().any(|f| !f.is_silent()));
}

#[test]
fn test_load_ogg_vorbis_resamples_to_target_rate() {
    let mut buffer = SampleBuffer::new(16_000).unwrap();
    buffer.load(audio_fixture("tone_mono_8k.ogg")).unwrap();

    assert_eq!(buffer.frame_count(), 16_128);
    assert!((buffer.get_length() - 1.008).abs() < 1e-3);
    assert!(buffer.frames().iter().any(|f| !f.is_silent()));
}

#[test]
fn test_load_unknown_extension_is_invalid_format() {
    let mut buffer = SampleBuffer::new(44_100).unwrap();
    let result = buffer.load("track.mp3");

    assert!(matches!(result, Err(Error::InvalidFormat(_))));
    assert!(!buffer.is_valid());
    assert_eq!(buffer.get_length(), 0.0);
}

#[test]
fn test_load_corrupt_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "garbage.ogg");
    std::fs::write(&path, b"this is not an ogg stream").unwrap();

    let mut buffer = SampleBuffer::new(44_100).unwrap();
    let result = buffer.load(&path);

    assert!(matches!(result, Err(Error::Decode(_))));
    assert!(!buffer.is_valid());
}

#[test]
fn test_load_truncated_wav_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "truncated.wav");
    generate_sine_wav(&path, 8_000, 1_000, 440.0, 0.5, 2).unwrap();

    // Drop the last 500 frames (4 bytes each) but keep the header's length
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    let len = file.metadata().unwrap().len();
    file.set_len(len - 500 * 4).unwrap();
    drop(file);

    let mut buffer = SampleBuffer::new(8_000).unwrap();
    let result = buffer.load(&path);

    assert!(matches!(result, Err(Error::Decode(_))), "{:?}", result);
    assert!(!buffer.is_valid());
    assert_eq!(buffer.frame_count(), 0);
}

#[test]
fn test_reload_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let first = fixture(&dir, "first.wav");
    let second = fixture(&dir, "second.wav");
    generate_ramp_wav(&first, 100, 50, 0.01).unwrap();
    generate_ramp_wav(&second, 100, 80, 0.01).unwrap();

    let mut buffer = SampleBuffer::new(100).unwrap();
    buffer.load(&first).unwrap();

    assert!(matches!(buffer.load(&second), Err(Error::ReloadForbidden)));
    assert_eq!(buffer.frame_count(), 50);
}

#[test]
fn test_failed_load_allows_retry() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "retry.wav");
    generate_ramp_wav(&path, 100, 20, 0.01).unwrap();

    let mut buffer = SampleBuffer::new(100).unwrap();
    assert!(buffer.load(dir.path().join("missing.wav")).is_err());

    buffer.load(&path).unwrap();
    assert_eq!(buffer.frame_count(), 20);
}
