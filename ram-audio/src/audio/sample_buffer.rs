//! Fixed-rate, load-once sample store
//!
//! A [`SampleBuffer`] holds an entire sound as stereo frames at the host mix
//! rate. It is populated exactly once (decode, then resample if the native
//! rate differs) and is read-only afterwards, so any number of cursors may
//! share it behind an `Arc` without synchronization.

use crate::audio::decoder::{self, DecodedAudio};
use crate::audio::resampler;
use crate::audio::types::StereoFrame;
use crate::error::{Error, Result};
use crate::playback::PlaybackCursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stream name reported to hosts that list sources by name
pub const STREAM_NAME: &str = "RAMAudio";

/// In-memory stereo sample store at a fixed target rate.
#[derive(Debug)]
pub struct SampleBuffer {
    /// Resident frames at `target_rate`
    frames: Vec<StereoFrame>,

    /// Allocated length in frames; zero after a destructive resample failure
    capacity: usize,

    /// Host mix rate fixed at construction
    target_rate: u32,

    /// `frames.len() / target_rate`
    duration_seconds: f32,
}

impl SampleBuffer {
    /// Create an empty buffer for a host mixing at `target_rate` Hz.
    ///
    /// # Errors
    /// [`Error::InvalidRate`] if `target_rate` is zero.
    pub fn new(target_rate: u32) -> Result<Self> {
        if target_rate == 0 {
            return Err(Error::InvalidRate(target_rate));
        }

        Ok(Self {
            frames: Vec::new(),
            capacity: 0,
            target_rate,
            duration_seconds: 0.0,
        })
    }

    /// Decode `path` and populate the buffer, resampling to the target rate.
    ///
    /// # Errors
    /// - [`Error::ReloadForbidden`] if the buffer already holds frames
    /// - [`Error::InvalidFormat`] / [`Error::Decode`] from the decoder
    /// - any error of [`SampleBuffer::resample`]
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        if self.is_valid() {
            warn!("Reloading audio is forbidden: {}", path.display());
            return Err(Error::ReloadForbidden);
        }

        let DecodedAudio {
            frames,
            source_rate,
        } = decoder::decode_file(path)?;

        self.load_frames(frames, source_rate)?;

        info!(
            "Loaded {} ({} frames, {:.3}s at {}Hz)",
            path.display(),
            self.frame_count(),
            self.duration_seconds,
            self.target_rate
        );

        Ok(())
    }

    /// Populate the buffer from already-decoded frames at `source_rate`.
    ///
    /// Resamples only when `source_rate` differs from the target rate.
    ///
    /// # Errors
    /// - [`Error::ReloadForbidden`] if the buffer already holds frames
    /// - [`Error::InvalidRate`] if `source_rate` is zero (buffer untouched)
    /// - any error of [`SampleBuffer::resample`]
    pub fn load_frames(&mut self, frames: Vec<StereoFrame>, source_rate: u32) -> Result<()> {
        if self.is_valid() {
            return Err(Error::ReloadForbidden);
        }
        if source_rate == 0 {
            return Err(Error::InvalidRate(source_rate));
        }

        self.capacity = frames.capacity();
        self.frames = frames;
        self.update_length();

        if source_rate != self.target_rate && !self.frames.is_empty() {
            self.resample(source_rate)?;
        }

        Ok(())
    }

    /// Convert the held frames from `source_rate` to the target rate, in place.
    ///
    /// Returns the new frame count.
    ///
    /// Not rollback-safe: if the destination cannot be allocated the source
    /// frames are released and the buffer is left empty.
    ///
    /// # Errors
    /// - [`Error::InvalidRate`] if `source_rate` is zero (buffer untouched)
    /// - [`Error::NotLoaded`] if the buffer holds no frames
    /// - [`Error::OutOfMemory`] if allocation fails (buffer emptied)
    pub fn resample(&mut self, source_rate: u32) -> Result<usize> {
        if source_rate == 0 {
            return Err(Error::InvalidRate(source_rate));
        }
        if self.frames.is_empty() {
            return Err(Error::NotLoaded);
        }

        let source = std::mem::take(&mut self.frames);

        match resampler::resample_cubic(source, source_rate, self.target_rate) {
            Ok(resampled) => {
                self.frames = resampled;
                self.capacity = self.frames.len();
                self.update_length();
                debug!(
                    "Resampled buffer from {}Hz to {}Hz: {} frames",
                    source_rate,
                    self.target_rate,
                    self.frames.len()
                );
                Ok(self.frames.len())
            }
            Err(e) => {
                self.capacity = 0;
                self.update_length();
                warn!("Resample failed, source frames released: {}", e);
                Err(e)
            }
        }
    }

    fn update_length(&mut self) {
        self.duration_seconds = self.frames.len() as f32 / self.target_rate as f32;
    }

    /// True once the buffer holds frames.
    pub fn is_valid(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Duration in seconds at the target rate.
    pub fn get_length(&self) -> f32 {
        self.duration_seconds
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    pub fn frames(&self) -> &[StereoFrame] {
        &self.frames
    }

    pub fn stream_name(&self) -> &'static str {
        STREAM_NAME
    }

    /// Create an inactive cursor over the whole buffer.
    pub fn instance_playback(self: &Arc<Self>) -> PlaybackCursor {
        PlaybackCursor::new(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Vec<StereoFrame> {
        (0..count).map(|i| StereoFrame::from_mono(i as f32 / count as f32)).collect()
    }

    #[test]
    fn test_new_rejects_zero_rate() {
        assert!(matches!(SampleBuffer::new(0), Err(Error::InvalidRate(0))));
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = SampleBuffer::new(44100).unwrap();
        assert!(!buffer.is_valid());
        assert_eq!(buffer.frame_count(), 0);
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.get_length(), 0.0);
        assert_eq!(buffer.target_rate(), 44100);
        assert_eq!(buffer.stream_name(), "RAMAudio");
    }

    #[test]
    fn test_load_frames_same_rate() {
        let mut buffer = SampleBuffer::new(100).unwrap();
        buffer.load_frames(frames(100), 100).unwrap();

        assert!(buffer.is_valid());
        assert_eq!(buffer.frame_count(), 100);
        assert!(buffer.capacity() >= 100);
        assert!((buffer.get_length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_frames_resamples() {
        let mut buffer = SampleBuffer::new(44100).unwrap();
        buffer.load_frames(frames(48000), 48000).unwrap();

        assert_eq!(buffer.frame_count(), 44100);
        assert_eq!(buffer.capacity(), 44100);
        assert!((buffer.get_length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reload_forbidden() {
        let mut buffer = SampleBuffer::new(100).unwrap();
        buffer.load_frames(frames(10), 100).unwrap();

        let result = buffer.load_frames(frames(20), 100);
        assert!(matches!(result, Err(Error::ReloadForbidden)));
        assert_eq!(buffer.frame_count(), 10);

        let result = buffer.load("another.wav");
        assert!(matches!(result, Err(Error::ReloadForbidden)));
    }

    #[test]
    fn test_resample_zero_rate_leaves_buffer_untouched() {
        let mut buffer = SampleBuffer::new(100).unwrap();
        buffer.load_frames(frames(10), 100).unwrap();

        assert!(matches!(buffer.resample(0), Err(Error::InvalidRate(0))));
        assert_eq!(buffer.frame_count(), 10);
    }

    #[test]
    fn test_resample_zero_rate_on_empty_buffer_allocates_nothing() {
        let mut buffer = SampleBuffer::new(100).unwrap();
        assert!(matches!(buffer.resample(0), Err(Error::InvalidRate(0))));
        assert_eq!(buffer.capacity(), 0);
        assert!(!buffer.is_valid());
    }

    #[test]
    fn test_resample_unloaded() {
        let mut buffer = SampleBuffer::new(100).unwrap();
        assert!(matches!(buffer.resample(50), Err(Error::NotLoaded)));
    }

    #[test]
    fn test_resample_updates_length() {
        let mut buffer = SampleBuffer::new(200).unwrap();
        buffer.load_frames(frames(100), 200).unwrap();

        // Treat the held frames as 100 Hz material
        let new_count = buffer.resample(100).unwrap();
        assert_eq!(new_count, 200);
        assert_eq!(buffer.frame_count(), 200);
        assert_eq!(buffer.capacity(), 200);
        assert!((buffer.get_length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_instance_playback_spans_buffer() {
        let mut buffer = SampleBuffer::new(100).unwrap();
        buffer.load_frames(frames(100), 100).unwrap();
        let buffer = Arc::new(buffer);

        let cursor = buffer.instance_playback();
        assert!(!cursor.is_playing());
        assert_eq!(cursor.start_position(), 0);
        assert_eq!(cursor.end_position(), 100);
    }
}
