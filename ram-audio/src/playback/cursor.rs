//! Playback cursor over a shared [`SampleBuffer`]
//!
//! A cursor reads a slice `[start_position, end_position)` of the buffer
//! into caller-supplied output blocks. It is either Inactive (mixes
//! silence) or Active. A non-looping cursor deactivates itself when the
//! slice runs out; a looping cursor wraps back to the slice start and
//! counts the wrap.
//!
//! [`PlaybackCursor::mix`] is the real-time entry point: it never fails,
//! never allocates, never locks and never logs.

use crate::audio::sample_buffer::SampleBuffer;
use crate::audio::types::StereoFrame;
use std::sync::Arc;
use tracing::warn;

/// Shortest length reported for a non-looping cursor, in seconds.
///
/// Keeps a just-started or empty slice from reading as already finished.
pub const MIN_REPORTED_LENGTH: f64 = 0.0213;

/// Convert seconds to a frame offset at `rate`. Negative and NaN map to 0.
#[inline]
pub(crate) fn seconds_to_frames(seconds: f64, rate: u32) -> usize {
    (seconds * rate as f64).max(0.0) as usize
}

/// Reported length of a slice: 0 for looping (open-ended), otherwise the
/// slice duration floored to [`MIN_REPORTED_LENGTH`].
pub(crate) fn slice_length_seconds(start: usize, end: usize, looping: bool, rate: u32) -> f64 {
    if looping {
        return 0.0;
    }
    let length = end.saturating_sub(start) as f64 / rate as f64;
    length.max(MIN_REPORTED_LENGTH)
}

/// Read-only playback state machine over a shared sample buffer.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    buffer: Arc<SampleBuffer>,
    position: usize,
    start_position: usize,
    end_position: usize,
    active: bool,
    looping: bool,
    loop_count: u32,
}

impl PlaybackCursor {
    /// Create an inactive, non-looping cursor spanning the whole buffer.
    pub fn new(buffer: Arc<SampleBuffer>) -> Self {
        let end_position = buffer.frame_count();
        Self {
            buffer,
            position: 0,
            start_position: 0,
            end_position,
            active: false,
            looping: false,
            loop_count: 0,
        }
    }

    /// Seek to `from_seconds` within the slice and activate.
    ///
    /// Starting an empty buffer is allowed (it plays silence) but logged.
    pub fn start(&mut self, from_seconds: f64) {
        if !self.buffer.is_valid() {
            warn!("Attempting to play invalid audio (buffer holds no frames)");
        }
        self.activate(from_seconds);
    }

    /// `start` without the diagnostic; used from the mixing thread.
    pub(crate) fn activate(&mut self, from_seconds: f64) {
        self.seek(from_seconds);
        self.loop_count = 0;
        self.active = true;
    }

    /// Deactivate. The position is kept.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Move to `to_seconds` past the slice start, clamped to the slice end.
    pub fn seek(&mut self, to_seconds: f64) {
        let offset = seconds_to_frames(to_seconds, self.buffer.target_rate());
        self.position = self
            .start_position
            .saturating_add(offset)
            .min(self.end_position);
    }

    /// Restrict playback to `length_seconds` starting at `start_seconds`.
    ///
    /// A negative length spans to the end of the buffer. Both bounds are
    /// clamped to the buffer, and the position is reset to the slice start.
    pub fn set_slice(&mut self, start_seconds: f64, length_seconds: f64) {
        let rate = self.buffer.target_rate();
        let frame_count = self.buffer.frame_count();

        self.start_position = seconds_to_frames(start_seconds, rate).min(frame_count);
        self.position = self.start_position;

        self.end_position = if length_seconds < 0.0 {
            frame_count
        } else {
            self.start_position
                .saturating_add(seconds_to_frames(length_seconds, rate))
                .min(frame_count)
        };
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Fill `output` with the next frames of the slice.
    ///
    /// Returns how many leading frames of `output` came from the buffer;
    /// the rest are silence. Inactive cursors write silence, return 0 and
    /// keep their state.
    pub fn mix(&mut self, output: &mut [StereoFrame]) -> usize {
        if !self.active {
            output.fill(StereoFrame::SILENT);
            return 0;
        }

        if self.looping {
            self.mix_loop(output)
        } else {
            self.mix_once(output)
        }
    }

    fn mix_loop(&mut self, output: &mut [StereoFrame]) -> usize {
        if self.end_position <= self.start_position {
            output.fill(StereoFrame::SILENT);
            return 0;
        }

        let frames = self.buffer.frames();

        for slot in output.iter_mut() {
            // Reached only when a seek parked the cursor on the slice end
            if self.position >= self.end_position {
                self.position = self.start_position;
                self.loop_count = self.loop_count.wrapping_add(1);
            }

            *slot = frames[self.position];
            self.position += 1;

            if self.position >= self.end_position {
                self.position = self.start_position;
                self.loop_count = self.loop_count.wrapping_add(1);
            }
        }

        output.len()
    }

    fn mix_once(&mut self, output: &mut [StereoFrame]) -> usize {
        let available = self.end_position.saturating_sub(self.position);
        let mix_frames = output.len().min(available);

        let source = &self.buffer.frames()[self.position..self.position + mix_frames];
        output[..mix_frames].copy_from_slice(source);

        if mix_frames < output.len() {
            output[mix_frames..].fill(StereoFrame::SILENT);
            self.active = false;
        }

        self.position += mix_frames;
        mix_frames
    }

    pub fn is_playing(&self) -> bool {
        self.active
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Absolute read position in seconds.
    pub fn get_playback_position(&self) -> f64 {
        self.position as f64 / self.buffer.target_rate() as f64
    }

    /// Slice length in seconds; 0 while looping.
    pub fn get_length(&self) -> f64 {
        slice_length_seconds(
            self.start_position,
            self.end_position,
            self.looping,
            self.buffer.target_rate(),
        )
    }

    /// Wraps taken since the last `start`.
    pub fn get_loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn start_position(&self) -> usize {
        self.start_position
    }

    pub fn end_position(&self) -> usize {
        self.end_position
    }

    pub fn buffer(&self) -> &Arc<SampleBuffer> {
        &self.buffer
    }
}
