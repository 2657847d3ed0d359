//! Core audio data types
//!
//! [`StereoFrame`] is the single sample type used by the buffer, the
//! resampler and the mix path. Samples are f32, nominally -1.0 to 1.0.

use std::ops::{Add, Mul, Sub};

/// One sample instant of stereo audio.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    /// Left channel sample
    pub left: f32,

    /// Right channel sample
    pub right: f32,
}

impl StereoFrame {
    /// Silent frame (0.0, 0.0)
    pub const SILENT: StereoFrame = StereoFrame { left: 0.0, right: 0.0 };

    /// Create a frame from left and right samples
    pub const fn new(left: f32, right: f32) -> Self {
        StereoFrame { left, right }
    }

    /// Create a frame from mono sample (duplicate to both channels)
    pub const fn from_mono(sample: f32) -> Self {
        StereoFrame { left: sample, right: sample }
    }

    /// Apply volume scaling to both channels
    pub fn apply_volume(&mut self, volume: f32) {
        self.left *= volume;
        self.right *= volume;
    }

    /// Clamp samples to valid range [-1.0, 1.0] to prevent clipping
    pub fn clamp(&mut self) {
        self.left = self.left.clamp(-1.0, 1.0);
        self.right = self.right.clamp(-1.0, 1.0);
    }

    pub fn is_silent(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

impl Add for StereoFrame {
    type Output = StereoFrame;

    #[inline]
    fn add(self, rhs: StereoFrame) -> StereoFrame {
        StereoFrame::new(self.left + rhs.left, self.right + rhs.right)
    }
}

impl Sub for StereoFrame {
    type Output = StereoFrame;

    #[inline]
    fn sub(self, rhs: StereoFrame) -> StereoFrame {
        StereoFrame::new(self.left - rhs.left, self.right - rhs.right)
    }
}

impl Mul<f32> for StereoFrame {
    type Output = StereoFrame;

    #[inline]
    fn mul(self, rhs: f32) -> StereoFrame {
        StereoFrame::new(self.left * rhs, self.right * rhs)
    }
}
