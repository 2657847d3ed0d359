//! Error types for ram-audio
//!
//! Load-time and resample failures are reported through [`Error`]. Playback
//! conditions (empty buffer at start, exhausted slice) are never errors: the
//! mix path degrades to silence instead.

use thiserror::Error;

/// Main error type for ram-audio
#[derive(Error, Debug)]
pub enum Error {
    /// Zero (or otherwise unusable) sample rate
    #[error("Invalid sample rate: {0} Hz")]
    InvalidRate(u32),

    /// Operation requires frames but the buffer holds none
    #[error("Sample buffer is not loaded")]
    NotLoaded,

    /// Destination allocation failed during resampling
    #[error("Out of memory allocating {0} frames")]
    OutOfMemory(usize),

    /// Buffer already holds frames; load-once semantics
    #[error("Reloading audio is forbidden")]
    ReloadForbidden,

    /// File extension does not name a supported container
    #[error("Unsupported audio format: {0}")]
    InvalidFormat(String),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Cursor command queue has no free slot
    #[error("Cursor command queue is full")]
    CommandQueueFull,

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// WAV render output errors
    #[error("WAV write error: {0}")]
    Wav(#[from] hound::Error),
}

/// Convenience Result type using ram-audio Error
pub type Result<T> = std::result::Result<T, Error>;
