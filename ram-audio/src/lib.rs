//! # ram-audio
//!
//! Load-once, in-memory sample playback.
//!
//! **Purpose:** Decode a sound once, resample it to the host mix rate with a
//! cubic fixed-point resampler, then stream it to a real-time output
//! callback through any number of independent playback cursors supporting
//! slicing, looping and stopping.
//!
//! **Architecture:** symphonia decode → [`SampleBuffer`] (shared, read-only)
//! → [`CursorMixer`] on the audio thread, driven by a [`CursorHandle`] on the
//! control thread → cpal output or offline WAV render.

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod render;

pub use audio::{SampleBuffer, StereoFrame};
pub use error::{Error, Result};
pub use playback::{create_cursor, CursorCommand, CursorHandle, CursorMixer, PlaybackCursor};
