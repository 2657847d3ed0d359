//! Test helper modules for ram-audio integration tests
//!
//! - audio_generator: deterministic WAV fixtures written with hound

#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{generate_ramp_wav, generate_sine_wav};
