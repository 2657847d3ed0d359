//! Audio data, decoding, resampling and device output

pub mod decoder;
pub mod output;
pub mod resampler;
pub mod sample_buffer;
pub mod types;

pub use decoder::{decode_file, ContainerFormat, DecodedAudio};
pub use output::AudioOutput;
pub use sample_buffer::SampleBuffer;
pub use types::StereoFrame;
