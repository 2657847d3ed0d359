//! Audio decoder using symphonia
//!
//! Decodes a whole file into stereo frames at the file's native rate. The
//! container is selected by file extension:
//!
//! - `.wav` (PCM)
//! - `.ogg` (Vorbis)
//!
//! Any other extension is rejected with [`Error::InvalidFormat`] before the
//! file is opened. Mono sources are duplicated to both channels; sources
//! with more than two channels keep the first two.

use crate::audio::types::StereoFrame;
use crate::error::{Error, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer as SymphoniaSampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Wav,
    OggVorbis,
}

impl ContainerFormat {
    /// Select the container from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("wav") => Ok(ContainerFormat::Wav),
            Some("ogg") => Ok(ContainerFormat::OggVorbis),
            _ => Err(Error::InvalidFormat(path.display().to_string())),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Wav => "wav",
            ContainerFormat::OggVorbis => "ogg",
        }
    }
}

/// Fully decoded file at its native sample rate
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub frames: Vec<StereoFrame>,
    pub source_rate: u32,
}

/// Decode an entire audio file to stereo frames.
///
/// # Errors
/// - [`Error::InvalidFormat`] for an unsupported extension
/// - [`Error::Decode`] if the file cannot be opened or probed, a packet
///   cannot be read, the WAV data is shorter than its header declares, or
///   no frames decode
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let format_kind = ContainerFormat::from_path(path)?;

    debug!("Decoding entire file: {} ({:?})", path.display(), format_kind);

    let file = std::fs::File::open(path)
        .map_err(|e| Error::Decode(format!("Failed to open file {}: {}", path.display(), e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format_kind.extension());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| Error::Decode("Sample rate not found".to_string()))?;

    debug!(
        "Audio format: sample_rate={}, channels={:?}",
        source_rate,
        codec_params.channels.map(|c| c.count())
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut frames = Vec::new();
    let mut sample_buf: Option<SymphoniaSampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                debug!("Reached end of file");
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                return Err(Error::Decode(format!(
                    "Stream parameters changed mid-file in {}",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(Error::Decode(format!(
                    "Failed to read packet from {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Decode error: {}", e);
                continue;
            }
            Err(e) => {
                return Err(Error::Decode(format!("Decoder failed: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let packet_frames = decoded.capacity();

        // Reuse the conversion buffer until a packet outgrows it
        let too_small = sample_buf
            .as_ref()
            .map_or(true, |buf| buf.capacity() < packet_frames * channels);
        if too_small {
            sample_buf = Some(SymphoniaSampleBuffer::<f32>::new(packet_frames as u64, spec));
        }

        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            push_interleaved(buf.samples(), channels, &mut frames);
        }
    }

    if frames.is_empty() {
        return Err(Error::Decode(format!(
            "No audio frames decoded from {}",
            path.display()
        )));
    }

    // A short data chunk reads as a clean end of stream; only the header's
    // frame count reveals it.
    if format_kind == ContainerFormat::Wav {
        if let Some(expected) = codec_params.n_frames {
            if (frames.len() as u64) < expected {
                return Err(Error::Decode(format!(
                    "Truncated file {}: {} of {} frames present",
                    path.display(),
                    frames.len(),
                    expected
                )));
            }
        }
    }

    debug!("Decoded {} frames at {}Hz", frames.len(), source_rate);

    Ok(DecodedAudio {
        frames,
        source_rate,
    })
}

/// Append interleaved samples with `channels` channels as stereo frames.
pub(crate) fn push_interleaved(samples: &[f32], channels: usize, output: &mut Vec<StereoFrame>) {
    match channels {
        0 => {}
        1 => output.extend(samples.iter().map(|&s| StereoFrame::from_mono(s))),
        n => output.extend(
            samples
                .chunks_exact(n)
                .map(|frame| StereoFrame::new(frame[0], frame[1])),
        ),
    }
}
