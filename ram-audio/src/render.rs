//! Offline rendering of a cursor to a WAV file
//!
//! Drives a [`CursorMixer`] in fixed-size blocks exactly as an audio
//! callback would, and writes the result as 32-bit float stereo WAV at the
//! buffer's target rate. Used by the CLI's `--render` mode and by tests
//! that need to inspect mixed output without an audio device.

use crate::audio::types::StereoFrame;
use crate::error::Result;
use crate::playback::CursorMixer;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use tracing::{debug, info};

/// Frames mixed per block
pub const RENDER_BLOCK_FRAMES: usize = 512;

/// Mix `mixer` into a WAV file until the cursor stops or `max_frames`
/// frames have been written.
///
/// Pending control commands are applied before the first block, so a
/// cursor started through its handle renders from its start point. Only
/// frames copied from the buffer are written: the silent tail of the block
/// in which a one-shot cursor finishes is dropped. A looping cursor only
/// ends once `max_frames` frames have been mixed.
///
/// Returns the number of frames written.
pub fn render_to_wav<P: AsRef<Path>>(
    mixer: &mut CursorMixer,
    path: P,
    max_frames: usize,
) -> Result<usize> {
    let path = path.as_ref();
    let sample_rate = mixer.cursor().buffer().target_rate();

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    let mut block = vec![StereoFrame::SILENT; RENDER_BLOCK_FRAMES];
    let mut mixed = 0;
    let mut written = 0;

    while mixed < max_frames {
        let frames = RENDER_BLOCK_FRAMES.min(max_frames - mixed);
        let copied = mixer.mix(&mut block[..frames]);
        mixed += frames;

        // A looping cursor on an empty slice stays active but copies
        // nothing; it is bounded by `max_frames` like any other loop.
        for frame in &block[..copied] {
            writer.write_sample(frame.left)?;
            writer.write_sample(frame.right)?;
        }
        written += copied;

        if !mixer.cursor().is_playing() {
            debug!("Cursor finished after {} frames", written);
            break;
        }
    }

    writer.finalize()?;

    info!(
        "Rendered {} frames ({:.3}s at {}Hz) to {}",
        written,
        written as f64 / sample_rate as f64,
        sample_rate,
        path.display()
    );

    Ok(written)
}
