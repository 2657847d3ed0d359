//! One-shot cubic resampling with a fixed-point phase accumulator
//!
//! Converts a whole decoded buffer from its native rate to the host mix rate
//! at load time. Never called from the mix path.
//!
//! The phase is a u64 scaled by `2^FP_BITS`. Each output frame reads a
//! four-tap window `whole+1 ..= whole+4` (the fixed `+GUARD_FRAMES` bias,
//! kept for bit-compatible output) and interpolates between the second and
//! third taps:
//!
//! ```text
//! a0 = y3 - y2 - y0 + y1
//! a1 = y0 - y1 - a0
//! a2 = y2 - y0
//! a3 = y1
//! out = a0*mu^3 + a1*mu^2 + a2*mu + a3
//! ```
//!
//! Taps past the end of the source read as silence. The source vector is
//! padded with `GUARD_FRAMES` silent frames and tap indices are clamped to
//! the last of them, so the loop never branches on range.

use crate::audio::types::StereoFrame;
use crate::error::{Error, Result};
use tracing::debug;

/// Fractional bits of the phase accumulator
pub const FP_BITS: u32 = 16;

/// One whole frame in phase units
pub const FP_LEN: u64 = 1 << FP_BITS;

/// Mask selecting the fractional part of the phase
pub const FP_MASK: u64 = FP_LEN - 1;

/// Lookahead bias of the tap window; also the number of silent guard frames
/// appended to the source.
pub const GUARD_FRAMES: usize = 4;

/// Output length for `frame_count` source frames: `floor(frame_count * target / source)`.
pub fn resampled_len(frame_count: usize, source_rate: u32, target_rate: u32) -> usize {
    (frame_count as f64 * (target_rate as f64 / source_rate as f64)) as usize
}

/// Phase advance per output frame: `round(source / target * 2^FP_BITS)`.
pub fn phase_increment(source_rate: u32, target_rate: u32) -> u64 {
    ((source_rate as f64 / target_rate as f64) * FP_LEN as f64).round() as u64
}

/// Resample `source` (at `source_rate`) to `target_rate`.
///
/// Consumes the source. On any error the source frames are dropped, never
/// handed back: callers that own a buffer end up empty after a failed
/// allocation.
///
/// # Errors
/// - [`Error::InvalidRate`] if either rate is zero (checked before anything else)
/// - [`Error::NotLoaded`] if `source` is empty
/// - [`Error::OutOfMemory`] if the destination (or guard padding) cannot be allocated
pub fn resample_cubic(
    mut source: Vec<StereoFrame>,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<StereoFrame>> {
    if source_rate == 0 {
        return Err(Error::InvalidRate(source_rate));
    }
    if target_rate == 0 {
        return Err(Error::InvalidRate(target_rate));
    }
    if source.is_empty() {
        return Err(Error::NotLoaded);
    }

    let frame_count = source.len();
    let new_len = resampled_len(frame_count, source_rate, target_rate);

    debug!(
        "Resampling {} frames from {}Hz to {}Hz ({} output frames)",
        frame_count, source_rate, target_rate, new_len
    );

    let mut output = Vec::new();
    output
        .try_reserve_exact(new_len)
        .map_err(|_| Error::OutOfMemory(new_len))?;

    source
        .try_reserve_exact(GUARD_FRAMES)
        .map_err(|_| Error::OutOfMemory(frame_count + GUARD_FRAMES))?;
    source.resize(frame_count + GUARD_FRAMES, StereoFrame::SILENT);
    let last = source.len() - 1;

    let mix_increment = phase_increment(source_rate, target_rate);
    let mut mix_offset: u64 = 0;

    for _ in 0..new_len {
        let idx = GUARD_FRAMES + (mix_offset >> FP_BITS) as usize;
        let mu = (mix_offset & FP_MASK) as f32 / FP_LEN as f32;

        let y0 = source[(idx - 3).min(last)];
        let y1 = source[(idx - 2).min(last)];
        let y2 = source[(idx - 1).min(last)];
        let y3 = source[idx.min(last)];

        let mu2 = mu * mu;
        let a0 = y3 - y2 - y0 + y1;
        let a1 = y0 - y1 - a0;
        let a2 = y2 - y0;
        let a3 = y1;

        output.push(a0 * mu * mu2 + a1 * mu2 + a2 * mu + a3);

        mix_offset += mix_increment;
    }

    Ok(output)
}
