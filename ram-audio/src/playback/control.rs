//! Cursor control bridge between a control thread and the audio callback
//!
//! A cursor is split into two halves:
//!
//! - [`CursorHandle`] lives on the control (UI/scripting) thread and
//!   enqueues [`CursorCommand`]s.
//! - [`CursorMixer`] is moved into the real-time callback. It owns the
//!   [`PlaybackCursor`], drains the queue at the top of every
//!   [`CursorMixer::mix`] call and publishes its state back through atomics.
//!
//! Only the mixing thread ever writes cursor state. The queue is a
//! lock-free SPSC ring, so neither side blocks or allocates after
//! construction. Control operations take effect on the next mix call and
//! handle queries reflect the state as of the last mix call.
//!
//! ```ignore
//! let (mut handle, mut mixer) = create_cursor(Arc::clone(&buffer), 64);
//!
//! // Control thread
//! handle.set_slice(0.2, 0.3)?;
//! handle.start(0.0)?;
//!
//! // Audio callback
//! mixer.mix(&mut block);
//! ```

use crate::audio::sample_buffer::SampleBuffer;
use crate::audio::types::StereoFrame;
use crate::error::{Error, Result};
use crate::playback::cursor::{slice_length_seconds, PlaybackCursor};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of queued control commands per cursor
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 64;

/// A control operation for one cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorCommand {
    /// Seek to `from_seconds` within the slice and activate.
    Start { from_seconds: f64 },

    /// Deactivate; position kept.
    Stop,

    /// Move to `to_seconds` past the slice start.
    Seek { to_seconds: f64 },

    /// Replace the slice; negative length spans to the buffer end.
    SetSlice {
        start_seconds: f64,
        length_seconds: f64,
    },

    /// Enable or disable looping.
    SetLoop { looping: bool },
}

/// Cursor state published by the mixer after each mix call.
#[derive(Debug)]
struct SharedReadback {
    active: AtomicBool,
    looping: AtomicBool,
    position: AtomicUsize,
    start_position: AtomicUsize,
    end_position: AtomicUsize,
    loop_count: AtomicU32,
}

impl SharedReadback {
    fn from_cursor(cursor: &PlaybackCursor) -> Self {
        Self {
            active: AtomicBool::new(cursor.is_playing()),
            looping: AtomicBool::new(cursor.is_looping()),
            position: AtomicUsize::new(cursor.position()),
            start_position: AtomicUsize::new(cursor.start_position()),
            end_position: AtomicUsize::new(cursor.end_position()),
            loop_count: AtomicU32::new(cursor.get_loop_count()),
        }
    }

    fn publish(&self, cursor: &PlaybackCursor) {
        self.position.store(cursor.position(), Ordering::Relaxed);
        self.start_position
            .store(cursor.start_position(), Ordering::Relaxed);
        self.end_position.store(cursor.end_position(), Ordering::Relaxed);
        self.loop_count
            .store(cursor.get_loop_count(), Ordering::Relaxed);
        self.looping.store(cursor.is_looping(), Ordering::Relaxed);
        self.active.store(cursor.is_playing(), Ordering::Release);
    }
}

/// Create a linked control handle and real-time mixer for a new cursor
/// over `buffer`.
///
/// `queue_capacity` bounds the number of commands that may be pending
/// between two mix calls (at least one slot is always allocated).
pub fn create_cursor(
    buffer: Arc<SampleBuffer>,
    queue_capacity: usize,
) -> (CursorHandle, CursorMixer) {
    let cursor = PlaybackCursor::new(Arc::clone(&buffer));
    let (producer, consumer) = HeapRb::<CursorCommand>::new(queue_capacity.max(1)).split();
    let readback = Arc::new(SharedReadback::from_cursor(&cursor));

    debug!(
        "Created cursor bridge: {} frames, queue capacity {}",
        buffer.frame_count(),
        queue_capacity.max(1)
    );

    let handle = CursorHandle {
        commands: producer,
        readback: Arc::clone(&readback),
        buffer,
    };

    let mixer = CursorMixer {
        cursor,
        commands: consumer,
        readback,
    };

    (handle, mixer)
}

// ═══════════════════════════════════════════════════════════════════
// CursorHandle - control thread
// ═══════════════════════════════════════════════════════════════════

/// Control-thread half of a cursor.
pub struct CursorHandle {
    commands: HeapProd<CursorCommand>,
    readback: Arc<SharedReadback>,
    buffer: Arc<SampleBuffer>,
}

impl CursorHandle {
    /// Enqueue a command for the next mix call.
    ///
    /// # Errors
    /// [`Error::CommandQueueFull`] if the mixer has not drained enough
    /// earlier commands.
    pub fn send(&mut self, command: CursorCommand) -> Result<()> {
        self.commands
            .try_push(command)
            .map_err(|_| Error::CommandQueueFull)
    }

    pub fn start(&mut self, from_seconds: f64) -> Result<()> {
        if !self.buffer.is_valid() {
            warn!("Attempting to play invalid audio (buffer holds no frames)");
        }
        self.send(CursorCommand::Start { from_seconds })
    }

    pub fn stop(&mut self) -> Result<()> {
        self.send(CursorCommand::Stop)
    }

    pub fn seek(&mut self, to_seconds: f64) -> Result<()> {
        self.send(CursorCommand::Seek { to_seconds })
    }

    pub fn set_slice(&mut self, start_seconds: f64, length_seconds: f64) -> Result<()> {
        self.send(CursorCommand::SetSlice {
            start_seconds,
            length_seconds,
        })
    }

    pub fn set_loop(&mut self, looping: bool) -> Result<()> {
        self.send(CursorCommand::SetLoop { looping })
    }

    pub fn is_playing(&self) -> bool {
        self.readback.active.load(Ordering::Acquire)
    }

    pub fn is_looping(&self) -> bool {
        self.readback.looping.load(Ordering::Relaxed)
    }

    /// Read position in seconds as of the last mix call.
    pub fn get_playback_position(&self) -> f64 {
        self.readback.position.load(Ordering::Relaxed) as f64 / self.buffer.target_rate() as f64
    }

    /// Slice length in seconds; 0 while looping.
    pub fn get_length(&self) -> f64 {
        slice_length_seconds(
            self.readback.start_position.load(Ordering::Relaxed),
            self.readback.end_position.load(Ordering::Relaxed),
            self.is_looping(),
            self.buffer.target_rate(),
        )
    }

    pub fn get_loop_count(&self) -> u32 {
        self.readback.loop_count.load(Ordering::Relaxed)
    }

    pub fn buffer(&self) -> &Arc<SampleBuffer> {
        &self.buffer
    }
}

// ═══════════════════════════════════════════════════════════════════
// CursorMixer - audio thread
// ═══════════════════════════════════════════════════════════════════

/// Real-time half of a cursor. Move this into the audio callback.
pub struct CursorMixer {
    cursor: PlaybackCursor,
    commands: HeapCons<CursorCommand>,
    readback: Arc<SharedReadback>,
}

impl CursorMixer {
    /// Apply every pending command. Returns how many were applied.
    pub fn process_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Some(command) = self.commands.try_pop() {
            apply_command(&mut self.cursor, command);
            applied += 1;
        }
        applied
    }

    /// Drain pending commands, then fill `output` from the cursor.
    ///
    /// Returns the number of leading frames copied from the buffer, as
    /// [`PlaybackCursor::mix`] does. Never fails, allocates or blocks.
    pub fn mix(&mut self, output: &mut [StereoFrame]) -> usize {
        self.process_commands();
        let copied = self.cursor.mix(output);
        self.readback.publish(&self.cursor);
        copied
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }
}

fn apply_command(cursor: &mut PlaybackCursor, command: CursorCommand) {
    match command {
        CursorCommand::Start { from_seconds } => cursor.activate(from_seconds),
        CursorCommand::Stop => cursor.stop(),
        CursorCommand::Seek { to_seconds } => cursor.seek(to_seconds),
        CursorCommand::SetSlice {
            start_seconds,
            length_seconds,
        } => cursor.set_slice(start_seconds, length_seconds),
        CursorCommand::SetLoop { looping } => cursor.set_loop(looping),
    }
}
