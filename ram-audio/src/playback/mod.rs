//! Playback cursors and their real-time control bridge

pub mod control;
pub mod cursor;

pub use control::{create_cursor, CursorCommand, CursorHandle, CursorMixer};
pub use cursor::PlaybackCursor;
