//! Terminal Surface Module
//!
//! The contract between the emulator and whatever displays characters,
//! plus a headless implementation of it:
//! - [`TerminalSurface`] and its value types
//! - [`Screen`], an in-memory grid with primary and alternate buffers
//! - Character set translation
//! - Deterministic snapshots of a [`Screen`]

mod cell;
mod charset;
mod screen;
mod snapshot;
mod surface;

pub use cell::Cell;
pub use charset::{translate_char, CharsetState};
pub use screen::Screen;
pub use snapshot::{CursorSnapshot, Snapshot, StyledCell};
pub use surface::{CharSet, CharSetSlot, DrawStyle, Rect, TerminalSurface};
