//! Terminal surface contract
//!
//! The emulator never owns a character grid. It drives whatever implements
//! [`TerminalSurface`]: a GUI renderer, a headless [`Screen`](super::Screen),
//! or a test recorder.

use serde::{Deserialize, Serialize};

/// Cell rectangle, end-exclusive on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Rect {
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> usize {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> usize {
        self.y2.saturating_sub(self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Character set designation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharSetSlot {
    #[default]
    G0,
    G1,
}

/// Character set table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharSet {
    /// US ASCII
    #[default]
    Us,
    /// UK: `#` is the pound sign
    Uk,
    /// DEC special graphics (line drawing)
    DecGraphics,
}

/// Text drawing attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawStyle {
    pub bold: bool,
    pub underline: bool,
    pub blink: bool,
    pub inverse: bool,
    pub hidden: bool,
}

impl DrawStyle {
    pub const NONE: DrawStyle = DrawStyle {
        bold: false,
        underline: false,
        blink: false,
        inverse: false,
        hidden: false,
    };
    pub const BOLD: DrawStyle = DrawStyle {
        bold: true,
        ..Self::NONE
    };
    pub const UNDERLINE: DrawStyle = DrawStyle {
        underline: true,
        ..Self::NONE
    };
    pub const BLINK: DrawStyle = DrawStyle {
        blink: true,
        ..Self::NONE
    };
    pub const INVERSE: DrawStyle = DrawStyle {
        inverse: true,
        ..Self::NONE
    };
    pub const HIDDEN: DrawStyle = DrawStyle {
        hidden: true,
        ..Self::NONE
    };

    /// Attributes set in either style
    pub fn union(self, other: DrawStyle) -> DrawStyle {
        DrawStyle {
            bold: self.bold || other.bold,
            underline: self.underline || other.underline,
            blink: self.blink || other.blink,
            inverse: self.inverse || other.inverse,
            hidden: self.hidden || other.hidden,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::NONE
    }
}

/// Operations the emulator performs on a character display.
///
/// Coordinates are 0-based cells. `x` may equal `column_count()` for a
/// cursor parked past the last column, waiting to wrap.
pub trait TerminalSurface {
    fn column_count(&self) -> usize;

    fn row_count(&self) -> usize;

    /// Cursor as `(x, y)`
    fn cursor(&self) -> (usize, usize);

    fn set_cursor(&mut self, x: usize, y: usize);

    /// Draw one character, given as the raw bytes the tokenizer matched
    fn put_char(&mut self, bytes: &[u8], x: usize, y: usize);

    /// Blank the end-exclusive area `[x1, x2) x [y1, y2)`
    fn clear_area(&mut self, x1: usize, y1: usize, x2: usize, y2: usize);

    /// Copy `src` so its top-left corner lands on `(dst_x, dst_y)`
    fn move_area(&mut self, src: Rect, dst_x: usize, dst_y: usize);

    /// Shift rows `[y1, y2)` by `lines`, blanking the rows exposed
    fn scroll_region(&mut self, y1: usize, y2: usize, lines: usize, down: bool);

    /// Designate `set` into `slot`
    fn set_char_set(&mut self, slot: CharSetSlot, set: CharSet);

    /// Invoke `slot` as the active character set
    fn select_char_set(&mut self, slot: CharSetSlot);

    fn set_draw_style(&mut self, style: DrawStyle);

    fn add_draw_style(&mut self, style: DrawStyle);

    /// Foreground color index; `None` restores the default
    fn set_draw_foreground(&mut self, color: Option<u8>);

    /// Background color index; `None` restores the default
    fn set_draw_background(&mut self, color: Option<u8>);

    /// Change the column count (80/132 switching)
    fn set_columns(&mut self, columns: usize);

    /// Adopt a new window size announced by the host
    fn set_size(&mut self, _cols: usize, _rows: usize) {}

    fn set_wrap_around(&mut self, enabled: bool);

    fn set_enable_cursor(&mut self, enabled: bool);

    fn set_cursor_blink(&mut self, _enabled: bool) {}

    fn set_alt_screen_buffer(&mut self, enabled: bool);

    fn beep(&mut self) {}
}
