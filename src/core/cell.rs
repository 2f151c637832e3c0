//! Terminal Cell
//!
//! A single grid position: one character plus the drawing attributes that
//! were active when it was written.

use serde::{Deserialize, Serialize};

use super::surface::DrawStyle;

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    /// Foreground color index, `None` for the default
    pub fg: Option<u8>,
    /// Background color index, `None` for the default
    pub bg: Option<u8>,
    pub style: DrawStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
        style: DrawStyle::NONE,
    };

    pub fn new(ch: char) -> Self {
        Self {
            ch,
            ..Self::BLANK
        }
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }
}
