//! Deterministic snapshot generation
//!
//! Snapshots capture the visible state of a [`Screen`] in a serializable
//! form. Feeding the same byte stream through the emulator must always
//! produce an identical snapshot.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::charset::CharsetState;
use super::screen::Screen;
use super::surface::TerminalSurface;

/// A complete snapshot of the screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// Row text, trailing blanks trimmed
    pub lines: Vec<String>,
    /// Cells carrying colors or attributes
    pub styled: Vec<StyledCell>,
    pub cursor: CursorSnapshot,
    pub alternate_screen: bool,
    pub wrap_around: bool,
    pub charsets: CharsetState,
    pub bell_count: usize,
}

/// A non-default cell and its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledCell {
    pub x: usize,
    pub y: usize,
    pub cell: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub x: usize,
    pub y: usize,
    pub visible: bool,
    pub blinking: bool,
}

impl Snapshot {
    pub fn from_screen(screen: &Screen) -> Self {
        let (x, y) = screen.cursor();
        let mut styled = Vec::new();
        for row in 0..screen.rows() {
            for col in 0..screen.cols() {
                if let Some(cell) = screen.cell(col, row) {
                    if cell.fg.is_some() || cell.bg.is_some() || !cell.style.is_plain() {
                        styled.push(StyledCell {
                            x: col,
                            y: row,
                            cell: *cell,
                        });
                    }
                }
            }
        }

        Self {
            cols: screen.cols(),
            rows: screen.rows(),
            lines: (0..screen.rows()).map(|r| screen.line_text(r)).collect(),
            styled,
            cursor: CursorSnapshot {
                x,
                y,
                visible: screen.cursor_visible(),
                blinking: screen.cursor_blink(),
            },
            alternate_screen: screen.is_alternate(),
            wrap_around: screen.wrap_around(),
            charsets: *screen.charsets(),
            bell_count: screen.bell_count(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text rendering, without trailing empty rows
    pub fn to_text(&self) -> String {
        let last = self
            .lines
            .iter()
            .rposition(|l| !l.is_empty())
            .map_or(0, |i| i + 1);
        let mut text = self.lines[..last].join("\n");
        text.push('\n');
        text
    }

    /// Compare visible content only
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.lines == other.lines && self.styled == other.styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DrawStyle;

    #[test]
    fn test_snapshot_text() {
        let mut screen = Screen::new(10, 4);
        screen.put_char(b"h", 0, 0);
        screen.put_char(b"i", 1, 0);
        screen.put_char(b"!", 0, 1);
        let snapshot = Snapshot::from_screen(&screen);
        assert_eq!(snapshot.to_text(), "hi\n!\n");
        assert!(snapshot.styled.is_empty());
    }

    #[test]
    fn test_snapshot_styled_cells() {
        let mut screen = Screen::new(4, 1);
        screen.set_draw_style(DrawStyle::UNDERLINE);
        screen.put_char(b"u", 2, 0);
        let snapshot = Snapshot::from_screen(&screen);
        assert_eq!(snapshot.styled.len(), 1);
        assert_eq!(snapshot.styled[0].x, 2);
        assert!(snapshot.styled[0].cell.style.underline);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut screen = Screen::new(6, 2);
        screen.set_draw_foreground(Some(4));
        screen.put_char(b"z", 0, 1);
        screen.set_cursor(3, 1);
        let snapshot = Snapshot::from_screen(&screen);
        let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(snapshot, restored);
        assert!(snapshot.content_equals(&restored));
    }
}
