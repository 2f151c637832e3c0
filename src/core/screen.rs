//! Headless screen
//!
//! An in-memory [`TerminalSurface`] holding a primary and an alternate grid.
//! It renders nothing. Tests, benches and the headless runner use it to
//! observe what the emulator did.

use super::cell::Cell;
use super::charset::CharsetState;
use super::surface::{CharSet, CharSetSlot, DrawStyle, Rect, TerminalSurface};

/// In-memory terminal surface
#[derive(Debug, Clone)]
pub struct Screen {
    cols: usize,
    rows: usize,
    primary: Vec<Cell>,
    alternate: Vec<Cell>,
    alt_active: bool,
    cursor_x: usize,
    cursor_y: usize,
    style: DrawStyle,
    fg: Option<u8>,
    bg: Option<u8>,
    charsets: CharsetState,
    wrap_around: bool,
    cursor_visible: bool,
    cursor_blink: bool,
    bell_count: usize,
}

impl Screen {
    /// Create a blank screen; both dimensions are at least 1
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            primary: vec![Cell::BLANK; cols * rows],
            alternate: vec![Cell::BLANK; cols * rows],
            alt_active: false,
            cursor_x: 0,
            cursor_y: 0,
            style: DrawStyle::NONE,
            fg: None,
            bg: None,
            charsets: CharsetState::new(),
            wrap_around: true,
            cursor_visible: true,
            cursor_blink: false,
            bell_count: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.cols && y < self.rows {
            Some(&self.grid()[y * self.cols + x])
        } else {
            None
        }
    }

    /// Text of row `y` with trailing blanks removed
    pub fn line_text(&self, y: usize) -> String {
        if y >= self.rows {
            return String::new();
        }
        let start = y * self.cols;
        let line: String = self.grid()[start..start + self.cols]
            .iter()
            .map(|c| c.ch)
            .collect();
        line.trim_end().to_string()
    }

    /// All rows, newline separated
    pub fn to_text(&self) -> String {
        (0..self.rows)
            .map(|y| self.line_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_alternate(&self) -> bool {
        self.alt_active
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn cursor_blink(&self) -> bool {
        self.cursor_blink
    }

    pub fn wrap_around(&self) -> bool {
        self.wrap_around
    }

    pub fn bell_count(&self) -> usize {
        self.bell_count
    }

    pub fn charsets(&self) -> &CharsetState {
        &self.charsets
    }

    pub fn draw_style(&self) -> DrawStyle {
        self.style
    }

    pub fn foreground(&self) -> Option<u8> {
        self.fg
    }

    pub fn background(&self) -> Option<u8> {
        self.bg
    }

    /// Change both dimensions, keeping the overlapping top-left content
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        self.primary = regrid(&self.primary, self.cols, self.rows, cols, rows);
        self.alternate = regrid(&self.alternate, self.cols, self.rows, cols, rows);
        self.cols = cols;
        self.rows = rows;
        self.cursor_x = self.cursor_x.min(cols);
        self.cursor_y = self.cursor_y.min(rows - 1);
    }

    fn grid(&self) -> &[Cell] {
        if self.alt_active {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Vec<Cell> {
        if self.alt_active {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    fn erased(&self) -> Cell {
        Cell {
            bg: self.bg,
            ..Cell::BLANK
        }
    }
}

fn regrid(cells: &[Cell], old_cols: usize, old_rows: usize, cols: usize, rows: usize) -> Vec<Cell> {
    let mut out = vec![Cell::BLANK; cols * rows];
    for y in 0..old_rows.min(rows) {
        let n = old_cols.min(cols);
        out[y * cols..y * cols + n].copy_from_slice(&cells[y * old_cols..y * old_cols + n]);
    }
    out
}

/// First character of `bytes`: UTF-8 when valid, Latin-1 otherwise
fn decode_char(bytes: &[u8]) -> char {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.chars().next().unwrap_or(' '),
        Err(_) => bytes.first().map(|&b| char::from(b)).unwrap_or(' '),
    }
}

impl TerminalSurface for Screen {
    fn column_count(&self) -> usize {
        self.cols
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor_x = x.min(self.cols);
        self.cursor_y = y.min(self.rows - 1);
    }

    fn put_char(&mut self, bytes: &[u8], x: usize, y: usize) {
        if x >= self.cols || y >= self.rows {
            tracing::trace!(x, y, "put_char outside grid");
            return;
        }
        let cell = Cell {
            ch: self.charsets.translate(decode_char(bytes)),
            fg: self.fg,
            bg: self.bg,
            style: self.style,
        };
        let cols = self.cols;
        self.grid_mut()[y * cols + x] = cell;
    }

    fn clear_area(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        let x2 = x2.min(self.cols);
        let y2 = y2.min(self.rows);
        let blank = self.erased();
        let cols = self.cols;
        let grid = self.grid_mut();
        for y in y1..y2 {
            for x in x1..x2 {
                grid[y * cols + x] = blank;
            }
        }
    }

    fn move_area(&mut self, src: Rect, dst_x: usize, dst_y: usize) {
        let src = Rect::new(
            src.x1,
            src.y1,
            src.x2.min(self.cols),
            src.y2.min(self.rows),
        );
        if src.is_empty() {
            return;
        }
        let cols = self.cols;
        let rows = self.rows;
        let copied: Vec<Vec<Cell>> = (src.y1..src.y2)
            .map(|y| self.grid()[y * cols + src.x1..y * cols + src.x2].to_vec())
            .collect();
        let grid = self.grid_mut();
        for (dy, row) in copied.iter().enumerate() {
            let y = dst_y + dy;
            if y >= rows {
                break;
            }
            for (dx, cell) in row.iter().enumerate() {
                let x = dst_x + dx;
                if x >= cols {
                    break;
                }
                grid[y * cols + x] = *cell;
            }
        }
    }

    fn scroll_region(&mut self, y1: usize, y2: usize, lines: usize, down: bool) {
        let y2 = y2.min(self.rows);
        if y1 >= y2 || lines == 0 {
            return;
        }
        let n = lines.min(y2 - y1);
        let cols = self.cols;
        let blank = self.erased();
        let grid = self.grid_mut();
        if down {
            grid.copy_within(y1 * cols..(y2 - n) * cols, (y1 + n) * cols);
            grid[y1 * cols..(y1 + n) * cols].fill(blank);
        } else {
            grid.copy_within((y1 + n) * cols..y2 * cols, y1 * cols);
            grid[(y2 - n) * cols..y2 * cols].fill(blank);
        }
    }

    fn set_char_set(&mut self, slot: CharSetSlot, set: CharSet) {
        self.charsets.designate(slot, set);
    }

    fn select_char_set(&mut self, slot: CharSetSlot) {
        self.charsets.invoke(slot);
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    fn add_draw_style(&mut self, style: DrawStyle) {
        self.style = self.style.union(style);
    }

    fn set_draw_foreground(&mut self, color: Option<u8>) {
        self.fg = color;
    }

    fn set_draw_background(&mut self, color: Option<u8>) {
        self.bg = color;
    }

    fn set_columns(&mut self, columns: usize) {
        let rows = self.rows;
        self.resize(columns, rows);
    }

    fn set_size(&mut self, cols: usize, rows: usize) {
        self.resize(cols, rows);
    }

    fn set_wrap_around(&mut self, enabled: bool) {
        self.wrap_around = enabled;
    }

    fn set_enable_cursor(&mut self, enabled: bool) {
        self.cursor_visible = enabled;
    }

    fn set_cursor_blink(&mut self, enabled: bool) {
        self.cursor_blink = enabled;
    }

    fn set_alt_screen_buffer(&mut self, enabled: bool) {
        self.alt_active = enabled;
    }

    fn beep(&mut self) {
        self.bell_count += 1;
    }
}
