//! Shared helpers for integration tests

#![allow(dead_code)]

use std::io::{self, Cursor, Read};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use vterm_core::core::{CharSet, CharSetSlot, DrawStyle, Rect};
use vterm_core::{CancelToken, Config, Emulator, MemorySink, Screen, TerminalSurface};

/// A surface call, as seen by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    SetCursor(usize, usize),
    PutChar(Vec<u8>, usize, usize),
    ClearArea(usize, usize, usize, usize),
    MoveArea(Rect, usize, usize),
    ScrollRegion { y1: usize, y2: usize, lines: usize, down: bool },
    SetCharSet(CharSetSlot, CharSet),
    SelectCharSet(CharSetSlot),
    SetDrawStyle(DrawStyle),
    AddDrawStyle(DrawStyle),
    SetForeground(Option<u8>),
    SetBackground(Option<u8>),
    SetColumns(usize),
    SetSize(usize, usize),
    SetWrapAround(bool),
    SetEnableCursor(bool),
    SetCursorBlink(bool),
    SetAltScreen(bool),
    Beep,
}

/// A [`Screen`] that logs every mutating call made on it
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub screen: Screen,
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            screen: Screen::new(cols, rows),
            calls: Vec::new(),
        }
    }

    pub fn scroll_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::ScrollRegion { .. }))
            .count()
    }

    /// Calls that change the grid or the cursor
    pub fn mutations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    SurfaceCall::SetCursor(..)
                        | SurfaceCall::PutChar(..)
                        | SurfaceCall::ClearArea(..)
                        | SurfaceCall::MoveArea(..)
                        | SurfaceCall::ScrollRegion { .. }
                )
            })
            .count()
    }
}

impl TerminalSurface for RecordingSurface {
    fn column_count(&self) -> usize {
        self.screen.column_count()
    }

    fn row_count(&self) -> usize {
        self.screen.row_count()
    }

    fn cursor(&self) -> (usize, usize) {
        self.screen.cursor()
    }

    fn set_cursor(&mut self, x: usize, y: usize) {
        self.calls.push(SurfaceCall::SetCursor(x, y));
        self.screen.set_cursor(x, y);
    }

    fn put_char(&mut self, bytes: &[u8], x: usize, y: usize) {
        self.calls.push(SurfaceCall::PutChar(bytes.to_vec(), x, y));
        self.screen.put_char(bytes, x, y);
    }

    fn clear_area(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        self.calls.push(SurfaceCall::ClearArea(x1, y1, x2, y2));
        self.screen.clear_area(x1, y1, x2, y2);
    }

    fn move_area(&mut self, src: Rect, dst_x: usize, dst_y: usize) {
        self.calls.push(SurfaceCall::MoveArea(src, dst_x, dst_y));
        self.screen.move_area(src, dst_x, dst_y);
    }

    fn scroll_region(&mut self, y1: usize, y2: usize, lines: usize, down: bool) {
        self.calls.push(SurfaceCall::ScrollRegion { y1, y2, lines, down });
        self.screen.scroll_region(y1, y2, lines, down);
    }

    fn set_char_set(&mut self, slot: CharSetSlot, set: CharSet) {
        self.calls.push(SurfaceCall::SetCharSet(slot, set));
        self.screen.set_char_set(slot, set);
    }

    fn select_char_set(&mut self, slot: CharSetSlot) {
        self.calls.push(SurfaceCall::SelectCharSet(slot));
        self.screen.select_char_set(slot);
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.calls.push(SurfaceCall::SetDrawStyle(style));
        self.screen.set_draw_style(style);
    }

    fn add_draw_style(&mut self, style: DrawStyle) {
        self.calls.push(SurfaceCall::AddDrawStyle(style));
        self.screen.add_draw_style(style);
    }

    fn set_draw_foreground(&mut self, color: Option<u8>) {
        self.calls.push(SurfaceCall::SetForeground(color));
        self.screen.set_draw_foreground(color);
    }

    fn set_draw_background(&mut self, color: Option<u8>) {
        self.calls.push(SurfaceCall::SetBackground(color));
        self.screen.set_draw_background(color);
    }

    fn set_columns(&mut self, columns: usize) {
        self.calls.push(SurfaceCall::SetColumns(columns));
        self.screen.set_columns(columns);
    }

    fn set_size(&mut self, cols: usize, rows: usize) {
        self.calls.push(SurfaceCall::SetSize(cols, rows));
        self.screen.set_size(cols, rows);
    }

    fn set_wrap_around(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetWrapAround(enabled));
        self.screen.set_wrap_around(enabled);
    }

    fn set_enable_cursor(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetEnableCursor(enabled));
        self.screen.set_enable_cursor(enabled);
    }

    fn set_cursor_blink(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetCursorBlink(enabled));
        self.screen.set_cursor_blink(enabled);
    }

    fn set_alt_screen_buffer(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetAltScreen(enabled));
        self.screen.set_alt_screen_buffer(enabled);
    }

    fn beep(&mut self) {
        self.calls.push(SurfaceCall::Beep);
        self.screen.beep();
    }
}

pub type TestEmulator = Emulator<RecordingSurface, Cursor<Vec<u8>>>;

/// Emulator over a recording surface, reading `input`
pub fn emulator(cols: usize, rows: usize, input: &[u8]) -> (TestEmulator, MemorySink) {
    let sink = MemorySink::new();
    let emulator = Emulator::new(
        RecordingSurface::new(cols, rows),
        Cursor::new(input.to_vec()),
        sink.clone(),
        &Config::default(),
    );
    (emulator, sink)
}

/// Run `input` to completion and return the surface and everything sent back
pub fn run_session(cols: usize, rows: usize, input: &[u8]) -> (RecordingSurface, MemorySink) {
    let (mut emulator, sink) = emulator(cols, rows, input);
    emulator.start().expect("session failed");
    (emulator.into_surface(), sink)
}

/// Byte source fed from a channel; reports end of input once the sender
/// hangs up or `cancel` is tripped
pub struct ChannelReader {
    rx: Receiver<Vec<u8>>,
    cancel: CancelToken,
    pending: Cursor<Vec<u8>>,
}

impl ChannelReader {
    pub fn new(rx: Receiver<Vec<u8>>, cancel: CancelToken) -> Self {
        Self {
            rx,
            cancel,
            pending: Cursor::new(Vec::new()),
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.pending.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            if self.cancel.is_cancelled() {
                return Ok(0);
            }
            match self.rx.recv_timeout(Duration::from_millis(10)) {
                Ok(chunk) => self.pending = Cursor::new(chunk),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }
    }
}
