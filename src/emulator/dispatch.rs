//! Token dispatch
//!
//! One arm per [`Token`] variant. Handlers translate the token and its
//! arguments into surface calls or transport responses.

use std::io::Read;

use super::{Emulator, EmulatorError};
use crate::config::Encoding;
use crate::core::{CharSet, CharSetSlot, DrawStyle, Rect, TerminalSurface};
use crate::parser::Token;

type DispatchResult = Result<(), EmulatorError>;

impl<S: TerminalSurface, R: Read> Emulator<S, R> {
    /// Apply one token
    pub(super) fn dispatch(&mut self, token: Token) -> DispatchResult {
        match token {
            Token::Char => self.put_char(),

            // C0 controls
            Token::Beep => self.surface.beep(),
            Token::Bs => self.cursor_left(1),
            Token::Ht => self.tab(),
            Token::Lf | Token::Vt | Token::Ff => {
                if self.newline_mode {
                    self.carriage_return();
                }
                self.index();
            }
            Token::Cr => self.carriage_return(),
            Token::CharsetG0 => self.surface.select_char_set(CharSetSlot::G0),
            Token::CharsetG1 => self.surface.select_char_set(CharSetSlot::G1),
            Token::Enq => {
                if !self.settings.answerback.is_empty() {
                    self.handle.send(&self.settings.answerback)?;
                }
            }
            Token::Eot | Token::Eof => {
                tracing::debug!(?token, "end of session");
                self.handle.signal_terminate();
            }
            Token::Nul | Token::Esc => {
                tracing::trace!(?token, "ignored");
            }
            Token::Etx | Token::Can | Token::Sub => {
                tracing::debug!(?token, "control not handled");
            }

            // Escapes
            Token::SaveCursor => self.saved_cursor = self.surface.cursor(),
            Token::RestoreCursor => self.restore_cursor(),
            Token::Index => self.index(),
            Token::NextLine => {
                self.carriage_return();
                self.index();
            }
            Token::ReverseIndex => self.reverse_index(),
            Token::Reset => self.reset(),
            Token::DecScreenAlignment => self.screen_alignment(),
            Token::CharsetG0Uk => self.surface.set_char_set(CharSetSlot::G0, CharSet::Uk),
            Token::CharsetG0Us => self.surface.set_char_set(CharSetSlot::G0, CharSet::Us),
            Token::CharsetG0Graphics => {
                self.surface.set_char_set(CharSetSlot::G0, CharSet::DecGraphics)
            }
            Token::CharsetG1Uk => self.surface.set_char_set(CharSetSlot::G1, CharSet::Uk),
            Token::CharsetG1Us => self.surface.set_char_set(CharSetSlot::G1, CharSet::Us),
            Token::CharsetG1Graphics => {
                self.surface.set_char_set(CharSetSlot::G1, CharSet::DecGraphics)
            }
            Token::SelectUtf8 => self.set_encoding(Encoding::Utf8),
            Token::SelectDefaultCharset => self.set_encoding(Encoding::Latin1),
            Token::TabSet
            | Token::TabClear
            | Token::ApplicationKeypad
            | Token::NumericKeypad
            | Token::SingleShift2
            | Token::SingleShift3
            | Token::WindowManipulation => {
                tracing::debug!(?token, args = ?self.tokenizer.args().ints(), "not implemented");
            }

            // Cursor motion
            Token::Up => {
                let n = self.tokenizer.args().count(0);
                let (x, y) = self.surface.cursor();
                self.goto(x, y.saturating_sub(n));
            }
            Token::Down => {
                let n = self.tokenizer.args().count(0);
                let (x, y) = self.surface.cursor();
                self.goto(x, y.saturating_add(n));
            }
            Token::Right => {
                let n = self.tokenizer.args().count(0);
                let (x, y) = self.surface.cursor();
                self.goto(x.saturating_add(n), y);
            }
            Token::Left => {
                let n = self.tokenizer.args().count(0);
                self.cursor_left(n);
            }
            Token::NextLineN => {
                let n = self.tokenizer.args().count(0);
                let (_, y) = self.surface.cursor();
                self.goto(0, y.saturating_add(n));
            }
            Token::PrevLineN => {
                let n = self.tokenizer.args().count(0);
                let (_, y) = self.surface.cursor();
                self.goto(0, y.saturating_sub(n));
            }
            Token::SetCursor => {
                let row = self.position_arg(0);
                let col = self.position_arg(1);
                self.goto(col, row);
            }
            Token::SetColumn => {
                let col = self.position_arg(0);
                let (_, y) = self.surface.cursor();
                self.goto(col, y);
            }
            Token::SetRow => {
                let row = self.position_arg(0);
                let (x, _) = self.surface.cursor();
                self.goto(x, row);
            }

            // Editing
            Token::LineErase => return self.erase_line(self.tokenizer.args().int(0)),
            Token::ScreenErase => return self.erase_screen(self.tokenizer.args().int(0)),
            Token::InsertLines => self.insert_lines(self.tokenizer.args().count(0)),
            Token::DeleteLines => self.delete_lines(self.tokenizer.args().count(0)),
            Token::InsertChars => self.insert_chars(self.tokenizer.args().count(0)),
            Token::DeleteChars => self.delete_chars(self.tokenizer.args().count(0)),
            Token::EraseChars => {
                let n = self.tokenizer.args().count(0);
                let (x, y) = self.surface.cursor();
                let x = x.min(self.cols - 1);
                self.surface
                    .clear_area(x, y, x.saturating_add(n).min(self.cols), y + 1);
            }
            Token::ScrollUp => {
                let n = self.tokenizer.args().count(0);
                self.surface
                    .scroll_region(self.region_y1, self.region_y2, n, false);
            }
            Token::ScrollDown => {
                let n = self.tokenizer.args().count(0);
                self.surface
                    .scroll_region(self.region_y1, self.region_y2, n, true);
            }
            Token::SetRegion => return self.set_region(),

            // Attributes and modes
            Token::SetFontStyle => return self.set_font_style(),
            Token::SetMode => return self.set_mode(true),
            Token::ResetMode => return self.set_mode(false),
            Token::DecSetMode => return self.set_dec_mode(true),
            Token::DecResetMode => return self.set_dec_mode(false),

            // Reports
            Token::DeviceStatus => return self.device_status(),
            Token::SendPrimaryDa => self.handle.send(&self.settings.primary_da)?,
            Token::SendSecondaryDa => self.handle.send(&self.settings.secondary_da)?,

            Token::XGraphMode => {
                let args = self.tokenizer.args();
                let kind = args.int(0);
                let text = args.string().unwrap_or("");
                tracing::debug!(kind, text, "graph mode");
                for listener in &mut self.listeners {
                    listener.on_graph_mode(kind, text);
                }
            }

            Token::Unknown | Token::Error => {
                tracing::warn!(?token, bytes = ?self.tokenizer.bytes(), "unrecognized input");
            }
        }
        Ok(())
    }

    /// 1-based argument converted to a 0-based position
    fn position_arg(&self, index: usize) -> usize {
        self.tokenizer.args().count(index) - 1
    }

    /// Move the cursor, clamped to the screen
    fn goto(&mut self, x: usize, y: usize) {
        self.surface
            .set_cursor(x.min(self.cols - 1), y.min(self.rows - 1));
    }

    fn cursor_left(&mut self, n: usize) {
        let (x, y) = self.surface.cursor();
        self.goto(x.min(self.cols - 1).saturating_sub(n), y);
    }

    fn carriage_return(&mut self) {
        let (_, y) = self.surface.cursor();
        self.surface.set_cursor(0, y);
    }

    fn tab(&mut self) {
        let (x, y) = self.surface.cursor();
        let tab = self.settings.tab_size;
        self.goto((x / tab + 1) * tab, y);
    }

    /// Row below `y`, scrolling the region up when `y` is on or past its
    /// last row
    fn next_row(&mut self, y: usize) -> usize {
        if y + 1 >= self.region_y2 {
            self.surface
                .scroll_region(self.region_y1, self.region_y2, 1, false);
            y
        } else {
            y + 1
        }
    }

    fn index(&mut self) {
        let (x, y) = self.surface.cursor();
        let y = self.next_row(y);
        self.surface.set_cursor(x, y);
    }

    fn reverse_index(&mut self) {
        let (x, y) = self.surface.cursor();
        if y <= self.region_y1 {
            self.surface
                .scroll_region(self.region_y1, self.region_y2, 1, true);
        } else {
            self.surface.set_cursor(x, y - 1);
        }
    }

    fn restore_cursor(&mut self) {
        let (x, y) = self.saved_cursor;
        self.surface
            .set_cursor(x.min(self.cols), y.min(self.rows - 1));
    }

    /// Write the current CHAR at the cursor.
    ///
    /// A cursor parked at `x == cols` wraps first (or overwrites the last
    /// column when wraparound is off).
    fn put_char(&mut self) {
        let (mut x, mut y) = self.surface.cursor();
        if x >= self.cols {
            if self.wrap_around {
                x = 0;
                y = self.next_row(y);
            } else {
                x = self.cols - 1;
            }
        }
        self.surface.put_char(self.tokenizer.bytes(), x, y);
        self.surface.set_cursor(x + 1, y);
    }

    fn erase_line(&mut self, mode: i32) -> DispatchResult {
        let (x, y) = self.surface.cursor();
        let x = x.min(self.cols);
        match mode {
            0 => self.surface.clear_area(x, y, self.cols, y + 1),
            1 => self
                .surface
                .clear_area(0, y, (x + 1).min(self.cols), y + 1),
            2 => self.surface.clear_area(0, y, self.cols, y + 1),
            _ => return Err(EmulatorError::Unsupported("line erase mode", mode)),
        }
        Ok(())
    }

    fn erase_screen(&mut self, mode: i32) -> DispatchResult {
        let (x, y) = self.surface.cursor();
        let x = x.min(self.cols);
        match mode {
            0 => {
                self.surface.clear_area(x, y, self.cols, y + 1);
                self.surface.clear_area(0, y + 1, self.cols, self.rows);
            }
            1 => {
                self.surface.clear_area(0, 0, self.cols, y);
                self.surface
                    .clear_area(0, y, (x + 1).min(self.cols), y + 1);
            }
            2 => {
                self.surface.clear_area(0, 0, self.cols, self.rows);
                self.surface.set_cursor(0, 0);
            }
            _ => return Err(EmulatorError::Unsupported("screen erase mode", mode)),
        }
        Ok(())
    }

    fn in_region(&self, y: usize) -> bool {
        y >= self.region_y1 && y < self.region_y2
    }

    fn insert_lines(&mut self, n: usize) {
        let (_, y) = self.surface.cursor();
        if self.in_region(y) {
            self.surface.scroll_region(y, self.region_y2, n, true);
            self.surface.set_cursor(0, y);
        }
    }

    fn delete_lines(&mut self, n: usize) {
        let (_, y) = self.surface.cursor();
        if self.in_region(y) {
            self.surface.scroll_region(y, self.region_y2, n, false);
            self.surface.set_cursor(0, y);
        }
    }

    fn insert_chars(&mut self, n: usize) {
        let (x, y) = self.surface.cursor();
        if x >= self.cols {
            return;
        }
        let n = n.min(self.cols - x);
        if x + n < self.cols {
            self.surface
                .move_area(Rect::new(x, y, self.cols - n, y + 1), x + n, y);
        }
        self.surface.clear_area(x, y, x + n, y + 1);
    }

    fn delete_chars(&mut self, n: usize) {
        let (x, y) = self.surface.cursor();
        if x >= self.cols {
            return;
        }
        let n = n.min(self.cols - x);
        if x + n < self.cols {
            self.surface
                .move_area(Rect::new(x + n, y, self.cols, y + 1), x, y);
        }
        self.surface.clear_area(self.cols - n, y, self.cols, y + 1);
    }

    fn set_region(&mut self) -> DispatchResult {
        let args = self.tokenizer.args();
        if args.is_empty() {
            self.region_y1 = 0;
            self.region_y2 = self.rows;
        } else {
            let top = args.int_or(0, 1);
            let bottom = match args.int(1) {
                0 => i32::try_from(self.rows).unwrap_or(i32::MAX),
                bottom => bottom,
            };
            let valid = top >= 1
                && bottom > top
                && usize::try_from(bottom).is_ok_and(|b| b <= self.rows);
            if !valid {
                return Err(EmulatorError::InvalidRegion {
                    top,
                    bottom,
                    rows: self.rows,
                });
            }
            self.region_y1 = (top - 1) as usize;
            self.region_y2 = bottom as usize;
        }
        self.surface.set_cursor(0, 0);
        Ok(())
    }

    fn set_font_style(&mut self) -> DispatchResult {
        let args = self.tokenizer.args();
        let codes = args.ints();
        if codes.is_empty() {
            self.style = DrawStyle::NONE;
            self.surface.set_draw_style(DrawStyle::NONE);
            self.surface.set_draw_foreground(None);
            self.surface.set_draw_background(None);
            return Ok(());
        }

        if let &[selector @ (38 | 48), _, color] = codes {
            let color = u8::try_from(color)
                .map_err(|_| EmulatorError::Unsupported("SGR color index", color))?;
            if selector == 38 {
                self.surface.set_draw_foreground(Some(color));
            } else {
                self.surface.set_draw_background(Some(color));
            }
            return Ok(());
        }

        for &code in codes {
            match code {
                0 => {
                    self.style = DrawStyle::NONE;
                    self.surface.set_draw_style(DrawStyle::NONE);
                    self.surface.set_draw_foreground(None);
                    self.surface.set_draw_background(None);
                }
                1 | 4 | 5 | 7 | 8 => {
                    let added = match code {
                        1 => DrawStyle::BOLD,
                        4 => DrawStyle::UNDERLINE,
                        5 => DrawStyle::BLINK,
                        7 => DrawStyle::INVERSE,
                        _ => DrawStyle::HIDDEN,
                    };
                    self.style = self.style.union(added);
                    self.surface.add_draw_style(added);
                }
                22 | 24 | 25 | 27 | 28 => {
                    match code {
                        22 => self.style.bold = false,
                        24 => self.style.underline = false,
                        25 => self.style.blink = false,
                        27 => self.style.inverse = false,
                        _ => self.style.hidden = false,
                    }
                    self.surface.set_draw_style(self.style);
                }
                30..=37 => self.surface.set_draw_foreground(Some((code - 30) as u8)),
                39 => self.surface.set_draw_foreground(None),
                40..=47 => self.surface.set_draw_background(Some((code - 40) as u8)),
                49 => self.surface.set_draw_background(None),
                90..=97 => self.surface.set_draw_foreground(Some((code - 90 + 8) as u8)),
                100..=107 => self.surface.set_draw_background(Some((code - 100 + 8) as u8)),
                38 | 48 => return Err(EmulatorError::Unsupported("SGR extended color form", code)),
                other => tracing::debug!(code = other, "SGR attribute not handled"),
            }
        }
        Ok(())
    }

    /// ANSI modes (`CSI Pm h` / `CSI Pm l`)
    fn set_mode(&mut self, enable: bool) -> DispatchResult {
        let mode = self.tokenizer.args().int(0);
        match mode {
            20 => self.newline_mode = enable,
            4 => return Err(EmulatorError::Unsupported("insert mode", mode)),
            _ => return Err(EmulatorError::Unsupported("ANSI mode", mode)),
        }
        Ok(())
    }

    /// DEC private modes (`CSI ? Pm h` / `CSI ? Pm l`)
    fn set_dec_mode(&mut self, enable: bool) -> DispatchResult {
        let mode = self.tokenizer.args().int(0);
        match mode {
            1 => self.handle.set_application_cursor_keys(enable),
            3 => self.switch_columns(if enable { 132 } else { 80 }),
            4 => tracing::debug!(enable, "smooth scroll acknowledged"),
            7 => {
                self.wrap_around = enable;
                self.surface.set_wrap_around(enable);
            }
            12 => self.surface.set_cursor_blink(enable),
            25 => self.surface.set_enable_cursor(enable),
            45 | 47 | 1047 => self.surface.set_alt_screen_buffer(enable),
            1048 => {
                if enable {
                    self.saved_cursor = self.surface.cursor();
                } else {
                    self.restore_cursor();
                }
            }
            1049 => {
                if enable {
                    self.saved_cursor = self.surface.cursor();
                    self.surface.set_alt_screen_buffer(true);
                    self.surface.clear_area(0, 0, self.cols, self.rows);
                } else {
                    self.surface.set_alt_screen_buffer(false);
                    self.restore_cursor();
                }
            }
            _ => return Err(EmulatorError::Unsupported("DEC private mode", mode)),
        }
        Ok(())
    }

    /// DECCOLM: change width, clear, reset the region and home
    fn switch_columns(&mut self, cols: usize) {
        self.surface.set_columns(cols);
        let rows = self.rows;
        self.update_region(cols, rows, 0, rows);
        self.surface.clear_area(0, 0, cols, rows);
        self.surface.set_cursor(0, 0);
        if let Err(e) = self.handle.resize_transport(cols, rows) {
            tracing::warn!("failed to resize transport: {}", e);
        }
        for listener in &mut self.listeners {
            listener.on_resize(cols, rows);
        }
    }

    fn device_status(&mut self) -> DispatchResult {
        match self.tokenizer.args().int(0) {
            5 => self.handle.send(b"\x1b[0n")?,
            6 => {
                let (x, y) = self.surface.cursor();
                let report = format!("\x1b[{};{}R", y + 1, x.min(self.cols - 1) + 1);
                self.handle.send(report.as_bytes())?;
            }
            other => return Err(EmulatorError::Unsupported("device status request", other)),
        }
        Ok(())
    }

    fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
        self.tokenizer.set_utf8(encoding == Encoding::Utf8);
    }

    /// Full reset (RIS)
    fn reset(&mut self) {
        self.style = DrawStyle::NONE;
        self.surface.set_draw_style(DrawStyle::NONE);
        self.surface.set_draw_foreground(None);
        self.surface.set_draw_background(None);
        self.surface.set_char_set(CharSetSlot::G0, CharSet::Us);
        self.surface.set_char_set(CharSetSlot::G1, CharSet::Us);
        self.surface.select_char_set(CharSetSlot::G0);
        self.surface.set_alt_screen_buffer(false);
        self.surface.set_enable_cursor(true);
        self.surface.set_wrap_around(true);
        self.wrap_around = true;
        self.newline_mode = false;
        self.handle.set_application_cursor_keys(false);
        self.region_y1 = 0;
        self.region_y2 = self.rows;
        self.saved_cursor = (0, 0);
        self.surface.clear_area(0, 0, self.cols, self.rows);
        self.surface.set_cursor(0, 0);
    }

    /// DECALN: fill the screen with `E`
    fn screen_alignment(&mut self) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.surface.put_char(b"E", x, y);
            }
        }
        self.surface.set_cursor(0, 0);
    }
}
