//! Pull-based tokenizer
//!
//! Reads bytes from a blocking source and matches them incrementally against
//! a [`TokenCatalog`]. Each call to [`Tokenizer::next_token`] returns exactly
//! one token. The raw bytes and any parsed [`Arguments`] for that token stay
//! available until the next call.
//!
//! # Recovery
//!
//! - A second ESC inside a sequence yields [`Token::Error`] and restarts
//!   scanning at the second ESC.
//! - A C0 control inside a sequence is returned immediately. The interrupted
//!   bytes go back onto the unget buffer and are scanned again on the next
//!   call. Consecutive replays are bounded by
//!   [`TokenizerOptions::max_sequence_replays`].
//! - End of input inside a sequence yields [`Token::Error`].

use std::collections::VecDeque;
use std::io::{self, Read};

use super::args::{Arguments, IntListBuilder};
use super::catalog::TokenCatalog;
use super::token::{MatchOption, Token};

const ESC: u8 = 0x1B;
const READ_CHUNK: usize = 4096;

/// Tokenizer behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Read UTF-8 continuation bytes into a single CHAR token
    pub utf8: bool,
    /// Treat bytes >= 0x80 as non-printable
    pub strict_7bit: bool,
    /// Consecutive abort-and-replay cycles before the pending bytes
    /// are surfaced as an error
    pub max_sequence_replays: u32,
    /// Longest graph-mode string kept; the rest is discarded
    pub max_graph_mode_len: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            utf8: true,
            strict_7bit: false,
            max_sequence_replays: 8,
            max_graph_mode_len: 1024,
        }
    }
}

/// Stateful scanner over one byte stream
pub struct Tokenizer<R> {
    source: R,
    chunk: Box<[u8]>,
    chunk_pos: usize,
    chunk_len: usize,
    source_done: bool,
    /// Bytes pushed back for re-reading, consumed before `source`
    unget: VecDeque<u8>,
    catalog: &'static TokenCatalog,
    options: TokenizerOptions,
    /// Bytes matched against the catalog (no integer lists)
    pattern: Vec<u8>,
    /// Every byte of the current token
    raw: Vec<u8>,
    args: Arguments,
    replays: u32,
}

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer over `source` using the standard catalog
    pub fn new(source: R) -> Self {
        Self::with_options(source, TokenizerOptions::default())
    }

    pub fn with_options(source: R, options: TokenizerOptions) -> Self {
        Self::with_catalog(source, TokenCatalog::standard(), options)
    }

    pub fn with_catalog(source: R, catalog: &'static TokenCatalog, options: TokenizerOptions) -> Self {
        Self {
            source,
            chunk: vec![0u8; READ_CHUNK].into_boxed_slice(),
            chunk_pos: 0,
            chunk_len: 0,
            source_done: false,
            unget: VecDeque::with_capacity(16),
            catalog,
            options,
            pattern: Vec::with_capacity(16),
            raw: Vec::with_capacity(16),
            args: Arguments::new(),
            replays: 0,
        }
    }

    /// Raw bytes of the last token
    pub fn bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Arguments of the last token
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// Switch multi-byte character reading on or off
    pub fn set_utf8(&mut self, utf8: bool) {
        self.options.utf8 = utf8;
    }

    /// Number of bytes waiting to be re-read
    pub fn pending(&self) -> usize {
        self.unget.len()
    }

    /// Scan the next token.
    ///
    /// Only I/O failures of the byte source are returned as errors. Malformed
    /// input is reported in-band as [`Token::Error`] or [`Token::Unknown`].
    pub fn next_token(&mut self) -> io::Result<Token> {
        self.pattern.clear();
        self.raw.clear();
        self.args.clear();
        let mut ints_parsed = false;

        loop {
            let Some(byte) = self.read_byte()? else {
                return Ok(self.end_of_input());
            };

            if byte == 0x00 {
                tracing::trace!("discarding NUL");
                continue;
            }

            let in_sequence = !self.pattern.is_empty();

            if let Some(control) = Token::from_control_byte(byte) {
                if !in_sequence && control != Token::Esc {
                    self.raw.push(byte);
                    return Ok(self.finish(control));
                }
                if in_sequence && control == Token::Esc {
                    tracing::warn!(bytes = ?self.raw, "ESC inside escape sequence, restarting");
                    self.unread(&[byte]);
                    return Ok(self.finish(Token::Error));
                }
                if in_sequence {
                    return Ok(self.abort_sequence(byte, control));
                }
            }

            if !in_sequence && self.is_printable(byte) {
                return self.read_char(byte);
            }

            self.raw.push(byte);
            self.pattern.push(byte);

            if let Some(pattern) = self.catalog.find_full_match(&self.pattern) {
                let token = pattern.token();
                if pattern.option() == MatchOption::GraphMode {
                    return self.read_graph_mode(token);
                }
                if token.is_terminator() {
                    return Ok(self.finish(token));
                }
                continue;
            }

            if let Some(pattern) = self.catalog.find_exact_prefix(&self.pattern) {
                if pattern.option() == MatchOption::IntegerList && !ints_parsed {
                    ints_parsed = self.read_int_list()?;
                }
                continue;
            }

            if self.catalog.partial_prefixes(&self.pattern).next().is_some() {
                continue;
            }

            return self.unmatched();
        }
    }

    fn finish(&mut self, token: Token) -> Token {
        self.replays = 0;
        token
    }

    fn is_printable(&self, byte: u8) -> bool {
        (0x20..=0x7E).contains(&byte) || (byte >= 0x80 && !self.options.strict_7bit)
    }

    /// A C0 control interrupted a sequence: return the control now and
    /// replay the interrupted bytes on the next call
    fn abort_sequence(&mut self, byte: u8, control: Token) -> Token {
        self.replays += 1;
        if self.replays > self.options.max_sequence_replays {
            tracing::warn!(
                bytes = ?self.raw,
                replays = self.replays,
                "sequence interrupted too many times, dropping it"
            );
            self.unread(&[byte]);
            return self.finish(Token::Error);
        }

        tracing::debug!(bytes = ?self.raw, ?control, "control interrupted escape sequence");
        let pending = std::mem::take(&mut self.raw);
        self.unread(&pending);
        self.pattern.clear();
        self.args.clear();
        self.raw.push(byte);
        control
    }

    fn end_of_input(&mut self) -> Token {
        if self.raw.is_empty() {
            return Token::Eof;
        }
        tracing::warn!(bytes = ?self.raw, "input ended inside escape sequence");
        self.finish(Token::Error)
    }

    fn read_char(&mut self, lead: u8) -> io::Result<Token> {
        self.raw.push(lead);
        let continuation = if self.options.utf8 {
            utf8_continuation_len(lead)
        } else {
            0
        };
        for _ in 0..continuation {
            match self.read_byte()? {
                Some(byte) if (0x80..=0xBF).contains(&byte) => self.raw.push(byte),
                Some(byte) => {
                    self.unread(&[byte]);
                    break;
                }
                None => break,
            }
        }
        Ok(self.finish(Token::Char))
    }

    /// Consume a `;`-separated integer list if one follows.
    ///
    /// Returns whether any list bytes were consumed.
    fn read_int_list(&mut self) -> io::Result<bool> {
        let mut builder = IntListBuilder::default();
        let mut consumed = false;
        while let Some(byte) = self.read_byte()? {
            if builder.feed(byte, &mut self.args) {
                self.raw.push(byte);
                consumed = true;
            } else {
                self.unread(&[byte]);
                break;
            }
        }
        builder.finish(&mut self.args);
        if self.args.dropped() > 0 {
            tracing::debug!(dropped = self.args.dropped(), "integer list exceeds capacity");
        }
        Ok(consumed)
    }

    /// Parse `<int> <delim> <string> <terminator>` after the prefix.
    ///
    /// Body bytes beyond `max_graph_mode_len` are counted, not kept. An ESC
    /// that does not start `ESC \\` ends the string and is scanned again.
    fn read_graph_mode(&mut self, token: Token) -> io::Result<Token> {
        let limit = self.options.max_graph_mode_len;
        let mut kind: i32 = 0;
        let mut text = Vec::new();
        let mut dropped = 0usize;

        let mut next = loop {
            let Some(byte) = self.read_byte()? else {
                return Ok(self.end_of_input());
            };
            if !byte.is_ascii_digit() {
                break byte;
            }
            self.keep_graph_byte(byte, &mut dropped);
            kind = kind.saturating_mul(10).saturating_add(i32::from(byte - b'0'));
        };

        // A printable delimiter precedes the string; anything else terminates
        if self.is_printable(next) {
            self.keep_graph_byte(next, &mut dropped);
            loop {
                let Some(byte) = self.read_byte()? else {
                    return Ok(self.end_of_input());
                };
                if !self.is_printable(byte) {
                    next = byte;
                    break;
                }
                self.keep_graph_byte(byte, &mut dropped);
                if text.len() < limit {
                    text.push(byte);
                }
            }
        }

        // String terminator is ESC \
        if next == ESC {
            match self.read_byte()? {
                Some(b'\\') => self.raw.extend_from_slice(&[ESC, b'\\']),
                Some(other) => self.unread(&[ESC, other]),
                None => self.raw.push(ESC),
            }
        } else {
            self.raw.push(next);
        }

        if dropped > 0 {
            tracing::warn!(limit, dropped, "graph mode string truncated");
        }

        self.args.push_int(kind);
        self.args.set_string(String::from_utf8_lossy(&text).into_owned());
        Ok(self.finish(token))
    }

    /// Keep a graph-mode body byte in the raw span while under the limit
    fn keep_graph_byte(&mut self, byte: u8, dropped: &mut usize) {
        if self.raw.len() < self.options.max_graph_mode_len {
            self.raw.push(byte);
        } else {
            *dropped += 1;
        }
    }

    /// No catalog pattern can complete the scanned bytes
    fn unmatched(&mut self) -> io::Result<Token> {
        // Swallow the rest of an unrecognized CSI up to its final byte
        if self.pattern.starts_with(&[ESC, b'[']) {
            let last = self.pattern.last().copied().unwrap_or(0);
            let mut done = self.pattern.len() > 2 && (0x40..=0x7E).contains(&last);
            while !done {
                match self.read_byte()? {
                    Some(byte @ 0x20..=0x3F) => self.raw.push(byte),
                    Some(byte @ 0x40..=0x7E) => {
                        self.raw.push(byte);
                        done = true;
                    }
                    Some(byte) => {
                        self.unread(&[byte]);
                        done = true;
                    }
                    None => done = true,
                }
            }
        }

        tracing::warn!(bytes = ?self.raw, "unknown sequence");
        Ok(self.finish(Token::Unknown))
    }

    /// Push bytes back so the next reads return them in order
    fn unread(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.unget.push_front(byte);
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.unget.pop_front() {
            return Ok(Some(byte));
        }
        if self.chunk_pos < self.chunk_len {
            let byte = self.chunk[self.chunk_pos];
            self.chunk_pos += 1;
            return Ok(Some(byte));
        }
        if self.source_done {
            return Ok(None);
        }
        loop {
            match self.source.read(&mut self.chunk) {
                Ok(0) => {
                    self.source_done = true;
                    return Ok(None);
                }
                Ok(n) => {
                    self.chunk_len = n;
                    self.chunk_pos = 1;
                    return Ok(Some(self.chunk[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Continuation bytes announced by a UTF-8 lead byte
fn utf8_continuation_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 1,
        0xE0..=0xEF => 2,
        0xF0..=0xF7 => 3,
        _ => 0,
    }
}
