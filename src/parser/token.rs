//! Semantic tokens
//!
//! Every byte sequence the tokenizer recognizes is reduced to one of these
//! variants. The set is closed so the emulator can dispatch on it with an
//! exhaustive `match`.

use serde::{Deserialize, Serialize};

/// How a catalog pattern consumes bytes beyond its literal prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchOption {
    /// Literal prefix, optionally followed by the terminator
    #[default]
    None,
    /// Optional `;`-separated decimal list between prefix and terminator
    IntegerList,
    /// `<int> <delimiter> <printable string> <non-printable terminator>`
    GraphMode,
}

/// A semantic unit produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    // C0 controls
    Nul,
    Etx,
    Eot,
    Enq,
    Beep,
    Bs,
    Ht,
    Lf,
    Vt,
    Ff,
    Cr,
    Can,
    Sub,
    Esc,
    /// SI: select G0 into GL
    CharsetG0,
    /// SO: select G1 into GL
    CharsetG1,

    // Two and three character escapes
    SaveCursor,
    RestoreCursor,
    Index,
    NextLine,
    ReverseIndex,
    TabSet,
    ApplicationKeypad,
    NumericKeypad,
    Reset,
    SingleShift2,
    SingleShift3,
    DecScreenAlignment,
    CharsetG0Uk,
    CharsetG0Us,
    CharsetG0Graphics,
    CharsetG1Uk,
    CharsetG1Us,
    CharsetG1Graphics,
    SelectUtf8,
    SelectDefaultCharset,

    // CSI commands
    Up,
    Down,
    Right,
    Left,
    NextLineN,
    PrevLineN,
    SetColumn,
    SetRow,
    SetCursor,
    ScreenErase,
    LineErase,
    InsertLines,
    DeleteLines,
    InsertChars,
    DeleteChars,
    EraseChars,
    ScrollUp,
    ScrollDown,
    SetRegion,
    SetFontStyle,
    SetMode,
    ResetMode,
    DecSetMode,
    DecResetMode,
    DeviceStatus,
    SendPrimaryDa,
    SendSecondaryDa,
    TabClear,
    WindowManipulation,

    // OSC
    XGraphMode,

    /// One printable or 8-bit character (raw bytes in the tokenizer)
    Char,

    Unknown,
    Error,
    Eof,
}

impl Token {
    /// Whether a full match on this token completes the sequence.
    ///
    /// Only a bare ESC keeps the tokenizer scanning.
    pub fn is_terminator(self) -> bool {
        !matches!(self, Token::Esc)
    }

    /// Whether this token is one of the single-byte C0 controls.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Token::Nul
                | Token::Etx
                | Token::Eot
                | Token::Enq
                | Token::Beep
                | Token::Bs
                | Token::Ht
                | Token::Lf
                | Token::Vt
                | Token::Ff
                | Token::Cr
                | Token::Can
                | Token::Sub
                | Token::Esc
                | Token::CharsetG0
                | Token::CharsetG1
        )
    }

    /// Map a recognized C0 control byte to its token.
    ///
    /// NUL is deliberately absent: the tokenizer discards it before
    /// classification.
    pub fn from_control_byte(byte: u8) -> Option<Token> {
        let token = match byte {
            0x03 => Token::Etx,
            0x04 => Token::Eot,
            0x05 => Token::Enq,
            0x07 => Token::Beep,
            0x08 => Token::Bs,
            0x09 => Token::Ht,
            0x0A => Token::Lf,
            0x0B => Token::Vt,
            0x0C => Token::Ff,
            0x0D => Token::Cr,
            0x0E => Token::CharsetG1,
            0x0F => Token::CharsetG0,
            0x18 => Token::Can,
            0x1A => Token::Sub,
            0x1B => Token::Esc,
            _ => return None,
        };
        Some(token)
    }
}
