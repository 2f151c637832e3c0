//! Token catalog
//!
//! An ordered list of byte patterns, each mapping to a [`Token`]. Lookups are
//! linear scans in declaration order, so the first pattern that matches wins
//! and any later duplicate is unreachable.
//!
//! A pattern's *sequence* is its literal prefix followed by its terminator
//! byte, if it has one. Integer lists and graph-mode strings are consumed by
//! the tokenizer between prefix and terminator and never appear in the
//! sequence.

use std::sync::OnceLock;

use super::token::{MatchOption, Token};

const ESC: u8 = 0x1B;

/// A static pattern definition, compiled into a [`TokenPattern`]
#[derive(Debug, Clone, Copy)]
pub struct PatternDef {
    pub prefix: &'static [u8],
    pub option: MatchOption,
    pub terminator: Option<u8>,
    pub token: Token,
    pub description: &'static str,
}

impl PatternDef {
    /// A literal byte sequence
    pub const fn literal(prefix: &'static [u8], token: Token, description: &'static str) -> Self {
        Self {
            prefix,
            option: MatchOption::None,
            terminator: None,
            token,
            description,
        }
    }

    /// A prefix followed by an optional integer list and a terminator byte
    pub const fn with_args(
        prefix: &'static [u8],
        terminator: u8,
        token: Token,
        description: &'static str,
    ) -> Self {
        Self {
            prefix,
            option: MatchOption::IntegerList,
            terminator: Some(terminator),
            token,
            description,
        }
    }

    /// A prefix followed by a graph-mode `<int>;<string><terminator>` body
    pub const fn graph_mode(prefix: &'static [u8], token: Token, description: &'static str) -> Self {
        Self {
            prefix,
            option: MatchOption::GraphMode,
            terminator: None,
            token,
            description,
        }
    }
}

/// A compiled catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPattern {
    sequence: Vec<u8>,
    prefix_len: usize,
    option: MatchOption,
    terminator: Option<u8>,
    token: Token,
    description: &'static str,
}

impl TokenPattern {
    fn compile(def: &PatternDef) -> Self {
        let mut sequence = def.prefix.to_vec();
        if let Some(terminator) = def.terminator {
            sequence.push(terminator);
        }
        Self {
            sequence,
            prefix_len: def.prefix.len(),
            option: def.option,
            terminator: def.terminator,
            token: def.token,
            description: def.description,
        }
    }

    /// Prefix followed by terminator
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn prefix(&self) -> &[u8] {
        &self.sequence[..self.prefix_len]
    }

    pub fn option(&self) -> MatchOption {
        self.option
    }

    pub fn terminator(&self) -> Option<u8> {
        self.terminator
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Ordered, immutable pattern list
#[derive(Debug, Clone)]
pub struct TokenCatalog {
    patterns: Vec<TokenPattern>,
}

impl TokenCatalog {
    /// Compile a catalog from definitions, preserving their order
    pub fn compile(defs: &[PatternDef]) -> Self {
        Self {
            patterns: defs.iter().map(TokenPattern::compile).collect(),
        }
    }

    /// The process-wide VT100/xterm catalog, compiled on first use
    pub fn standard() -> &'static TokenCatalog {
        static CATALOG: OnceLock<TokenCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| TokenCatalog::compile(STANDARD_PATTERNS))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[TokenPattern] {
        &self.patterns
    }

    /// First pattern whose full sequence equals `bytes`
    pub fn find_full_match(&self, bytes: &[u8]) -> Option<&TokenPattern> {
        self.patterns.iter().find(|p| p.sequence == bytes)
    }

    /// First pattern whose prefix equals `bytes` and whose sequence is
    /// strictly longer, i.e. a terminator is still expected
    pub fn find_exact_prefix(&self, bytes: &[u8]) -> Option<&TokenPattern> {
        self.patterns
            .iter()
            .find(|p| p.sequence.len() > bytes.len() && p.prefix() == bytes)
    }

    /// All patterns whose sequence strictly extends `bytes`
    pub fn find_partial_prefixes(&self, bytes: &[u8]) -> Vec<&TokenPattern> {
        self.patterns
            .iter()
            .filter(|p| p.sequence.len() > bytes.len() && p.sequence.starts_with(bytes))
            .collect()
    }

    /// Lazy form of [`find_partial_prefixes`](Self::find_partial_prefixes)
    pub fn partial_prefixes<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> impl Iterator<Item = &'a TokenPattern> + 'a {
        self.patterns
            .iter()
            .filter(move |p| p.sequence.len() > bytes.len() && p.sequence.starts_with(bytes))
    }
}

impl Default for TokenCatalog {
    fn default() -> Self {
        Self::compile(STANDARD_PATTERNS)
    }
}

const CSI: &[u8] = &[ESC, b'['];
const CSI_DEC: &[u8] = &[ESC, b'[', b'?'];
const CSI_SECONDARY: &[u8] = &[ESC, b'[', b'>'];

use PatternDef as P;

/// The standard VT100/xterm pattern table.
///
/// Order matters. `ESC [` entries must keep integer-list patterns ahead of
/// anything sharing their prefix.
pub static STANDARD_PATTERNS: &[PatternDef] = &[
    // C0 controls
    P::literal(&[0x00], Token::Nul, "null"),
    P::literal(&[0x03], Token::Etx, "end of text"),
    P::literal(&[0x04], Token::Eot, "end of transmission"),
    P::literal(&[0x05], Token::Enq, "enquiry"),
    P::literal(&[0x07], Token::Beep, "bell"),
    P::literal(&[0x08], Token::Bs, "backspace"),
    P::literal(&[0x09], Token::Ht, "horizontal tab"),
    P::literal(&[0x0A], Token::Lf, "line feed"),
    P::literal(&[0x0B], Token::Vt, "vertical tab"),
    P::literal(&[0x0C], Token::Ff, "form feed"),
    P::literal(&[0x0D], Token::Cr, "carriage return"),
    P::literal(&[0x0E], Token::CharsetG1, "shift out: select G1"),
    P::literal(&[0x0F], Token::CharsetG0, "shift in: select G0"),
    P::literal(&[0x18], Token::Can, "cancel"),
    P::literal(&[0x1A], Token::Sub, "substitute"),
    P::literal(&[ESC], Token::Esc, "escape"),
    // Escapes
    P::literal(&[ESC, b'7'], Token::SaveCursor, "DECSC save cursor"),
    P::literal(&[ESC, b'8'], Token::RestoreCursor, "DECRC restore cursor"),
    P::literal(&[ESC, b'D'], Token::Index, "IND index"),
    P::literal(&[ESC, b'E'], Token::NextLine, "NEL next line"),
    P::literal(&[ESC, b'H'], Token::TabSet, "HTS set tab stop"),
    P::literal(&[ESC, b'M'], Token::ReverseIndex, "RI reverse index"),
    P::literal(&[ESC, b'='], Token::ApplicationKeypad, "DECKPAM application keypad"),
    P::literal(&[ESC, b'>'], Token::NumericKeypad, "DECKPNM numeric keypad"),
    P::literal(&[ESC, b'c'], Token::Reset, "RIS full reset"),
    P::literal(&[ESC, b'N'], Token::SingleShift2, "SS2 single shift G2"),
    P::literal(&[ESC, b'O'], Token::SingleShift3, "SS3 single shift G3"),
    P::literal(&[ESC, b'#', b'8'], Token::DecScreenAlignment, "DECALN screen alignment"),
    P::literal(&[ESC, b'(', b'A'], Token::CharsetG0Uk, "G0 = UK"),
    P::literal(&[ESC, b'(', b'B'], Token::CharsetG0Us, "G0 = US ASCII"),
    P::literal(&[ESC, b'(', b'0'], Token::CharsetG0Graphics, "G0 = DEC graphics"),
    P::literal(&[ESC, b')', b'A'], Token::CharsetG1Uk, "G1 = UK"),
    P::literal(&[ESC, b')', b'B'], Token::CharsetG1Us, "G1 = US ASCII"),
    P::literal(&[ESC, b')', b'0'], Token::CharsetG1Graphics, "G1 = DEC graphics"),
    P::literal(&[ESC, b'%', b'G'], Token::SelectUtf8, "select UTF-8"),
    P::literal(&[ESC, b'%', b'@'], Token::SelectDefaultCharset, "select default charset"),
    // OSC
    P::graph_mode(&[ESC, b']'], Token::XGraphMode, "xterm set text parameters"),
    // CSI
    P::with_args(CSI, b'A', Token::Up, "CUU cursor up"),
    P::with_args(CSI, b'B', Token::Down, "CUD cursor down"),
    P::with_args(CSI, b'C', Token::Right, "CUF cursor forward"),
    P::with_args(CSI, b'D', Token::Left, "CUB cursor back"),
    P::with_args(CSI, b'E', Token::NextLineN, "CNL cursor next line"),
    P::with_args(CSI, b'F', Token::PrevLineN, "CPL cursor previous line"),
    P::with_args(CSI, b'G', Token::SetColumn, "CHA cursor column"),
    P::with_args(CSI, b'`', Token::SetColumn, "HPA column absolute"),
    P::with_args(CSI, b'H', Token::SetCursor, "CUP cursor position"),
    P::with_args(CSI, b'f', Token::SetCursor, "HVP cursor position"),
    P::with_args(CSI, b'd', Token::SetRow, "VPA row absolute"),
    P::with_args(CSI, b'J', Token::ScreenErase, "ED erase in display"),
    P::with_args(CSI, b'K', Token::LineErase, "EL erase in line"),
    P::with_args(CSI, b'L', Token::InsertLines, "IL insert lines"),
    P::with_args(CSI, b'M', Token::DeleteLines, "DL delete lines"),
    P::with_args(CSI, b'@', Token::InsertChars, "ICH insert characters"),
    P::with_args(CSI, b'P', Token::DeleteChars, "DCH delete characters"),
    P::with_args(CSI, b'X', Token::EraseChars, "ECH erase characters"),
    P::with_args(CSI, b'S', Token::ScrollUp, "SU scroll up"),
    P::with_args(CSI, b'T', Token::ScrollDown, "SD scroll down"),
    P::with_args(CSI, b'r', Token::SetRegion, "DECSTBM scroll region"),
    P::with_args(CSI, b'm', Token::SetFontStyle, "SGR graphic rendition"),
    P::with_args(CSI, b'h', Token::SetMode, "SM set mode"),
    P::with_args(CSI, b'l', Token::ResetMode, "RM reset mode"),
    P::with_args(CSI, b'n', Token::DeviceStatus, "DSR device status report"),
    P::with_args(CSI, b'c', Token::SendPrimaryDa, "DA primary device attributes"),
    P::with_args(CSI, b's', Token::SaveCursor, "SCOSC save cursor"),
    P::with_args(CSI, b'u', Token::RestoreCursor, "SCORC restore cursor"),
    P::with_args(CSI, b'g', Token::TabClear, "TBC tab clear"),
    P::with_args(CSI, b't', Token::WindowManipulation, "xterm window manipulation"),
    // DEC private
    P::with_args(CSI_DEC, b'h', Token::DecSetMode, "DECSET"),
    P::with_args(CSI_DEC, b'l', Token::DecResetMode, "DECRST"),
    P::with_args(CSI_DEC, b'J', Token::ScreenErase, "DECSED selective erase in display"),
    P::with_args(CSI_DEC, b'K', Token::LineErase, "DECSEL selective erase in line"),
    // Secondary DA
    P::with_args(CSI_SECONDARY, b'c', Token::SendSecondaryDa, "DA2 secondary device attributes"),
];
