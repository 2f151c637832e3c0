//! Property tests for the tokenizer

use proptest::prelude::*;
use vterm_core::parser::PatternDef;
use vterm_core::{Token, TokenCatalog, Tokenizer, TokenizerOptions};

/// Scan `input` to the end, returning each token with its bytes
fn scan(input: &[u8], options: TokenizerOptions) -> Vec<(Token, Vec<u8>)> {
    let mut tokenizer = Tokenizer::with_options(input, options);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token().unwrap();
        if token == Token::Eof {
            return tokens;
        }
        tokens.push((token, tokenizer.bytes().to_vec()));
        assert!(tokens.len() <= input.len(), "more tokens than input bytes");
    }
}

/// Byte soup biased toward escape sequences
fn terminal_bytes() -> impl Strategy<Value = Vec<u8>> {
    let piece = prop_oneof![
        4 => any::<u8>().prop_map(|b| vec![b]),
        2 => Just(b"\x1b[".to_vec()),
        1 => Just(b"\x1b[?".to_vec()),
        1 => Just(b"\x1b]".to_vec()),
        1 => Just(vec![0x1b]),
        1 => Just(vec![0x07]),
        1 => Just(b";".to_vec()),
        2 => (0u16..2000).prop_map(|n| n.to_string().into_bytes()),
        1 => prop::sample::select(b"HJKmrhlABCDc".to_vec()).prop_map(|b| vec![b]),
    ];
    prop::collection::vec(piece, 0..64).prop_map(|pieces| pieces.concat())
}

fn sorted_without_nul(bytes: impl IntoIterator<Item = u8>) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.into_iter().filter(|&b| b != 0).collect();
    out.sort_unstable();
    out
}

proptest! {
    #[test]
    fn prop_every_byte_lands_in_one_token(input in terminal_bytes()) {
        let tokens = scan(&input, TokenizerOptions::default());
        let emitted = sorted_without_nul(tokens.into_iter().flat_map(|(_, bytes)| bytes));
        prop_assert_eq!(emitted, sorted_without_nul(input.iter().copied()));
    }

    #[test]
    fn prop_arbitrary_bytes_terminate(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let tokens = scan(&input, TokenizerOptions::default());
        prop_assert!(tokens.iter().all(|(token, _)| *token != Token::Eof));
    }

    #[test]
    fn prop_latin1_and_strict_modes_terminate(input in terminal_bytes(), strict in any::<bool>()) {
        let options = TokenizerOptions {
            utf8: false,
            strict_7bit: strict,
            ..TokenizerOptions::default()
        };
        let tokens = scan(&input, options);
        let emitted = sorted_without_nul(tokens.into_iter().flat_map(|(_, bytes)| bytes));
        prop_assert_eq!(emitted, sorted_without_nul(input.iter().copied()));
    }

    #[test]
    fn prop_cursor_position_arguments(row in 1i32..10_000, col in 1i32..10_000) {
        let input = format!("\x1b[{};{}H", row, col);
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        prop_assert_eq!(tokenizer.next_token().unwrap(), Token::SetCursor);
        prop_assert_eq!(tokenizer.args().ints(), &[row, col][..]);
        prop_assert_eq!(tokenizer.bytes(), input.as_bytes());
    }

    #[test]
    fn prop_printable_ascii_is_one_char_each(text in "[ -~]{0,80}") {
        let tokens = scan(text.as_bytes(), TokenizerOptions::default());
        prop_assert_eq!(tokens.len(), text.len());
        prop_assert!(tokens.iter().all(|(token, _)| *token == Token::Char));
    }

    #[test]
    fn prop_double_escape_is_error(tail in prop::collection::vec(0x20u8..0x7f, 0..8)) {
        let mut input = vec![0x1b, 0x1b];
        input.extend_from_slice(&tail);
        let mut tokenizer = Tokenizer::new(&input[..]);
        prop_assert_eq!(tokenizer.next_token().unwrap(), Token::Error);
        prop_assert_eq!(tokenizer.bytes(), &[0x1b][..]);
    }
}

#[test]
fn test_escape_csi_sequence_with_and_without_args() {
    let mut tokenizer = Tokenizer::new(&b"\x1b[3;5H\x1b[H"[..]);
    assert_eq!(tokenizer.next_token().unwrap(), Token::SetCursor);
    assert_eq!(tokenizer.args().ints(), &[3, 5]);
    assert_eq!(tokenizer.next_token().unwrap(), Token::SetCursor);
    assert!(tokenizer.args().is_empty());
    assert_eq!(tokenizer.args().int(0), 0);
    assert_eq!(tokenizer.args().count(0), 1);
}

#[test]
fn test_bell_inside_csi() {
    let tokens = scan(b"\x1b[2\x07J", TokenizerOptions::default());
    assert_eq!(
        tokens,
        vec![
            (Token::Beep, vec![0x07]),
            (Token::ScreenErase, b"\x1b[2J".to_vec()),
        ]
    );
}

#[test]
fn test_first_match_wins() {
    static DUPLICATES: &[PatternDef] = &[
        PatternDef::literal(b"\x1bZ", Token::Index, "first"),
        PatternDef::literal(b"\x1bZ", Token::NextLine, "shadowed"),
    ];
    let catalog: &'static TokenCatalog = Box::leak(Box::new(TokenCatalog::compile(DUPLICATES)));
    assert_eq!(catalog.find_full_match(b"\x1bZ").unwrap().description(), "first");

    let mut tokenizer = Tokenizer::with_catalog(&b"\x1bZ"[..], catalog, TokenizerOptions::default());
    assert_eq!(tokenizer.next_token().unwrap(), Token::Index);
    assert_eq!(tokenizer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_standard_catalog_has_no_shadowed_sequences() {
    let catalog = TokenCatalog::standard();
    for (i, pattern) in catalog.patterns().iter().enumerate() {
        let first = catalog.find_full_match(pattern.sequence()).unwrap();
        assert_eq!(
            first,
            pattern,
            "pattern {} ({}) is shadowed by {}",
            i,
            pattern.description(),
            first.description()
        );
    }
}
