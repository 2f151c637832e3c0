//! Terminal byte stream tokenizer
//!
//! Splits the output of a remote session into semantic [`Token`]s by
//! matching bytes against an ordered [`TokenCatalog`]. Arguments embedded in
//! control sequences are parsed into [`Arguments`] on the way.

mod args;
mod catalog;
mod token;
mod tokenizer;

pub use args::{Arguments, MAX_INTS};
pub use catalog::{PatternDef, TokenCatalog, TokenPattern, STANDARD_PATTERNS};
pub use token::{MatchOption, Token};
pub use tokenizer::{Tokenizer, TokenizerOptions};
