//! vterm-core
//!
//! A VT100/xterm terminal emulator core driven by a token catalog.
//!
//! - `parser`: token catalog and pull-based tokenizer
//! - `emulator`: session loop dispatching tokens onto a terminal surface
//! - `core`: the surface contract and a headless in-memory screen
//! - `keys`: symbolic key names to outbound byte sequences
//! - `transport` / `pty`: byte channels, including a local PTY
//! - `config`: JSON configuration

pub mod config;
pub mod core;
pub mod emulator;
pub mod keys;
pub mod parser;
pub mod pty;
pub mod transport;

pub use crate::config::{Config, ConfigError, Encoding};
pub use crate::core::{Screen, Snapshot, TerminalSurface};
pub use crate::emulator::{Emulator, EmulatorError, EmulatorHandle, EmulatorListener};
pub use crate::keys::{get_key_code, Key};
pub use crate::parser::{Arguments, Token, TokenCatalog, Tokenizer, TokenizerOptions};
pub use crate::transport::{CancelToken, IoSink, MemorySink, TransportSink};
