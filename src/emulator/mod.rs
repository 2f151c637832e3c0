//! Emulator
//!
//! The session loop. An [`Emulator`] pulls tokens from a [`Tokenizer`],
//! applies them to a [`TerminalSurface`] and writes device responses back
//! through the transport sink. It owns the geometry and mode state of the
//! session; a cloneable [`EmulatorHandle`] lets other threads halt, step,
//! resize or terminate it and send keystrokes.
//!
//! ```no_run
//! use std::thread;
//! use vterm_core::{Config, Emulator, IoSink, Screen};
//!
//! let input = std::io::stdin();
//! let mut emulator = Emulator::new(Screen::new(80, 24), input, IoSink(std::io::sink()), &Config::default());
//! let handle = emulator.handle();
//! let session = thread::spawn(move || {
//!     let result = emulator.start();
//!     (emulator, result)
//! });
//! handle.signal_terminate();
//! let (emulator, _) = session.join().unwrap();
//! println!("{}", emulator.surface().to_text());
//! ```

mod dispatch;
mod error;
mod handle;

use std::io::Read;

pub use error::EmulatorError;
pub use handle::EmulatorHandle;

use crate::config::{Config, Encoding};
use crate::core::{DrawStyle, TerminalSurface};
use crate::parser::Tokenizer;
use crate::transport::{CancelToken, TransportSink};

/// Receives session notifications
pub trait EmulatorListener: Send {
    /// The session changed its own geometry (80/132 column switch)
    fn on_resize(&mut self, _cols: usize, _rows: usize) {}

    /// An OSC string arrived; `kind` 0 sets icon name and title, 1 the icon
    /// name, 2 the title
    fn on_graph_mode(&mut self, _kind: i32, _text: &str) {}
}

/// Responses and defaults taken from the configuration
#[derive(Debug, Clone)]
struct Settings {
    tab_size: usize,
    answerback: Vec<u8>,
    primary_da: Vec<u8>,
    secondary_da: Vec<u8>,
}

/// A terminal session bound to one surface and one transport
pub struct Emulator<S, R> {
    surface: S,
    tokenizer: Tokenizer<R>,
    handle: EmulatorHandle,
    listeners: Vec<Box<dyn EmulatorListener>>,
    settings: Settings,

    cols: usize,
    rows: usize,
    /// First row of the scroll region
    region_y1: usize,
    /// One past the last row of the scroll region
    region_y2: usize,
    saved_cursor: (usize, usize),
    style: DrawStyle,
    encoding: Encoding,
    connected: bool,
    wrap_around: bool,
    newline_mode: bool,
}

impl<S: TerminalSurface, R: Read> Emulator<S, R> {
    /// Create a session reading `source` and answering through `sink`
    pub fn new(surface: S, source: R, sink: impl TransportSink + 'static, config: &Config) -> Self {
        Self::with_cancel_token(surface, source, sink, config, CancelToken::new())
    }

    /// Like [`Emulator::new`], sharing `cancel` with the reader behind
    /// `source` so [`EmulatorHandle::signal_terminate`] can unblock it
    pub fn with_cancel_token(
        surface: S,
        source: R,
        sink: impl TransportSink + 'static,
        config: &Config,
        cancel: CancelToken,
    ) -> Self {
        let cols = surface.column_count().max(1);
        let rows = surface.row_count().max(1);
        Self {
            surface,
            tokenizer: Tokenizer::with_options(source, config.tokenizer_options()),
            handle: EmulatorHandle::new(Box::new(sink), cancel),
            listeners: Vec::new(),
            settings: Settings {
                tab_size: config.tab_size.max(1),
                answerback: config.answerback.clone().into_bytes(),
                primary_da: config.primary_da.clone().into_bytes(),
                secondary_da: config.secondary_da.clone().into_bytes(),
            },
            cols,
            rows,
            region_y1: 0,
            region_y2: rows,
            saved_cursor: (0, 0),
            style: DrawStyle::NONE,
            encoding: config.encoding,
            connected: false,
            wrap_around: true,
            newline_mode: false,
        }
    }

    /// A handle for controlling this session from other threads
    pub fn handle(&self) -> EmulatorHandle {
        self.handle.clone()
    }

    pub fn add_listener(&mut self, listener: impl EmulatorListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Scroll region as `(first row, one past the last row)`
    pub fn region(&self) -> (usize, usize) {
        (self.region_y1, self.region_y2)
    }

    /// Session geometry as `(cols, rows)`
    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Whether [`Emulator::start`] is running
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Adopt new geometry and scroll region.
    ///
    /// The region is clamped to the new size and always spans at least one
    /// row. The cursor is pulled back onto the screen.
    pub fn update_region(&mut self, cols: usize, rows: usize, y1: usize, y2: usize) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.region_y1 = y1.min(self.rows - 1);
        self.region_y2 = y2.clamp(self.region_y1 + 1, self.rows);
        let (x, y) = self.surface.cursor();
        self.surface
            .set_cursor(x.min(self.cols - 1), y.min(self.rows - 1));
        tracing::debug!(
            cols = self.cols,
            rows = self.rows,
            y1 = self.region_y1,
            y2 = self.region_y2,
            "region updated"
        );
    }

    /// Run the session until end of input, a remote EOT, or
    /// [`EmulatorHandle::signal_terminate`].
    ///
    /// Malformed and unsupported sequences are logged and skipped. Only
    /// transport failures end the session with an error.
    pub fn start(&mut self) -> Result<(), EmulatorError> {
        self.connected = true;
        tracing::debug!(cols = self.cols, rows = self.rows, "session started");

        let result = loop {
            if !self.handle.wait_for_turn() {
                break Ok(());
            }
            if let Some((cols, rows)) = self.handle.take_pending_resize() {
                self.surface.set_size(cols, rows);
                self.update_region(cols, rows, 0, rows);
            }

            let token = match self.tokenizer.next_token() {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!("session read failed: {}", e);
                    break Err(EmulatorError::Transport(e));
                }
            };
            self.handle.record_token();
            tracing::trace!(?token, bytes = ?self.tokenizer.bytes(), "token");

            match self.dispatch(token) {
                Ok(()) => {},
                Err(e) if e.is_fatal() => {
                    tracing::error!("session ended: {}", e);
                    break Err(e);
                }
                Err(e @ EmulatorError::Unsupported(..)) => {
                    tracing::debug!("{}", e);
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                }
            }
        };

        self.connected = false;
        tracing::debug!(tokens = self.handle.token_count(), "session finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Screen;
    use crate::transport::MemorySink;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn run(input: &[u8]) -> (Emulator<Screen, Cursor<Vec<u8>>>, MemorySink) {
        let sink = MemorySink::new();
        let mut emulator = Emulator::new(
            Screen::new(20, 5),
            Cursor::new(input.to_vec()),
            sink.clone(),
            &Config::default(),
        );
        emulator.start().unwrap();
        (emulator, sink)
    }

    #[test]
    fn test_runs_to_end_of_input() {
        let (emulator, _) = run(b"abc");
        assert_eq!(emulator.surface().line_text(0), "abc");
        assert!(!emulator.is_connected());
        assert!(emulator.handle().is_terminated());
    }

    #[test]
    fn test_eot_ends_session() {
        let (emulator, _) = run(b"ab\x04cd");
        assert_eq!(emulator.surface().line_text(0), "ab");
    }

    #[test]
    fn test_unsupported_sequences_do_not_stop_session() {
        let (emulator, _) = run(b"a\x1b[?9999h\x1b[3J\x1b[9;2rb");
        assert_eq!(emulator.surface().line_text(0), "ab");
    }

    #[test]
    fn test_update_region_clamps() {
        let (mut emulator, _) = run(b"");
        emulator.update_region(20, 5, 9, 99);
        assert_eq!(emulator.region(), (4, 5));
        emulator.update_region(20, 5, 1, 0);
        assert_eq!(emulator.region(), (1, 2));
    }

    #[test]
    fn test_pending_resize_applied_before_next_token() {
        let sink = MemorySink::new();
        let mut emulator = Emulator::new(
            Screen::new(20, 5),
            Cursor::new(b"\x1b[30;40Hx".to_vec()),
            sink.clone(),
            &Config::default(),
        );
        emulator.handle().send_size(50, 30).unwrap();
        emulator.start().unwrap();
        assert_eq!(emulator.size(), (50, 30));
        assert_eq!(emulator.region(), (0, 30));
        assert_eq!(emulator.surface().cols(), 50);
        assert_eq!(emulator.surface().line_text(29), format!("{}x", " ".repeat(39)));
        assert_eq!(sink.resizes(), vec![(50, 30)]);
    }

    #[derive(Clone, Default)]
    struct Titles(Arc<Mutex<Vec<(i32, String)>>>);

    impl EmulatorListener for Titles {
        fn on_graph_mode(&mut self, kind: i32, text: &str) {
            self.0.lock().unwrap().push((kind, text.to_string()));
        }
    }

    #[test]
    fn test_graph_mode_reaches_listeners() {
        let titles = Titles::default();
        let mut emulator = Emulator::new(
            Screen::new(20, 5),
            Cursor::new(b"\x1b]2;build log\x07done".to_vec()),
            MemorySink::new(),
            &Config::default(),
        );
        emulator.add_listener(titles.clone());
        emulator.start().unwrap();
        assert_eq!(*titles.0.lock().unwrap(), vec![(2, "build log".to_string())]);
        assert_eq!(emulator.surface().line_text(0), "done");
    }

    #[test]
    fn test_read_failure_is_fatal() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        let mut emulator = Emulator::new(Screen::new(4, 2), Failing, MemorySink::new(), &Config::default());
        assert!(matches!(emulator.start(), Err(EmulatorError::Transport(_))));
    }
}
