//! Cross-thread control of a running emulator

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use crate::keys;
use crate::transport::{lock, CancelToken, TransportSink};

#[derive(Debug, Default)]
struct ControlState {
    halted: bool,
    /// Tokens the session may process while halted
    steps: usize,
    terminate: bool,
}

struct Shared {
    control: Mutex<ControlState>,
    wake: Condvar,
    sink: Mutex<Box<dyn TransportSink>>,
    application_cursor: AtomicBool,
    pending_resize: Mutex<Option<(usize, usize)>>,
    tokens: AtomicU64,
    cancel: CancelToken,
}

/// Cloneable handle for steering an [`Emulator`](super::Emulator) from
/// other threads.
///
/// Outbound bytes sent here and device responses written by the session
/// thread go through the same locked sink.
#[derive(Clone)]
pub struct EmulatorHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for EmulatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let control = lock(&self.shared.control);
        f.debug_struct("EmulatorHandle")
            .field("halted", &control.halted)
            .field("steps", &control.steps)
            .field("terminate", &control.terminate)
            .field("tokens", &self.token_count())
            .finish()
    }
}

impl EmulatorHandle {
    pub(crate) fn new(sink: Box<dyn TransportSink>, cancel: CancelToken) -> Self {
        Self {
            shared: Arc::new(Shared {
                control: Mutex::new(ControlState::default()),
                wake: Condvar::new(),
                sink: Mutex::new(sink),
                application_cursor: AtomicBool::new(false),
                pending_resize: Mutex::new(None),
                tokens: AtomicU64::new(0),
                cancel,
            }),
        }
    }

    /// Ask the session loop to stop after the current token.
    ///
    /// Also cancels the session's [`CancelToken`] so a reader blocked on
    /// input returns end of stream.
    pub fn signal_terminate(&self) {
        lock(&self.shared.control).terminate = true;
        self.shared.cancel.cancel();
        self.shared.wake.notify_all();
    }

    /// Park (`true`) or release (`false`) the session loop
    pub fn signal_halt(&self, halt: bool) {
        let mut control = lock(&self.shared.control);
        control.halted = halt;
        if !halt {
            control.steps = 0;
        }
        drop(control);
        self.shared.wake.notify_all();
    }

    /// Let a halted session process exactly one more token
    pub fn step(&self) {
        let mut control = lock(&self.shared.control);
        if control.halted {
            control.steps += 1;
        }
        drop(control);
        self.shared.wake.notify_all();
    }

    pub fn is_halted(&self) -> bool {
        lock(&self.shared.control).halted
    }

    pub fn is_terminated(&self) -> bool {
        lock(&self.shared.control).terminate
    }

    /// Tokens dispatched since the session started
    pub fn token_count(&self) -> u64 {
        self.shared.tokens.load(Ordering::SeqCst)
    }

    /// Token shared with cancellation-aware readers
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }

    /// Announce a new window size.
    ///
    /// The transport is told immediately. The session loop picks up the new
    /// geometry before its next token.
    pub fn send_size(&self, cols: usize, rows: usize) -> io::Result<()> {
        *lock(&self.shared.pending_resize) = Some((cols, rows));
        self.resize_transport(cols, rows)
    }

    /// Send bytes to the remote side, for example keystrokes
    pub fn send(&self, bytes: &[u8]) -> io::Result<()> {
        let mut sink = lock(&self.shared.sink);
        sink.write_all(bytes)?;
        sink.flush()
    }

    /// Bytes for the key called `name` under the current cursor key mode
    pub fn get_key_code(&self, name: &str) -> Option<&'static [u8]> {
        keys::get_key_code(name, self.application_cursor_keys())
    }

    /// Send the key called `name`; returns `false` for unknown names
    pub fn send_key(&self, name: &str) -> io::Result<bool> {
        match self.get_key_code(name) {
            Some(bytes) => self.send(bytes).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn application_cursor_keys(&self) -> bool {
        self.shared.application_cursor.load(Ordering::SeqCst)
    }

    pub(crate) fn set_application_cursor_keys(&self, enabled: bool) {
        self.shared.application_cursor.store(enabled, Ordering::SeqCst);
    }

    pub(crate) fn resize_transport(&self, cols: usize, rows: usize) -> io::Result<()> {
        let cols = u16::try_from(cols).unwrap_or(u16::MAX);
        let rows = u16::try_from(rows).unwrap_or(u16::MAX);
        lock(&self.shared.sink).resize(cols, rows)
    }

    pub(crate) fn take_pending_resize(&self) -> Option<(usize, usize)> {
        lock(&self.shared.pending_resize).take()
    }

    pub(crate) fn record_token(&self) {
        self.shared.tokens.fetch_add(1, Ordering::SeqCst);
    }

    /// Block while halted with no steps granted.
    ///
    /// Returns `false` once termination has been requested.
    pub(crate) fn wait_for_turn(&self) -> bool {
        let mut control = lock(&self.shared.control);
        while control.halted && control.steps == 0 && !control.terminate {
            control = self
                .shared
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if control.terminate {
            return false;
        }
        if control.halted {
            control.steps -= 1;
        }
        true
    }
}
