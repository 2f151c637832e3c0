//! Transport plumbing
//!
//! The emulator reads from any [`std::io::Read`] and writes responses through
//! a [`TransportSink`]. The sink is shared behind a mutex with whoever sends
//! user keystrokes, so writes never interleave.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outbound half of a session transport
pub trait TransportSink: Send {
    /// Write every byte or fail
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Tell the remote side about a new window size
    fn resize(&mut self, _cols: u16, _rows: u16) -> io::Result<()> {
        Ok(())
    }
}

/// Sink over any writer; resizes are ignored
#[derive(Debug)]
pub struct IoSink<W>(pub W);

impl<W: Write + Send> TransportSink for IoSink<W> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    bytes: Vec<u8>,
    writes: usize,
    resizes: Vec<(u16, u16)>,
}

/// Sink that records everything written to it.
///
/// Clones share the same buffer, so a test can keep one clone and hand the
/// other to an emulator.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.inner).bytes.clone()
    }

    /// Number of `write_all` calls
    pub fn write_count(&self) -> usize {
        lock(&self.inner).writes
    }

    /// Resize requests received, oldest first
    pub fn resizes(&self) -> Vec<(u16, u16)> {
        lock(&self.inner).resizes.clone()
    }

    /// Drain the written bytes
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.inner).bytes)
    }
}

impl TransportSink for MemorySink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut inner = lock(&self.inner);
        inner.bytes.extend_from_slice(bytes);
        inner.writes += 1;
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        lock(&self.inner).resizes.push((cols, rows));
        Ok(())
    }
}

/// One-way shutdown flag shared with cancellation-aware readers
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lock a mutex, recovering the data if a holder panicked
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
