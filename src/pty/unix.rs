//! Unix PTY implementation
//!
//! Opens the master with POSIX APIs and forks the child onto the slave.
//! Reader and writer each own a duplicate of the master descriptor so the
//! session thread can block on input while other threads write.

use std::ffi::CString;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};

use nix::fcntl::{open, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, setsid, ForkResult, Pid};

use super::{PtyError, PtyResult, WindowSize};
use crate::transport::{CancelToken, TransportSink};

/// How long a blocked read waits before checking for cancellation
const POLL_INTERVAL_MS: i32 = 50;

/// A pseudoterminal with a spawned child process
pub struct Pty {
    master: PtyMaster,
    child_pid: Pid,
    child_alive: bool,
}

impl Pty {
    /// Run `program` with `args` on a new PTY of the given size
    pub fn spawn(program: &str, args: &[&str], size: WindowSize) -> PtyResult<Self> {
        // Everything the child needs is allocated before forking.
        let program_cstr = to_cstring(program)?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(program_cstr.clone());
        for arg in args {
            argv.push(to_cstring(arg)?);
        }

        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // SAFETY: no other thread calls ptsname while this one does
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;
        set_window_size(master.as_raw_fd(), size)?;

        // SAFETY: the child only calls async-signal-safe functions before exec
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                exec_child(&slave_name, &program_cstr, &argv)
            }
            ForkResult::Parent { child } => {
                tracing::debug!(pid = child.as_raw(), program, "spawned PTY child");
                Ok(Pty {
                    master,
                    child_pid: child,
                    child_alive: true,
                })
            }
        }
    }

    /// Spawn the user's shell from `$SHELL`, falling back to `/bin/sh`
    pub fn spawn_shell(size: WindowSize) -> PtyResult<Self> {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        Self::spawn(&shell, &[], size)
    }

    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Byte source over the master; reports end of input once `cancel`
    /// is tripped or the child side closes
    pub fn reader(&self, cancel: CancelToken) -> PtyResult<PtyReader> {
        Ok(PtyReader {
            file: File::from(self.dup_master()?),
            cancel,
        })
    }

    /// Transport sink over the master
    pub fn writer(&self) -> PtyResult<PtyWriter> {
        Ok(PtyWriter {
            file: File::from(self.dup_master()?),
        })
    }

    /// Check if the child process is still running
    pub fn is_alive(&mut self) -> bool {
        if !self.child_alive {
            return false;
        }
        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            _ => {
                self.child_alive = false;
                false
            }
        }
    }

    /// Wait for the child process to exit and return its status code
    pub fn wait(&mut self) -> PtyResult<i32> {
        if !self.child_alive {
            return Ok(0);
        }
        match waitpid(self.child_pid, None).map_err(PtyError::Wait)? {
            WaitStatus::Exited(_, code) => {
                self.child_alive = false;
                Ok(code)
            }
            WaitStatus::Signaled(_, signal, _) => {
                self.child_alive = false;
                Err(PtyError::ChildSignaled(signal as i32))
            }
            _ => Ok(0),
        }
    }

    pub fn resize(&self, size: WindowSize) -> PtyResult<()> {
        set_window_size(self.master.as_raw_fd(), size)
    }

    /// Send a signal to the child process
    pub fn signal(&self, signal: Signal) -> PtyResult<()> {
        kill(self.child_pid, signal).map_err(PtyError::Signal)
    }

    fn dup_master(&self) -> PtyResult<OwnedFd> {
        // SAFETY: the master fd stays open for the lifetime of self
        let fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        Ok(fd.try_clone_to_owned()?)
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        if self.child_alive {
            let _ = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG));
        }
    }
}

/// Reading half of a PTY session
pub struct PtyReader {
    file: File,
    cancel: CancelToken,
}

impl Read for PtyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(0);
            }

            let ready = {
                let mut fds = [PollFd::new(&self.file, PollFlags::POLLIN)];
                poll(&mut fds, POLL_INTERVAL_MS)
            };
            match ready {
                Ok(0) => continue,
                Ok(_) => {},
                Err(nix::errno::Errno::EINTR) => continue,
                Err(e) => return Err(io::Error::from_raw_os_error(e as i32)),
            }

            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                // Linux reports EIO once the slave side is closed
                Err(e) if e.raw_os_error() == Some(libc::EIO) => return Ok(0),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Writing half of a PTY session
pub struct PtyWriter {
    file: File,
}

impl TransportSink for PtyWriter {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        set_window_size(self.file.as_raw_fd(), WindowSize::new(cols, rows))
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

fn to_cstring(value: &str) -> PtyResult<CString> {
    CString::new(value).map_err(|_| PtyError::InvalidArgument(value.to_string()))
}

/// Attach to the slave and exec; never returns
fn exec_child(slave_name: &str, program: &CString, argv: &[CString]) -> ! {
    if setsid().is_err() {
        // SAFETY: _exit is async-signal-safe
        unsafe { libc::_exit(126) }
    }

    let slave_fd = match open(slave_name, OFlag::O_RDWR, Mode::empty()) {
        Ok(fd) => fd,
        // SAFETY: _exit is async-signal-safe
        Err(_) => unsafe { libc::_exit(126) },
    };

    // SAFETY: TIOCSCTTY on the slave we just opened
    unsafe {
        libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0);
    }

    for target in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
        if dup2(slave_fd, target).is_err() {
            // SAFETY: _exit is async-signal-safe
            unsafe { libc::_exit(126) }
        }
    }
    if slave_fd > STDERR_FILENO {
        let _ = close(slave_fd);
    }

    std::env::set_var("TERM", "vt100");

    let _ = execvp(program, argv);
    // SAFETY: _exit is async-signal-safe
    unsafe { libc::_exit(127) }
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ reads a winsize from a valid pointer
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(nix::errno::Errno::last()))
    } else {
        Ok(())
    }
}

/// Get the window size from a PTY file descriptor
pub fn get_window_size(fd: RawFd) -> PtyResult<WindowSize> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ writes a winsize through a valid pointer
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };

    if result < 0 {
        Err(PtyError::GetWinsize(nix::errno::Errno::last()))
    } else {
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            pixel_width: winsize.ws_xpixel,
            pixel_height: winsize.ws_ypixel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn read_all(reader: &mut PtyReader) -> String {
        let mut out = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) => panic!("read failed: {e}"),
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_window_size() {
        let size = WindowSize::new(80, 24);
        assert_eq!(size.cols, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(WindowSize::default(), size);
    }

    #[test]
    fn test_nul_in_argument_rejected() {
        let result = Pty::spawn("/bin/echo", &["a\0b"], WindowSize::default());
        assert!(matches!(result, Err(PtyError::InvalidArgument(_))));
    }

    #[test]
    fn test_reader_sees_output_then_eof() {
        let mut pty = Pty::spawn("/bin/echo", &["hello"], WindowSize::new(80, 24)).expect("Failed to spawn PTY");
        let mut reader = pty.reader(CancelToken::new()).expect("reader");
        let output = read_all(&mut reader);
        assert!(output.contains("hello"), "Unexpected output: {output}");
        assert_eq!(pty.wait().expect("wait"), 0);
        assert!(!pty.is_alive());
    }

    #[test]
    fn test_writer_round_trip() {
        let mut pty = Pty::spawn("/bin/cat", &[], WindowSize::new(80, 24)).expect("Failed to spawn PTY");
        let mut writer = pty.writer().expect("writer");
        writer.write_all(b"test\n").expect("write");

        let cancel = CancelToken::new();
        let mut reader = pty.reader(cancel.clone()).expect("reader");
        let mut seen = String::new();
        let mut buf = [0u8; 256];
        let deadline = Instant::now() + Duration::from_secs(5);
        while !seen.contains("test") && Instant::now() < deadline {
            let n = reader.read(&mut buf).expect("read");
            seen.push_str(&String::from_utf8_lossy(&buf[..n]));
        }
        assert!(seen.contains("test"), "Unexpected output: {seen}");

        pty.signal(Signal::SIGKILL).expect("kill");
        let _ = pty.wait();
    }

    #[test]
    fn test_cancel_unblocks_reader() {
        let mut pty = Pty::spawn("/bin/cat", &[], WindowSize::new(80, 24)).expect("Failed to spawn PTY");
        let cancel = CancelToken::new();
        let mut reader = pty.reader(cancel.clone()).expect("reader");

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            cancel.cancel();
        });
        let mut buf = [0u8; 64];
        assert_eq!(reader.read(&mut buf).expect("read"), 0);
        canceller.join().unwrap();

        pty.signal(Signal::SIGKILL).expect("kill");
        let _ = pty.wait();
    }

    #[test]
    fn test_resize_through_writer() {
        let mut pty = Pty::spawn("/bin/cat", &[], WindowSize::new(80, 24)).expect("Failed to spawn PTY");
        let mut writer = pty.writer().expect("writer");
        writer.resize(120, 40).expect("resize");

        let size = get_window_size(pty.master_fd()).expect("Failed to get size");
        assert_eq!(size.cols, 120);
        assert_eq!(size.rows, 40);

        pty.resize(WindowSize::new(90, 30)).expect("resize");
        assert_eq!(get_window_size(pty.master_fd()).expect("size").cols, 90);

        pty.signal(Signal::SIGKILL).expect("kill");
        let _ = pty.wait();
    }
}
