//! Emulator sessions against real child processes on a PTY

use std::thread;

use vterm_core::pty::{Pty, PtyReader, WindowSize};
use vterm_core::{CancelToken, Config, Emulator, Screen, TerminalSurface};

fn session(program: &str, args: &[&str], cols: u16, rows: u16) -> (Pty, Emulator<Screen, PtyReader>) {
    let pty = Pty::spawn(program, args, WindowSize::new(cols, rows)).expect("Failed to spawn PTY");
    let cancel = CancelToken::new();
    let reader = pty.reader(cancel.clone()).expect("reader");
    let writer = pty.writer().expect("writer");
    let emulator = Emulator::with_cancel_token(
        Screen::new(cols.into(), rows.into()),
        reader,
        writer,
        &Config::default(),
        cancel,
    );
    (pty, emulator)
}

#[test]
fn test_echo_reaches_screen() {
    let (mut pty, mut emulator) = session("/bin/echo", &["hello", "world"], 40, 5);
    emulator.start().expect("session");
    assert_eq!(pty.wait().expect("wait"), 0);

    let screen = emulator.surface();
    assert_eq!(screen.line_text(0), "hello world");
    // ONLCR turns the trailing newline into CR LF
    assert_eq!(screen.cursor(), (0, 1));
}

#[test]
fn test_escape_sequences_from_child() {
    let (mut pty, mut emulator) = session("/bin/sh", &["-c", "printf 'one\\ntwo\\033[4;5HX'"], 20, 6);
    emulator.start().expect("session");
    assert_eq!(pty.wait().expect("wait"), 0);

    let screen = emulator.surface();
    assert_eq!(screen.line_text(0), "one");
    assert_eq!(screen.line_text(1), "two");
    assert_eq!(screen.cell(4, 3).unwrap().ch, 'X');
}

#[test]
fn test_exit_status_is_reported() {
    let (mut pty, mut emulator) = session("/bin/sh", &["-c", "exit 3"], 20, 4);
    emulator.start().expect("session");
    assert_eq!(pty.wait().expect("wait"), 3);
}

#[test]
fn test_input_is_forwarded_to_child() {
    let (mut pty, mut emulator) = session("/bin/cat", &[], 20, 4);
    let handle = emulator.handle();
    let session = thread::spawn(move || {
        let result = emulator.start();
        (emulator, result)
    });

    // Ctrl-D at the start of a line ends cat's input
    handle.send(b"ping\n\x04").expect("send");
    let (emulator, result) = session.join().unwrap();
    result.expect("session");
    assert_eq!(pty.wait().expect("wait"), 0);
    assert_eq!(emulator.surface().line_text(0), "ping");
}
