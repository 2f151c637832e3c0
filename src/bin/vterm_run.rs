//! vterm PTY runner
//!
//! Runs a command on a pseudoterminal through the emulator and prints the
//! final screen once the command exits. Standard input is forwarded to the
//! command, so `echo ls | vterm-run bash` works.

use std::io::{self, Read};
use std::process::ExitCode;
use std::thread;

use vterm_core::pty::{Pty, WindowSize};
use vterm_core::{CancelToken, Config, Emulator, EmulatorHandle, Screen, Snapshot};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let config = Config::load_or_default();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("Usage: vterm-run [COMMAND [ARGS...]]");
        println!();
        println!("Runs COMMAND (default: the configured shell) on a {}x{} PTY", config.columns, config.rows);
        println!("and prints the final screen.");
        return ExitCode::SUCCESS;
    }

    match run(&config, &args) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &[String]) -> Result<i32, Box<dyn std::error::Error>> {
    let program = args.first().cloned().unwrap_or_else(|| config.shell_command());
    let program_args: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();

    let mut pty = Pty::spawn(&program, &program_args, WindowSize::new(config.columns, config.rows))?;
    let cancel = CancelToken::new();
    let reader = pty.reader(cancel.clone())?;
    let writer = pty.writer()?;

    let screen = Screen::new(config.columns.into(), config.rows.into());
    let mut emulator = Emulator::with_cancel_token(screen, reader, writer, config, cancel);
    let handle = emulator.handle();
    forward_stdin(handle);

    emulator.start()?;
    let code = pty.wait()?;

    print!("{}", Snapshot::from_screen(emulator.surface()).to_text());
    Ok(code)
}

/// Copy standard input to the session on a detached thread
fn forward_stdin(handle: EmulatorHandle) {
    thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if let Err(e) = handle.send(&buf[..n]) {
                        tracing::debug!("stdin forwarding stopped: {}", e);
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });
}
