//! vterm headless runner
//!
//! Replays a byte capture through the emulator and prints the resulting
//! screen, or dumps the token stream.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use vterm_core::{Config, Emulator, IoSink, Screen, Snapshot, Token, Tokenizer};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Tokens,
}

struct Options {
    cols: Option<u16>,
    rows: Option<u16>,
    input_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    format: OutputFormat,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let mut config = match &options.config_file {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
        None => Config::load_or_default(),
    };
    if let Some(cols) = options.cols {
        config.columns = cols;
    }
    if let Some(rows) = options.rows {
        config.rows = rows;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let input: Box<dyn Read> = match &options.input_file {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
        None => Box::new(io::stdin()),
    };

    let result = if options.format == OutputFormat::Tokens {
        dump_tokens(input, &config)
    } else {
        replay(input, &config, options.format)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn dump_tokens(input: Box<dyn Read>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut tokenizer = Tokenizer::with_options(input, config.tokenizer_options());
    loop {
        let token = tokenizer.next_token()?;
        if token == Token::Eof {
            return Ok(());
        }
        let args = tokenizer.args();
        match args.string() {
            Some(text) => println!("{:?} {:?} {:?} {:?}", token, tokenizer.bytes(), args.ints(), text),
            None if args.len() > 0 => println!("{:?} {:?} {:?}", token, tokenizer.bytes(), args.ints()),
            None => println!("{:?} {:?}", token, tokenizer.bytes()),
        }
    }
}

fn replay(input: Box<dyn Read>, config: &Config, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let screen = Screen::new(config.columns.into(), config.rows.into());
    // Device responses have nowhere to go in a replay.
    let mut emulator = Emulator::new(screen, input, IoSink(io::sink()), config);
    emulator.start()?;

    let snapshot = Snapshot::from_screen(emulator.surface());
    if format == OutputFormat::Json {
        println!("{}", snapshot.to_json()?);
    } else {
        println!("Terminal State ({}x{}):", snapshot.cols, snapshot.rows);
        println!("Cursor: ({}, {})", snapshot.cursor.y, snapshot.cursor.x);
        println!("---");
        for line in &snapshot.lines {
            println!("{}", line);
        }
        println!("---");
    }
    Ok(())
}

/// `Ok(None)` means help was requested
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options {
        cols: None,
        rows: None,
        input_file: None,
        config_file: None,
        format: OutputFormat::Text,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--cols" => options.cols = Some(parse_number(arg, iter.next())?),
            "-r" | "--rows" => options.rows = Some(parse_number(arg, iter.next())?),
            "-f" | "--file" => {
                let path = iter.next().ok_or_else(|| format!("{} needs a path", arg))?;
                options.input_file = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = iter.next().ok_or_else(|| format!("{} needs a path", arg))?;
                options.config_file = Some(PathBuf::from(path));
            }
            "-j" | "--json" => options.format = OutputFormat::Json,
            "-t" | "--text" => options.format = OutputFormat::Text,
            "--tokens" => options.format = OutputFormat::Tokens,
            "-h" | "--help" => return Ok(None),
            other if !other.starts_with('-') && options.input_file.is_none() => {
                options.input_file = Some(PathBuf::from(other));
            }
            other => return Err(format!("Unknown option '{}', see --help", other)),
        }
    }
    Ok(Some(options))
}

fn parse_number(flag: &str, value: Option<&String>) -> Result<u16, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    match value.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} expects a positive number, got '{}'", flag, value)),
    }
}

fn print_help() {
    println!("vterm headless runner");
    println!();
    println!("Usage: vterm-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("  -f, --file <PATH>    Read input from file instead of stdin");
    println!("      --config <PATH>  Load configuration from PATH");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("      --tokens         Print the token stream instead of replaying it");
    println!("  -h, --help           Show this help message");
}
