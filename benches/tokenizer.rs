//! Tokenizer benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vterm_core::{Token, Tokenizer};

/// Scan `input` to the end and return the token count
fn drain(input: &[u8]) -> usize {
    let mut tokenizer = Tokenizer::new(input);
    let mut count = 0;
    while let Ok(token) = tokenizer.next_token() {
        if token == Token::Eof {
            break;
        }
        count += 1;
    }
    count
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");

    let inputs = [
        ("plain_text", "Hello, World! ".repeat(1000)),
        ("csi_sequences", "\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J".repeat(100)),
        (
            "mixed_content",
            "Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500),
        ),
        ("utf8_content", "Hello, \u{4e16}\u{754c}! \u{1f389} ".repeat(500)),
        ("graph_mode", "\x1b]0;user@host: ~/src\x07$ ".repeat(200)),
    ];

    for (name, input) in &inputs {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(*name, |b| b.iter(|| drain(black_box(input.as_bytes()))));
    }

    group.finish();
}

fn bench_interrupted_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");

    // Controls inside sequences force replays
    let interrupted = "\x1b[12\x07;40\rH\x1b\x1b[m".repeat(200);
    group.throughput(Throughput::Bytes(interrupted.len() as u64));
    group.bench_function("interrupted_sequences", |b| {
        b.iter(|| drain(black_box(interrupted.as_bytes())))
    });

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_interrupted_sequences);
criterion_main!(benches);
