//! Benchmarks for IRC message parsing and serialization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_wire::{Decoder, Encoder, MessageRecord, MessageRef, WireEncode};

/// Command with one argument and a trailing
const SHORT_MESSAGE: &str = "COMMAND arg1 :Message\r\n";

/// Server prefix, a couple of arguments
const MEDIUM_MESSAGE: &str = ":Namename COMMAND arg6 arg7 :Message message message\r\n";

/// Full hostmask and seven arguments
const LONG_MESSAGE: &str = ":Namename!username@hostname COMMAND arg1 arg2 arg3 arg4 arg5 arg6 arg7 :Message message message message message\r\n";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    for (name, line) in [
        ("short", SHORT_MESSAGE),
        ("medium", MEDIUM_MESSAGE),
        ("long", LONG_MESSAGE),
    ] {
        // One record reused across iterations, as in a read loop.
        group.bench_with_input(BenchmarkId::new("parse_all", name), line, |b, line| {
            let mut record = MessageRecord::with_capacity(512);
            b.iter(|| {
                record.bind(black_box(line));
                record.parse_all().unwrap();
                black_box(record.trailing().unwrap());
            })
        });

        group.bench_with_input(BenchmarkId::new("peek_command", name), line, |b, line| {
            let mut record = MessageRecord::with_capacity(512);
            b.iter(|| {
                record.bind(black_box(line));
                black_box(record.command());
            })
        });

        group.bench_with_input(BenchmarkId::new("borrowed", name), line, |b, line| {
            b.iter(|| {
                let msg = MessageRef::parse(black_box(line.as_bytes())).unwrap();
                black_box(msg);
            })
        });
    }

    group.finish();
}

fn benchmark_params(c: &mut Criterion) {
    let mut record = MessageRecord::with_capacity(512);

    c.bench_function("params_after_peek", |b| {
        b.iter(|| {
            record.bind(black_box(LONG_MESSAGE));
            record.peek_command().unwrap();
            black_box(record.params().unwrap().len());
        })
    });
}

fn benchmark_decoder(c: &mut Criterion) {
    let input = LONG_MESSAGE.repeat(1000);

    c.bench_function("decoder_1000_lines", |b| {
        let mut record = MessageRecord::new();
        b.iter(|| {
            let decoder = Decoder::new(black_box(input.as_bytes()));
            while decoder.decode(&mut record).is_ok() {
                black_box(record.command());
            }
        })
    });
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Serialization");

    let mut built = MessageRecord::new();
    built.set_name("Namename");
    built.set_command("COMMAND");
    built
        .set_parameters(&["arg1", "arg2", "arg3", "arg4", "arg5", "arg6", "arg7"])
        .unwrap();
    built.set_trailing("Message message message message message");

    group.bench_function("encoder", |b| {
        let encoder = Encoder::new(std::io::sink());
        b.iter(|| encoder.encode(black_box(&built)).unwrap())
    });

    let parsed = MessageRecord::from_line(LONG_MESSAGE);
    group.bench_function("reencode_parsed", |b| {
        let mut buf = Vec::with_capacity(512);
        b.iter(|| {
            buf.clear();
            black_box(&parsed).encode(&mut buf).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_params,
    benchmark_decoder,
    benchmark_serialization
);
criterion_main!(benches);
