//! Criterion micro-benchmarks for the record codec.
//!
//! Measures envelope decode and encode over a synthetic zone, plus
//! streaming record iteration without building a [`RawWld`].

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use wld_bench::zone_bytes;
use wld_raw::{FormatVersion, RawWld, WldReader};

/// Chunk count for the reference zone.
const CHUNKS: usize = 256;

fn bench_decode(c: &mut Criterion) {
    let bytes = zone_bytes(FormatVersion::Legacy, CHUNKS);
    c.bench_function("decode_zone_256", |b| {
        b.iter(|| {
            let raw = RawWld::from_bytes(black_box(&bytes)).unwrap();
            black_box(&raw);
        });
    });
}

fn bench_decode_new_world(c: &mut Criterion) {
    let bytes = zone_bytes(FormatVersion::NewWorld, CHUNKS);
    c.bench_function("decode_zone_256_new_world", |b| {
        b.iter(|| {
            let raw = RawWld::from_bytes(black_box(&bytes)).unwrap();
            black_box(&raw);
        });
    });
}

fn bench_encode(c: &mut Criterion) {
    let raw = RawWld::from_bytes(&zone_bytes(FormatVersion::Legacy, CHUNKS)).unwrap();
    c.bench_function("encode_zone_256", |b| {
        b.iter(|| {
            let bytes = black_box(&raw).to_bytes().unwrap();
            black_box(&bytes);
        });
    });
}

fn bench_stream_records(c: &mut Criterion) {
    let bytes = zone_bytes(FormatVersion::Legacy, CHUNKS);
    c.bench_function("stream_records_zone_256", |b| {
        b.iter(|| {
            let reader = WldReader::open(black_box(bytes.as_slice())).unwrap();
            let mut count = 0usize;
            for record in reader.records() {
                black_box(record.unwrap());
                count += 1;
            }
            black_box(count);
        });
    });
}

criterion_group!(
    benches,
    bench_decode,
    bench_decode_new_world,
    bench_encode,
    bench_stream_records,
);
criterion_main!(benches);
