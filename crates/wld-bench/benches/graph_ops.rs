//! Criterion micro-benchmarks for the semantic graph and text export.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use wld_ascii::{AsciiExporter, ExportConfig};
use wld_bench::{zone_bytes, zone_profile};
use wld_graph::{GraphBuilder, GraphEncoder};
use wld_raw::{FormatVersion, RawWld};
use wld_test_utils::fixtures::character_graph;

const CHUNKS: usize = 256;

fn bench_build(c: &mut Criterion) {
    let raw = RawWld::from_bytes(&zone_bytes(FormatVersion::Legacy, CHUNKS)).unwrap();
    c.bench_function("graph_build_zone_256", |b| {
        b.iter(|| {
            let graph = GraphBuilder::build(black_box(&raw)).unwrap();
            black_box(&graph);
        });
    });
}

fn bench_encode(c: &mut Criterion) {
    let graph = zone_profile(FormatVersion::Legacy, CHUNKS);
    c.bench_function("graph_encode_zone_256", |b| {
        b.iter(|| {
            let raw = GraphEncoder::encode(black_box(&graph)).unwrap();
            black_box(&raw);
        });
    });
}

fn bench_export_zone(c: &mut Criterion) {
    let graph = zone_profile(FormatVersion::Legacy, CHUNKS);
    let config = ExportConfig::default();
    c.bench_function("ascii_export_zone_256", |b| {
        b.iter(|| {
            let tree = AsciiExporter::new(black_box(&graph), &config)
                .export()
                .unwrap();
            black_box(&tree);
        });
    });
}

fn bench_export_character(c: &mut Criterion) {
    let graph = character_graph(FormatVersion::Legacy);
    let config = ExportConfig::default();
    c.bench_function("ascii_export_character", |b| {
        b.iter(|| {
            let tree = AsciiExporter::new(black_box(&graph), &config)
                .export()
                .unwrap();
            black_box(&tree);
        });
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_encode,
    bench_export_zone,
    bench_export_character,
);
criterion_main!(benches);
