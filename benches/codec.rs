//! Criterion benchmarks for the SUM codec
//!
//! Benchmarks the core performance-critical operations:
//! - Ranges: column list encoding and parsing
//! - Parser: script parsing
//! - Encoder: bitmap to document conversion
//! - Renderer: document to image rendering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sumimg::encoder::{encode_bitmap, Bitmap};
use sumimg::fmt::to_sum_string;
use sumimg::parser::{parse_stream, parse_str};
use sumimg::ranges::{encode_columns, parse_columns};
use sumimg::renderer::render_frames;
use std::collections::BTreeSet;
use std::io::Cursor;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Alternating runs of 1..=3 columns across `width`
fn make_columns(width: u32) -> BTreeSet<u32> {
    (1..=width).filter(|c| c % 7 < 3 || c % 11 == 0).collect()
}

/// A checker-and-stripe pattern that produces both long runs and repeated rows
fn make_bitmap(width: u32, height: u32) -> Bitmap {
    Bitmap::from_fn(width, height, |x, y| match y % 4 {
        0 => true,
        1 => (x / 3) % 2 == 0,
        2 => false,
        _ => (x + y) % 5 == 0,
    })
}

fn make_script(width: u32, height: u32, frames: usize) -> String {
    let document = encode_bitmap(&make_bitmap(width, height), false).expect("valid bitmap");
    let text = to_sum_string(&document);
    if frames < 2 {
        return text;
    }

    let (header, body) = text.split_once("b{").expect("still section");
    let header = header.replacen("bpx=", "fps=12\nbpx=", 1);
    let section = format!("f{}", body);
    let mut script = header;
    for _ in 0..frames {
        script.push_str(&section);
    }
    script
}

// =============================================================================
// Range Benchmarks
// =============================================================================

fn bench_ranges(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranges");

    for width in [32u32, 256, 2048].iter() {
        let columns = make_columns(*width);
        let list = encode_columns(&columns);

        group.throughput(Throughput::Elements(u64::from(*width)));
        group.bench_with_input(BenchmarkId::new("encode_columns", width), &columns, |b, cols| {
            b.iter(|| encode_columns(black_box(cols)))
        });
        group.bench_with_input(BenchmarkId::new("parse_columns", width), &list, |b, list| {
            b.iter(|| parse_columns(black_box(list), &[], *width))
        });
    }

    let defined = vec![make_columns(64), make_columns(32)];
    group.bench_function("parse_columns_backrefs", |b| {
        b.iter(|| parse_columns(black_box("d1,d2,40-50,d1"), &defined, 64))
    });

    group.finish();
}

// =============================================================================
// Parser Benchmarks
// =============================================================================

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    for (width, height, frames) in [(16, 16, 1), (128, 128, 1), (64, 64, 24)].iter() {
        let script = make_script(*width, *height, *frames);
        let name = format!("parse_str_{}x{}x{}", width, height, frames);

        group.throughput(Throughput::Bytes(script.len() as u64));
        group.bench_function(&name, |b| b.iter(|| parse_str(black_box(&script))));
    }

    let script = make_script(128, 128, 1);
    group.bench_function("parse_stream_128x128", |b| {
        b.iter(|| parse_stream(Cursor::new(black_box(&script))))
    });

    group.finish();
}

// =============================================================================
// Encoder Benchmarks
// =============================================================================

fn bench_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder");

    for size in [16u32, 128, 512].iter() {
        let bitmap = make_bitmap(*size, *size);
        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(BenchmarkId::new("encode_bitmap", size), &bitmap, |b, bitmap| {
            b.iter(|| encode_bitmap(black_box(bitmap), false))
        });
    }

    group.finish();
}

// =============================================================================
// Renderer Benchmarks
// =============================================================================

fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderer");

    for (size, frames) in [(16u32, 1usize), (128, 1), (64, 24)].iter() {
        let script = make_script(*size, *size, *frames);
        let document = parse_str(&script).expect("valid script").document;
        let name = format!("render_frames_{}x{}x{}", size, size, frames);

        group.throughput(Throughput::Elements(u64::from(size * size) * *frames as u64));
        group.bench_function(&name, |b| b.iter(|| render_frames(black_box(&document))));
    }

    group.finish();
}

criterion_group!(benches, bench_ranges, bench_parser, bench_encoder, bench_renderer);

criterion_main!(benches);
