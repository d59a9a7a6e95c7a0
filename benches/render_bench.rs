#![deny(warnings)]

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{fmt::Write, hint::black_box};
use svg_raster::*;

const WAVE_PATH: &str = "M10 80 C 40 10, 65 10, 95 80 S 150 150, 180 80 \
    Q 200 40 220 80 T 260 80 A 30 40 15 1 1 300 120 L 300 300 H 10 Z";

/// Document with a grid of overlapping translucent shapes
fn document(size: usize) -> String {
    let mut doc = format!("<svg width=\"{0}\" height=\"{0}\">", size);
    let step = size / 10;
    for i in 0..10 {
        for j in 0..10 {
            let (x, y) = (i * step, j * step);
            let _ = write!(
                doc,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"#ff000080\" stroke=\"blue\"/>\
                 <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"rgb(0, 128, 0)\" opacity=\"0.5\"/>",
                x + step / 2,
                y + step / 2,
                step,
                x,
                y,
                step,
                step / 2,
            );
        }
    }
    let _ = write!(doc, "<path d=\"{}\" fill-rule=\"nonzero\"/></svg>", WAVE_PATH);
    doc
}

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("path");
    group
        .throughput(Throughput::Bytes(WAVE_PATH.len() as u64))
        .bench_function("parse", |b| {
            b.iter(|| black_box(WAVE_PATH).parse::<Path>())
        })
        .bench_function("flatten fine", |b| {
            b.iter(|| Path::from_svg(black_box(WAVE_PATH), 256))
        });
    group.finish();
}

fn render_benchmark(c: &mut Criterion) {
    let options = RenderOptions::default();
    let doc = document(512);
    let mut group = c.benchmark_group("render");
    group
        .throughput(Throughput::Elements(201))
        .bench_function("document", |b| {
            b.iter_with_large_drop(|| render_document(black_box(&doc), &options))
        });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = parse_benchmark, render_benchmark
);
criterion_main!(benches);
