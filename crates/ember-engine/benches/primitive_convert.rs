//! Benchmarks for primitive expansion and clip-run building.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ember_engine::coords::{ClipRect, Color, Viewport};
use ember_engine::render::{build_clip_runs, convert_primitives_to_vertices, extract_clip_rects, Primitive};

const VIEWPORT: Viewport = Viewport::new(1920.0, 1080.0);

/// `n` mixed primitives; every 16 share one clip box.
fn make_primitives(n: usize) -> Vec<Primitive> {
    (0..n)
        .map(|i| {
            let fi = i as f32;
            let (x, y) = ((fi * 7.3) % 1900.0, (fi * 13.7) % 1060.0);
            let color = Color::new((fi * 0.17) % 1.0, (fi * 0.31) % 1.0, (fi * 0.53) % 1.0, 1.0);
            let p = match i % 4 {
                0 => Primitive::rect(x, y, 20.0, 12.0, color),
                1 => Primitive::circle(x, y, 8.0, color),
                2 => Primitive::rounded_rect(x, y, 40.0, 20.0, 4.0, color),
                _ => Primitive::line(x, y, x + 30.0, y + 10.0, 2.0, color),
            };
            let group = (i / 16) as i32;
            p.with_clip((group % 2 == 0).then(|| ClipRect::new(group * 4, 0, 800, 600)))
        })
        .collect()
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_primitives_to_vertices");
    for &count in &[100, 1_000, 10_000] {
        let prims = make_primitives(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &prims, |b, prims| {
            b.iter(|| black_box(convert_primitives_to_vertices(black_box(prims), VIEWPORT)));
        });
    }
    group.finish();
}

fn bench_clip_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_clip_runs");
    for &count in &[1_000, 10_000] {
        let clips = extract_clip_rects(&make_primitives(count));
        let mut runs = Vec::new();
        group.bench_with_input(BenchmarkId::from_parameter(count), &clips, |b, clips| {
            b.iter(|| {
                build_clip_runs(clips.len(), black_box(clips), &mut runs);
                black_box(runs.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convert, bench_clip_runs);
criterion_main!(benches);
