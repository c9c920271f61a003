// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Size, Vec2};
use understory_infinite_grid::{
    GridEngine, GridOptions, ObservableGrid, TileSetChange, visible_coordinates,
};

const FRAMES: u64 = 1_000;

fn bench_camera_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("infinite_grid/pan");
    group.throughput(Throughput::Elements(FRAMES));

    // Hypothesis: per-frame cost is dominated by the range check when membership
    // is unchanged, and grows with margin only on the frames that cross a tile edge.
    for margin in [0_u32, 1, 4] {
        for speed in [1.0_f64, 40.0] {
            let label = format!("margin{margin}/speed{speed}");
            group.bench_with_input(BenchmarkId::new("engine", label), &speed, |b, &speed| {
                let options = GridOptions::new().with_margin(margin);
                let mut engine = GridEngine::with_options(Size::new(800.0, 600.0), options).unwrap();
                b.iter(|| {
                    for _ in 0..FRAMES {
                        let change = engine.pan_by(Vec2::new(speed, speed * 0.5)).unwrap();
                        black_box(change);
                    }
                    black_box(engine.items().len());
                });
            });
        }
    }

    group.finish();
}

fn bench_observable_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("infinite_grid/observable");
    group.throughput(Throughput::Elements(FRAMES));

    group.bench_function("per_axis_spring_ticks", |b| {
        let mut grid = ObservableGrid::new(GridOptions::default());
        grid.set_content_size(Size::new(800.0, 600.0)).unwrap();
        grid.subscribe(|change: &TileSetChange| {
            black_box(change.entered.len());
        });
        let mut t = 0.0_f64;
        b.iter(|| {
            for _ in 0..FRAMES {
                t += 0.016;
                grid.set_camera_x(t.sin() * 2_000.0).unwrap();
                grid.set_camera_y(t.cos() * 1_500.0).unwrap();
            }
        });
    });

    group.finish();
}

fn bench_visible_coordinates(c: &mut Criterion) {
    let mut group = c.benchmark_group("infinite_grid/visible_coordinates");

    for tile in [400.0_f64, 50.0, 10.0] {
        let tile_size = Size::new(tile, tile);
        let len = visible_coordinates(Vec2::ZERO, Size::new(800.0, 600.0), tile_size, 1).len();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tile), &tile_size, |b, &tile_size| {
            b.iter(|| {
                let range = visible_coordinates(
                    black_box(Vec2::new(1_234.5, -678.9)),
                    Size::new(800.0, 600.0),
                    tile_size,
                    1,
                );
                black_box(range.iter().count())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_camera_pan,
    bench_observable_ticks,
    bench_visible_coordinates
);
criterion_main!(benches);
