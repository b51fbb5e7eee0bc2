// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;

use trellis_element::context::Context;
use trellis_element::element::{Element, boxed};
use trellis_element::headless::HeadlessView;
use trellis_element::surface::Recorder;
use trellis_list::axis::AxisLimits;
use trellis_list::composer::{FnContent, WithLimits};
use trellis_list::list::List;

struct Row;
impl Element for Row {}

fn fixed_list(len: usize) -> List {
    let composer = WithLimits::new(FnContent::new(len, |_| boxed(Row)), 20.0, AxisLimits::FULL);
    List::vertical(Box::new(composer))
}

fn bench_table_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("list/rebuild");

    // Hypothesis: the offset-table rebuild is O(n) and materializes
    // nothing, so it stays cheap even for very large lists.
    for len in [1_000_usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let view = HeadlessView::new();
            let bounds = Rect::new(0.0, 0.0, 200.0, 20.0 * len as f64);
            b.iter_batched(
                || fixed_list(len),
                |mut list| {
                    let ctx = Context::root(&view, bounds);
                    list.sync(&ctx);
                    black_box(list.main_axis_full_size());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_draw_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("list/draw_visible");

    // Hypothesis: a draw pass is O(log n + v) for v visible cells, so
    // the list size barely matters once the table is built.
    for len in [1_000_usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let view = HeadlessView::new();
            let bounds = Rect::new(0.0, 0.0, 200.0, 20.0 * len as f64);
            let mid = 10.0 * len as f64;
            let window = Rect::new(0.0, mid, 200.0, mid + 400.0);
            let ctx = Context::root(&view, bounds);
            let mut list = fixed_list(len);
            list.sync(&ctx);

            b.iter(|| {
                let mut surface = Recorder::new(window);
                list.draw(&ctx, &mut surface);
                black_box(list.materialized());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_table_rebuild, bench_draw_walk);
criterion_main!(benches);
