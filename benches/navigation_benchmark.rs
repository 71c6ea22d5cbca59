//! Navigation benchmark: Measure cursor movement and line lookup.
//!
//! Vertical movement near the anchored line should not depend on how far
//! into the buffer it happens.

use chunktext::position::coords_of;
use chunktext::{BufferConfig, Direction, TextBuffer, Viewport};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn loaded(lines: usize) -> TextBuffer {
    let text: Vec<u8> = (0..lines)
        .flat_map(|i| format!("line {i}\twith\ttabs and some text\n").into_bytes())
        .collect();
    let mut buffer = TextBuffer::new(BufferConfig::default()).unwrap();
    buffer.load_from(&text[..]).unwrap();
    buffer
}

fn nav_horizontal(c: &mut Criterion) {
    let mut buffer = loaded(1_000);
    buffer.move_cursor_to(buffer.total_size() / 2).unwrap();

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            buffer.move_cursor_relative(black_box(Direction::Right)).unwrap();
            buffer.move_cursor_relative(black_box(Direction::Left)).unwrap();
        });
    });
}

fn nav_vertical_anchored(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_up_down_anchored");

    for lines in [1_000, 50_000] {
        let mut buffer = loaded(lines);
        let mut view = Viewport::new(50, 120);
        buffer.page_down(lines / 2).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter(|| {
                buffer.move_cursor_relative(Direction::Up).unwrap();
                buffer.move_cursor_relative(Direction::Down).unwrap();
            });
        });
    }

    group.finish();
}

fn nav_find_line_start(c: &mut Criterion) {
    let buffer = loaded(50_000);

    c.bench_function("find_line_start_25k_cold", |b| {
        b.iter(|| buffer.find_line_start(black_box(25_000)).unwrap());
    });
}

fn nav_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate_middle");

    for lines in [1_000, 50_000] {
        let buffer = loaded(lines);
        let middle = buffer.total_size() / 2;

        group.bench_with_input(BenchmarkId::from_parameter(lines), &middle, |b, &abs| {
            b.iter(|| buffer.storage().locate(black_box(abs)).unwrap());
        });
    }

    group.finish();
}

fn nav_coords(c: &mut Criterion) {
    let mut buffer = loaded(50_000);
    let anchor = buffer.anchor_line(25_000).unwrap();
    let target = anchor.abs + 40;
    let tab_stop = buffer.config().tab_stop;

    c.bench_function("coords_from_anchor", |b| {
        b.iter(|| coords_of(buffer.storage(), black_box(target), Some(anchor), tab_stop).unwrap());
    });
    c.bench_function("coords_from_head", |b| {
        b.iter(|| coords_of(buffer.storage(), black_box(target), None, tab_stop).unwrap());
    });
}

fn nav_visible_lines(c: &mut Criterion) {
    let mut buffer = loaded(50_000);
    let mut view = Viewport::new(50, 120);
    buffer.page_down(25_000).unwrap();
    view.scroll_to_cursor(&mut buffer).unwrap();

    c.bench_function("visible_50_lines", |b| {
        b.iter(|| {
            let visible: Vec<_> = view.visible_lines(black_box(&buffer)).collect();
            black_box(visible)
        });
    });
}

criterion_group!(
    benches,
    nav_horizontal,
    nav_vertical_anchored,
    nav_find_line_start,
    nav_locate,
    nav_coords,
    nav_visible_lines,
);

criterion_main!(benches);
