//! Benchmarks for the Arbor foundation layer.
//!
//! Run with: `cargo bench --package arbor_foundation`

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use arbor_foundation::{PlainRenderer, StringReader, Text, TextRenderer, Value};

// =============================================================================
// Reader Benchmarks
// =============================================================================

fn bench_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader");

    group.bench_function("quoted_with_escapes", |b| {
        let input = r#""a fairly long \"quoted\" string with \\ escapes""#;
        b.iter(|| {
            let mut reader = StringReader::new(black_box(input));
            black_box(reader.read_quoted_string())
        });
    });

    group.bench_function("ints", |b| {
        let input = "12 -7 300000 42 0 99 -1 5";
        b.iter(|| {
            let mut reader = StringReader::new(black_box(input));
            while reader.can_read() {
                black_box(reader.read_int().ok());
                reader.skip_whitespace();
            }
        });
    });

    group.finish();
}

// =============================================================================
// Text Benchmarks
// =============================================================================

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("text");

    group.bench_function("render_translatable", |b| {
        let text = Text::translatable_with(
            "argument.integer.low",
            "Integer must not be less than %s, found %s",
            vec![Text::plain("1"), Text::plain("0")],
        );
        b.iter(|| black_box(PlainRenderer.render_plain(&text)));
    });

    group.bench_function("value_list_clone", |b| {
        let v = Value::from((0..1000).map(i64::from).collect::<Vec<_>>());
        b.iter(|| black_box(v.clone()));
    });

    group.finish();
}

criterion_group!(benches, bench_reader, bench_text);
criterion_main!(benches);
