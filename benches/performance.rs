//! Performance benchmarks for the document codec and query builder.

use attrdoc::{decode, encode, Condition, Document, FormatOptions, Select};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

/// Document with `width` top-level sections, each holding nested leaves and an array.
fn make_document(width: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..width {
        doc.insert(
            format!("section{}", i),
            json!({
                "name": format!("entry {}", i),
                "count": i,
                "enabled": i % 2 == 0,
                "meta": {"owner": "bench", "score": i as f64 * 1.5},
                "tags": ["a", "b", i],
            }),
        );
    }
    doc
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for width in [1, 10, 100] {
        let doc = make_document(width);
        for (label, options) in [
            ("multiple", FormatOptions::default()),
            ("single", FormatOptions::default().with_multiple(false)),
        ] {
            group.bench_with_input(BenchmarkId::new(label, width), &doc, |b, doc| {
                b.iter(|| black_box(encode(doc, &options).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for width in [1, 10, 100] {
        let options = FormatOptions::default();
        let attrs = encode(&make_document(width), &options).unwrap();
        group.bench_with_input(BenchmarkId::new("json", width), &attrs, |b, attrs| {
            b.iter(|| black_box(decode(attrs, &options).unwrap()));
        });

        let text = FormatOptions::text();
        let attrs = encode(&make_document(width), &text).unwrap();
        group.bench_with_input(BenchmarkId::new("text", width), &attrs, |b, attrs| {
            b.iter(|| black_box(decode(attrs, &text).unwrap()));
        });
    }

    group.finish();
}

fn bench_render_query(c: &mut Criterion) {
    let base = Select::new("bench", "id", FormatOptions::default()).unwrap();

    c.bench_function("render_query", |b| {
        b.iter(|| {
            let query = base
                .filter(
                    Condition::eq("section1.name", "entry 1")
                        .or(Condition::gt("section1.count", 10))
                        .and(Condition::eq("section1.tags[]", Value::from("a"))),
                )
                .unwrap();
            black_box(query.to_string())
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_render_query);
criterion_main!(benches);
