//! Benchmarks for pattern compilation and rule application
//!
//! Rule sets are compiled once and applied to many records, so the second
//! group matters most.
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use metafield_core::rules::format_to_regex;
use metafield_core::{MetadataPipeline, Notice, NoticeSink, Record, RuleSpec};
use serde_json::json;
use std::sync::Arc;

struct Discard;

impl NoticeSink for Discard {
    fn report(&self, _notice: &Notice) {}
}

fn create_record(i: usize) -> Record {
    Record::try_from(json!({
        "id": format!("video{}", i),
        "title": format!("Artist {} - Track {} (Official Video)", i % 17, i),
        "uploader": format!("Channel {}", i % 5),
        "description": "Recorded live.\nMore info in the links below.",
        "duration": 180 + i,
    }))
    .unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for template in [
        "title",
        "%(artist)s - %(track)s",
        "[%(id)s] %(uploader)s: %(title)s (%(year)s).%(ext)s",
    ] {
        group.bench_with_input(BenchmarkId::new("format_to_regex", template), template, |b, t| {
            b.iter(|| format_to_regex(black_box(t)))
        });
    }

    group.bench_function("pipeline_new", |b| {
        b.iter(|| {
            MetadataPipeline::new(black_box([
                RuleSpec::interpret("title", "%(artist)s - %(track)s"),
                RuleSpec::replace("track", r"\s*\(Official Video\)$", ""),
                RuleSpec::interpret("%(uploader)s", "Channel %(channel_no)s"),
            ]))
        })
    });

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let pipeline = MetadataPipeline::new([
        RuleSpec::interpret("title", "%(artist)s - %(track)s"),
        RuleSpec::replace("track", r"\s*\(Official Video\)$", ""),
        RuleSpec::interpret("%(uploader)s", "Channel %(channel_no)s"),
        RuleSpec::replace("description", r"\n.*", ""),
    ])
    .unwrap()
    .with_sink(Arc::new(Discard));

    let mut group = c.benchmark_group("apply");
    for size in [1usize, 100, 1000] {
        let records: Vec<Record> = (0..size).map(create_record).collect();
        group.bench_with_input(BenchmarkId::new("run_batch", size), &records, |b, records| {
            b.iter(|| pipeline.run_batch(black_box(records.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_apply);
criterion_main!(benches);
