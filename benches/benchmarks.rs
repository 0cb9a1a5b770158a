//! Benchmarks for feature encoding.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_encoder::{
    canonical_string, flatten, EncoderConfig, FeatureEncoder, FeatureRequest, SeedTable, ToValue,
    Value,
};

// =============================================================================
// Typed context for benchmarking
// =============================================================================

#[derive(Clone)]
struct BenchContext {
    os: String,
    app_version: String,
    hour: u8,
    returning: bool,
    tags: Vec<String>,
}

impl ToValue for BenchContext {
    fn to_value(&self) -> Value {
        Value::mapping([
            ("os", self.os.to_value()),
            ("app_version", self.app_version.to_value()),
            ("hour", self.hour.to_value()),
            ("returning", self.returning.to_value()),
            ("tags", self.tags.to_value()),
        ])
    }
}

fn bench_context() -> BenchContext {
    BenchContext {
        os: "ios".to_string(),
        app_version: "7.2.1".to_string(),
        hour: 13,
        returning: true,
        tags: vec!["beta".to_string(), "premium".to_string()],
    }
}

const NESTED: &str = r#"{
    "string": "string",
    "zero": 0,
    "nested dict": {"one": 1, "nested dict": {"minus one": -1}},
    "nested array": [2.2, [-2.2, {"true": true, "false": false}]],
    "nulls": [[], {}]
}"#;

fn encoder() -> FeatureEncoder {
    let table = SeedTable::new([("context", 3u64), ("variant", 5), ("device", 7)], 4096, 42)
        .expect("seed table");
    FeatureEncoder::new(table, EncoderConfig::default()).expect("encoder")
}

fn nested() -> Value {
    Value::from_json(NESTED).expect("nested fixture")
}

fn benchmark_flatten(c: &mut Criterion) {
    let value = nested();

    c.bench_function("flatten_nested", |b| b.iter(|| flatten(black_box(&value))));
}

fn benchmark_canonical_string(c: &mut Criterion) {
    let value = nested();
    let with_id = Value::mapping([
        ("id", Value::String("sku-123".to_string())),
        ("payload", nested()),
    ]);

    let mut group = c.benchmark_group("canonical_string");

    group.bench_function("full", |b| b.iter(|| canonical_string(black_box(&value))));

    group.bench_function("id_short_circuit", |b| {
        b.iter(|| canonical_string(black_box(&with_id)))
    });

    group.finish();
}

fn benchmark_encode_context(c: &mut Criterion) {
    let enc = encoder();
    let value = nested();

    c.bench_function("encode_context", |b| {
        b.iter(|| enc.encode_context(black_box(&value), 0.0))
    });

    c.bench_function("encode_context_noisy", |b| {
        b.iter(|| enc.encode_context(black_box(&value), 0.5))
    });
}

fn benchmark_typed_vs_json(c: &mut Criterion) {
    let enc = encoder();

    // Same data, two construction paths
    let context = bench_context();
    let json = r#"{"os":"ios","app_version":"7.2.1","hour":13,"returning":true,"tags":["beta","premium"]}"#;

    let mut group = c.benchmark_group("value_construction");

    group.bench_function("json_path", |b| {
        b.iter(|| {
            Value::from_json(black_box(json)).and_then(|value| enc.encode_context(&value, 0.0))
        })
    });

    group.bench_function("typed_path", |b| {
        b.iter(|| enc.encode_context(&black_box(&context).to_value(), 0.0))
    });

    group.finish();
}

fn benchmark_encode_features(c: &mut Criterion) {
    let enc = encoder();
    let request = FeatureRequest::new()
        .with_context("context", nested())
        .with_context("device", bench_context().to_value())
        .with_variant(
            "variant",
            Value::from_json(r#"{"theme": "dark", "size": 3}"#).expect("variant"),
        );

    let context_only = FeatureRequest {
        context: request.context.clone(),
        variant: BTreeMap::new(),
    };
    let base = enc.encode_features(&context_only, 0.0, None).expect("base row");

    let mut group = c.benchmark_group("encode_features");

    group.bench_function("fresh_context", |b| {
        b.iter(|| enc.encode_features(black_box(&request), 0.0, None))
    });

    group.bench_function("base_context", |b| {
        b.iter(|| enc.encode_features(black_box(&request), 0.0, Some(&base)))
    });

    group.finish();
}

fn benchmark_encode_variants(c: &mut Criterion) {
    let enc = encoder();
    let context: BTreeMap<String, Value> = [("context".to_string(), nested())].into();
    let variants: Vec<BTreeMap<String, Value>> = (0..100)
        .map(|i| {
            let variant = Value::mapping([
                ("sku", Value::String(format!("sku-{i}"))),
                ("rank", Value::Integer(i)),
            ]);
            [("variant".to_string(), variant)].into()
        })
        .collect();

    c.bench_function("encode_variants_100", |b| {
        b.iter(|| enc.encode_variants(black_box(&context), black_box(&variants), 0.0))
    });
}

criterion_group!(
    benches,
    benchmark_flatten,
    benchmark_canonical_string,
    benchmark_encode_context,
    benchmark_typed_vs_json,
    benchmark_encode_features,
    benchmark_encode_variants,
);

criterion_main!(benches);
