//! Benchmarks for the loam-pack pipeline's pure stages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Map, Value};

use loam_pack::manifest::{validate, ValidationRules};
use loam_pack::tool::{encode_list, parse_list};

fn manifest_with(count: usize) -> Value {
    let mut assets = Map::new();
    for i in 0..count {
        assets.insert(
            format!("asset_{i}"),
            json!({ "type": "image", "filename": format!("sprite_{i}.png"), "tags": ["bench", "sprite"] }),
        );
    }
    json!({ "packType": "game", "gameCode": "BNCH", "assets": assets })
}

// -- Validation benchmarks --

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    let rules = ValidationRules::default();

    let small = manifest_with(4);
    let large = manifest_with(1_000);

    group.bench_function("validate_small", |b| {
        b.iter(|| validate(black_box(&small), &rules).unwrap())
    });

    group.bench_function("validate_large", |b| {
        b.iter(|| validate(black_box(&large), &rules).unwrap())
    });

    group.finish();
}

// -- List literal benchmarks --

fn bench_list_literal(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_literal");

    let paths: Vec<String> = (0..1_000)
        .map(|i| format!("inter/image/sprite_{i}.ii"))
        .collect();
    let encoded = encode_list(&paths);

    group.bench_function("encode_paths", |b| b.iter(|| encode_list(black_box(&paths))));

    group.bench_function("parse_paths", |b| {
        b.iter(|| parse_list(black_box(&encoded)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_validation, bench_list_literal);
criterion_main!(benches);
