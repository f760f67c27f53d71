use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_tdf::{from_slice, from_str, reflect_record, to_string, to_vec, Mapper};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone, Default)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct NestedData {
    id: u32,
    metadata: Metadata,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone)]
struct Metadata {
    created: String,
    updated: String,
    version: u32,
}

reflect_record!(Product in "bench" { sku: String, name: String, price: f64, quantity: u32 });

fn sample_user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn nested() -> NestedData {
    NestedData {
        id: 42,
        metadata: Metadata {
            created: "2023-01-01T00:00:00Z".to_string(),
            updated: "2023-12-31T23:59:59Z".to_string(),
            version: 3,
        },
        tags: vec![
            "important".to_string(),
            "verified".to_string(),
            "production".to_string(),
        ],
    }
}

fn benchmark_simple(c: &mut Criterion) {
    let user = sample_user();
    let text = to_string(&user).unwrap();
    let bytes = to_vec(&user).unwrap();

    c.bench_function("text_serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
    c.bench_function("text_deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(&text)))
    });
    c.bench_function("binary_serialize_simple_struct", |b| {
        b.iter(|| to_vec(black_box(&user)))
    });
    c.bench_function("binary_deserialize_simple_struct", |b| {
        b.iter(|| from_slice::<User>(black_box(&bytes)))
    });
}

fn benchmark_arrays(c: &mut Criterion) {
    let mut text_group = c.benchmark_group("text_array");
    for size in [10, 50, 100, 500].iter() {
        let items = products(*size);
        let text = to_string(&items).unwrap();
        text_group.bench_with_input(BenchmarkId::new("serialize", size), &items, |b, items| {
            b.iter(|| to_string(black_box(items)))
        });
        text_group.bench_with_input(BenchmarkId::new("deserialize", size), &text, |b, text| {
            b.iter(|| from_str::<Vec<Product>>(black_box(text)))
        });
    }
    text_group.finish();

    let mut binary_group = c.benchmark_group("binary_array");
    for size in [10, 50, 100, 500].iter() {
        let items = products(*size);
        let bytes = to_vec(&items).unwrap();
        binary_group.bench_with_input(BenchmarkId::new("serialize", size), &items, |b, items| {
            b.iter(|| to_vec(black_box(items)))
        });
        binary_group.bench_with_input(BenchmarkId::new("deserialize", size), &bytes, |b, bytes| {
            b.iter(|| from_slice::<Vec<Product>>(black_box(bytes)))
        });
    }
    binary_group.finish();
}

fn benchmark_nested(c: &mut Criterion) {
    let data = nested();
    let text = to_string(&data).unwrap();

    c.bench_function("serialize_nested_struct", |b| {
        b.iter(|| to_string(black_box(&data)))
    });
    c.bench_function("deserialize_nested_struct", |b| {
        b.iter(|| from_str::<NestedData>(black_box(&text)))
    });
}

fn benchmark_mapper(c: &mut Criterion) {
    let mapper = Mapper::new();
    let items = products(100);
    let value = mapper.encode_as(&items).unwrap();

    let mut group = c.benchmark_group("mapper");
    group.bench_function("encode_100_records", |b| {
        b.iter(|| mapper.encode_as(black_box(&items)))
    });
    group.bench_function("decode_100_records", |b| {
        b.iter(|| mapper.decode_as::<Vec<Product>>(black_box(&value)))
    });
    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = sample_user();
    let mut group = c.benchmark_group("comparison");

    group.bench_function("tdf_text_serialize", |b| {
        b.iter(|| serde_tdf::to_string(black_box(&user)))
    });
    group.bench_function("tdf_binary_serialize", |b| {
        b.iter(|| serde_tdf::to_vec(black_box(&user)))
    });
    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let text = serde_tdf::to_string(&user).unwrap();
    let json = serde_json::to_string(&user).unwrap();

    group.bench_function("tdf_text_deserialize", |b| {
        b.iter(|| serde_tdf::from_str::<User>(black_box(&text)))
    });
    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_simple,
    benchmark_arrays,
    benchmark_nested,
    benchmark_mapper,
    benchmark_comparison_with_json
);
criterion_main!(benches);
