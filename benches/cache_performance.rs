//! Cache and Query Performance Benchmarks
//!
//! This benchmark suite measures the hot paths of resource resolution:
//! identity map lookups, in-memory cache regions, and query compilation.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use idm_client::cache::InMemoryCache;
use idm_client::identity_map::IdentityMap;
use idm_client::query::{QueryOperation, SortDirection, compile, field, render};
use idm_client::resource::ResourceData;
use idm_client::serializer::PropertyMap;
use serde_json::json;
use std::time::Duration;

fn account_href(id: usize) -> String {
    format!("https://api.example.com/v1/accounts/{}", id)
}

fn account_properties(id: usize) -> PropertyMap {
    match json!({
        "href": account_href(id),
        "username": format!("user{}", id),
        "email": format!("user{}@example.com", id),
        "status": "ENABLED",
        "directory": {"href": "https://api.example.com/v1/directories/7"}
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Benchmark identity map hits and misses
fn bench_identity_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity_map");

    for size in [10, 1_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("get_or_add_hit", size), size, |b, &size| {
            let map: IdentityMap<ResourceData> = IdentityMap::new(Duration::from_secs(60));
            for id in 0..size {
                let _ = map.get_or_add(&account_href(id), ResourceData::new, false);
            }
            let hrefs: Vec<String> = (0..size).map(account_href).collect();

            b.iter(|| {
                for href in &hrefs {
                    let _ = black_box(map.get_or_add(href, ResourceData::new, false));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("get_miss", size), size, |b, &size| {
            let map: IdentityMap<ResourceData> = IdentityMap::new(Duration::from_secs(60));
            let hrefs: Vec<String> = (0..size).map(account_href).collect();

            b.iter(|| {
                for href in &hrefs {
                    let _ = black_box(map.get(href));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark put and get against a cache region
fn bench_cache_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_region");

    for size in [10, 1_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        let entries: Vec<(String, PropertyMap)> = (0..*size)
            .map(|id| (account_href(id), account_properties(id)))
            .collect();

        group.bench_with_input(BenchmarkId::new("put", size), &entries, |b, entries| {
            let cache = InMemoryCache::new("accounts", Some(Duration::from_secs(300)), None);
            b.iter(|| {
                for (href, properties) in entries {
                    black_box(cache.put(href, properties.clone()));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("get", size), &entries, |b, entries| {
            let cache = InMemoryCache::new("accounts", Some(Duration::from_secs(300)), None);
            for (href, properties) in entries {
                cache.put(href, properties.clone());
            }
            b.iter(|| {
                for (href, _) in entries {
                    black_box(cache.get(href));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark query compilation and rendering
fn bench_query_compile(c: &mut Criterion) {
    let operations = vec![
        QueryOperation::Where(field("email").ends_with("@example.com") & field("status").eq("ENABLED")),
        QueryOperation::Where(field("createdAt").gte(10) & field("createdAt").lt(20)),
        QueryOperation::OrderBy {
            field: "surname".to_string(),
            direction: SortDirection::Ascending,
        },
        QueryOperation::Skip(50),
        QueryOperation::Take(100),
    ];

    c.bench_function("compile_and_render", |b| {
        b.iter(|| {
            let model = compile(black_box(&operations)).unwrap();
            black_box(render(&model, 25))
        });
    });
}

criterion_group!(
    benches,
    bench_identity_map,
    bench_cache_region,
    bench_query_compile
);
criterion_main!(benches);
