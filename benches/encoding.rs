//! Benchmarks for influxdb-line-writer.
//!
//! Measures line protocol encoding throughput; no server is needed.
//!
//! Run benchmarks: `cargo bench`

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use influxdb_line_writer::{LineProtocolWriter, Point, Precision};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generate points shaped like host metrics, with a fixed seed so runs are comparable
fn generate_points(count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(42);
    let base_ts = 1_700_000_000_000i64; // 2023-11-14

    (0..count)
        .map(|i| {
            Point::builder("cpu")
                .unwrap()
                .tag("host", format!("server{}", rng.gen_range(0..100)))
                .unwrap()
                .tag("region", "us-east")
                .unwrap()
                .field("usage_user", rng.gen_range(0.0..100.0))
                .field("usage_system", rng.gen_range(0.0..100.0))
                .field("procs", rng.gen_range(0..4096i64))
                .field("healthy", rng.gen_bool(0.95))
                .timestamp(Utc.timestamp_millis_opt(base_ts + i as i64 * 1000).unwrap())
                .build()
        })
        .collect()
}

/// Points whose names and values all need escaping
fn generate_escaped_points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| {
            Point::builder("disk usage,mount")
                .unwrap()
                .tag("path", format!("/var/lib/data {}", i))
                .unwrap()
                .tag("label", "a=b,c")
                .unwrap()
                .field("note", r#"quoted "text" with \ backslash"#)
                .field("free bytes", i as u64)
                .build()
        })
        .collect()
}

/// Benchmark batch encoding across batch sizes
fn bench_encode_batch(c: &mut Criterion) {
    let sizes = [100, 1_000, 10_000];

    let mut group = c.benchmark_group("encode_batch");
    for size in sizes {
        let points = generate_points(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("points", size), &points, |b, points| {
            b.iter(|| {
                let mut writer = LineProtocolWriter::new(Precision::Millisecond);
                writer.write_all(points).unwrap();
                writer.len()
            });
        });
    }
    group.finish();
}

/// Benchmark the escaping-heavy path
fn bench_encode_escaped(c: &mut Criterion) {
    let points = generate_escaped_points(1_000);

    let mut group = c.benchmark_group("encode_escaped");
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("1k_points", |b| {
        b.iter(|| {
            let mut writer = LineProtocolWriter::new(Precision::Nanosecond);
            writer.write_all(&points).unwrap();
            writer.len()
        });
    });
    group.finish();
}

/// Benchmark reusing one writer allocation across batches
fn bench_reuse_writer(c: &mut Criterion) {
    let points = generate_points(1_000);
    let mut writer = LineProtocolWriter::new(Precision::Second);

    c.bench_function("reuse_writer_1k", |b| {
        b.iter(|| {
            writer.clear();
            writer.write_all(&points).unwrap();
            writer.len()
        });
    });
}

criterion_group!(
    benches,
    bench_encode_batch,
    bench_encode_escaped,
    bench_reuse_writer,
);

criterion_main!(benches);
