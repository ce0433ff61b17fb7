//! Performance benchmarks for the encryption codec and cache key derivation.
//!
//! Run with: cargo bench
//!
//! These benchmarks establish baseline performance metrics for:
//! - Envelope seal/open at various payload sizes
//! - Location write/read through the codec
//! - Cache key derivation for typical and overlong locators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use love2love::cache::cache_key;
use love2love::codec::{Coordinate, EncryptionCodec};
use love2love::config::CodecConfig;
use love2love::crypto::{open, seal, InMemoryKeyProvider, SymmetricKey};

/// Benchmark sealing with various payload sizes.
fn bench_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("seal");

    let key = SymmetricKey::generate();
    let sizes = vec![("32B", 32), ("1KB", 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        let data = vec![b'x'; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let envelope = seal(black_box(&key), black_box(data)).expect("seal failed");
                black_box(envelope);
            });
        });
    }

    group.finish();
}

/// Benchmark opening with various payload sizes.
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    let key = SymmetricKey::generate();
    let sizes = vec![("32B", 32), ("1KB", 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        let data = vec![b'x'; size];
        let envelope = seal(&key, &data).expect("seal failed for benchmark");

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &envelope,
            |b, envelope| {
                b.iter(|| {
                    let plaintext = open(black_box(&key), black_box(envelope)).expect("open failed");
                    black_box(plaintext);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a full location write followed by a read.
fn bench_location_roundtrip(c: &mut Criterion) {
    let codec = EncryptionCodec::new(CodecConfig::default(), &InMemoryKeyProvider::new())
        .expect("codec construction failed");
    let location = Coordinate::new(48.8566, 2.3522);

    c.bench_function("location_roundtrip", |b| {
        b.iter(|| {
            let fields = codec.write_location(black_box(location), "bench");
            black_box(codec.read_location(&fields));
        });
    });
}

/// Benchmark cache key derivation.
fn bench_cache_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_key");

    let overlong = format!("https://example.com/{}/photo.jpg?token=abc", "segment/".repeat(60));
    let locators = vec![
        (
            "typical",
            "https://firebasestorage.googleapis.com/v0/b/love2love/o/users%2F42%2Favatar.jpg?alt=media&token=1f2e".to_string(),
        ),
        ("overlong", overlong),
        ("unparsable", "not a url".to_string()),
    ];

    for (name, locator) in locators {
        group.bench_with_input(BenchmarkId::from_parameter(name), &locator, |b, locator| {
            b.iter(|| black_box(cache_key(black_box(locator))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_seal,
    bench_open,
    bench_location_roundtrip,
    bench_cache_key
);
criterion_main!(benches);
