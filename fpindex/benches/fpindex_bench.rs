use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fpindex::{Config, Indexer, TrackRef};

/// Deterministic hash-code array so every run indexes the same corpus.
/// Codes are folded into a 16-bit space to force shared buckets.
fn codes(tables: usize, seed: u64) -> Vec<u64> {
    let mut state = seed;
    (0..tables)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 16) & 0xffff
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("fpindex_insert_25_tables", |b| {
        let idx = Indexer::with_memory_registry(Config {
            tables: 25,
            hash_width: 4,
        });
        let track = TrackRef::new("track:bench");
        let mut n = 0u64;
        b.iter(|| {
            let hashes = codes(25, n);
            n += 1;
            let _ = black_box(idx.insert(black_box(&hashes), n as u32, n as f64 * 0.046, &track));
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let idx = Indexer::with_memory_registry(Config {
        tables: 25,
        hash_width: 4,
    });
    let track = TrackRef::new("track:bench");
    for n in 0..10_000u64 {
        let hashes = codes(25, n);
        idx.insert(&hashes, n as u32, n as f64 * 0.046, &track)
            .unwrap();
    }

    let probe = codes(25, 424_242);
    c.bench_function("fpindex_query_25_tables_10k_corpus", |b| {
        b.iter(|| {
            let _ = black_box(idx.query(black_box(&probe), 5));
        });
    });
}

criterion_group!(benches, bench_insert, bench_query);
criterion_main!(benches);
