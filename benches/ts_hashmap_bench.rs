use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use std::thread;
use ts_hashmap::{BuildHasherBuckets, TsHashMap};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

const BUCKETS: usize = 4_096;

fn filled(n: usize, seed: u64) -> (TsHashMap<u64, u64>, Vec<u64>) {
    let m = TsHashMap::new(BUCKETS);
    let keys: Vec<u64> = lcg(seed).take(n).map(|x| x >> 16).collect();
    for (i, k) in keys.iter().enumerate() {
        m.insert(*k, i as u64).unwrap();
    }
    (m, keys)
}

fn bench_insert_fresh_10k(c: &mut Criterion) {
    c.bench_function("ts::insert_fresh_10k", |b| {
        b.iter_batched(
            || TsHashMap::<u64, u64>::new(BUCKETS),
            |m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    let _ = m.insert(x >> 16, i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_update_existing_10k(c: &mut Criterion) {
    c.bench_function("ts::update_existing_10k", |b| {
        b.iter_batched(
            || filled(10_000, 2),
            |(m, keys)| {
                for k in &keys {
                    let _ = m.insert(*k, 0).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("ts::get_hit_10k", |b| {
        let (m, keys) = filled(10_000, 7);
        b.iter(|| {
            for k in &keys {
                black_box(m.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("ts::get_miss_10k", |b| {
        let (m, _) = filled(10_000, 11);
        let misses: Vec<u64> = lcg(0xdead_beef).take(10_000).map(|x| x | 1 << 63).collect();
        b.iter(|| {
            for k in &misses {
                black_box(m.get(k));
            }
        })
    });
}

fn bench_remove_all_10k(c: &mut Criterion) {
    c.bench_function("ts::remove_all_10k", |b| {
        b.iter_batched(
            || filled(10_000, 5),
            |(m, keys)| {
                for k in &keys {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_hashed_strings_get(c: &mut Criterion) {
    c.bench_function("ts::hashed_string_get_10k", |b| {
        let m: TsHashMap<String, u64, BuildHasherBuckets> =
            TsHashMap::with_hasher(BUCKETS, BuildHasherBuckets::default());
        let keys: Vec<String> = lcg(13).take(10_000).map(|x| format!("k{:016x}", x)).collect();
        for (i, k) in keys.iter().enumerate() {
            m.insert(k.clone(), i as u64).unwrap();
        }
        b.iter(|| {
            for k in &keys {
                black_box(m.get(k));
            }
        })
    });
}

// Four readers against one writer; measures how much the read side pays for
// writer preference.
fn bench_mixed_readers_writer(c: &mut Criterion) {
    c.bench_function("ts::mixed_4r_1w_2k_each", |b| {
        b.iter_batched(
            || Arc::new(filled(2_000, 17).0),
            |m| {
                let readers: Vec<_> = (0..4u64)
                    .map(|r| {
                        let m = Arc::clone(&m);
                        thread::spawn(move || {
                            for x in lcg(r + 100).take(2_000) {
                                black_box(m.get(&(x >> 16)));
                            }
                        })
                    })
                    .collect();
                for (i, x) in lcg(99).take(2_000).enumerate() {
                    let _ = m.insert(x >> 16, i as u64);
                }
                for r in readers {
                    r.join().unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_insert_fresh_10k, bench_update_existing_10k, bench_get_hit_10k,
        bench_get_miss_10k, bench_remove_all_10k, bench_hashed_strings_get,
        bench_mixed_readers_writer
}
criterion_main!(benches);
