use chained_table::fnv::fnv1a_64;
use chained_table::{ChainedTable, Entry};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn entry(k: String, v: u64) -> Entry<String, u64> {
    Entry::new(fnv1a_64(k.as_bytes()), k, v)
}

fn filled(seed: u64, n: usize) -> (ChainedTable<String, u64>, Vec<String>) {
    let mut t = ChainedTable::with_buckets(16).unwrap();
    let keys: Vec<_> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().cloned().enumerate() {
        t.insert(entry(k, i as u64));
    }
    (t, keys)
}

fn bench_insert(c: &mut Criterion) {
    // Starts small so the run crosses several growth steps.
    c.bench_function("chained_table_insert_10k", |b| {
        let entries: Vec<_> = lcg(1).take(10_000).map(key).collect();
        b.iter_batched(
            || {
                let t = ChainedTable::<String, u64>::with_buckets(1).unwrap();
                (t, entries.clone())
            },
            |(mut t, keys)| {
                for (i, k) in keys.into_iter().enumerate() {
                    t.insert(entry(k, i as u64));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit(c: &mut Criterion) {
    c.bench_function("chained_table_find_hit", |b| {
        let (t, keys) = filled(7, 20_000);
        let hashed: Vec<_> = keys.iter().map(|k| (fnv1a_64(k.as_bytes()), k)).collect();
        let mut it = hashed.iter().cycle();
        b.iter(|| {
            let (h, k) = it.next().unwrap();
            black_box(t.find(*h, k).unwrap());
        })
    });
}

fn bench_find_miss(c: &mut Criterion) {
    c.bench_function("chained_table_find_miss", |b| {
        let (t, _) = filled(11, 10_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in the table
            let k = key(miss.next().unwrap());
            black_box(t.find(fnv1a_64(k.as_bytes()), &k));
        })
    });
}

fn bench_cursor_remove_every_third(c: &mut Criterion) {
    c.bench_function("chained_table_cursor_remove_every_third_10k", |b| {
        b.iter_batched(
            || filled(3, 10_000).0,
            |mut t| {
                let mut cur = t.cursor();
                let mut i = 0usize;
                while cur.is_valid() {
                    if i % 3 == 0 {
                        black_box(cur.remove());
                    } else {
                        cur.advance();
                    }
                    i += 1;
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_find_hit, bench_find_miss, bench_cursor_remove_every_third
}
criterion_main!(benches);
