use chained_table::Chain;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn bench_push_pop(c: &mut Criterion) {
    c.bench_function("chain_push_pop_10k", |b| {
        b.iter(|| {
            let mut chain = Chain::new();
            for i in 0..10_000u64 {
                chain.push(i);
            }
            while let Some(v) = chain.pop() {
                black_box(v);
            }
        })
    });
}

fn bench_append_slice(c: &mut Criterion) {
    c.bench_function("chain_append_slice_10k", |b| {
        b.iter(|| {
            let mut chain = Chain::new();
            for i in 0..10_000u64 {
                chain.append(i);
            }
            while let Some(v) = chain.slice() {
                black_box(v);
            }
        })
    });
}

fn bench_iter(c: &mut Criterion) {
    c.bench_function("chain_iter_10k", |b| {
        let chain: Chain<u64> = (0..10_000).collect();
        b.iter(|| black_box(chain.iter().sum::<u64>()))
    });
}

fn bench_cursor_drain_odd(c: &mut Criterion) {
    c.bench_function("chain_cursor_drain_odd_10k", |b| {
        b.iter_batched(
            || (0..10_000u64).collect::<Chain<u64>>(),
            |mut chain| {
                let mut cur = chain.cursor();
                while let Some(&v) = cur.get() {
                    if v % 2 == 1 {
                        cur.remove(|p| {
                            black_box(p);
                        });
                    } else {
                        cur.advance();
                    }
                }
                black_box(chain)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_push_pop, bench_append_slice, bench_iter, bench_cursor_drain_odd
}
criterion_main!(benches);
