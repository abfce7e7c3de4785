/* std use */

/* crates use */
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/* project use */
use seqgraph_index::index::{MinimizerIndex, MinimizerIndexParams};
use seqgraph_index::minimizer::MinimizerIter;
use seqgraph_index::position::GraphPosition;

const K: usize = 15;
const W: usize = 5;

/// Deterministic ACGT sequence generator (xorshift), so benchmarks don't
/// need a dependency on an external string-generation crate.
fn synthetic_sequence(len: usize, seed: u64) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            BASES[(state & 0x3) as usize]
        })
        .collect()
}

pub fn enumerate_minimizers(c: &mut Criterion) {
    let mut g = c.benchmark_group("enumerate_minimizers");

    for i in 10..16 {
        let len = 1usize << i;
        let seq = synthetic_sequence(len, 0x5EED);

        g.bench_with_input(BenchmarkId::new("enumerate", len), &seq, |b, seq| {
            b.iter(|| {
                let count = MinimizerIter::new(black_box(seq), K, W).count();
                black_box(count)
            });
        });
    }
}

pub fn insert_and_find(c: &mut Criterion) {
    let mut g = c.benchmark_group("insert_and_find");

    for i in 10..16 {
        let len = 1usize << i;
        let seq = synthetic_sequence(len, 0xC0FFEE);
        let minimizers: Vec<_> = MinimizerIter::new(&seq, K, W).collect();

        g.bench_with_input(BenchmarkId::new("insert", len), &minimizers, |b, ms| {
            b.iter(|| {
                let mut idx = MinimizerIndex::new(MinimizerIndexParams::new(K, W).unwrap());
                for (i, m) in ms.iter().enumerate() {
                    let pos = GraphPosition::new((i as u64) + 1, m.is_reverse, m.offset).encode();
                    idx.insert(m, pos);
                }
                black_box(idx.size())
            });
        });

        g.bench_with_input(BenchmarkId::new("find", len), &minimizers, |b, ms| {
            let mut idx = MinimizerIndex::new(MinimizerIndexParams::new(K, W).unwrap());
            for (i, m) in ms.iter().enumerate() {
                let pos = GraphPosition::new((i as u64) + 1, m.is_reverse, m.offset).encode();
                idx.insert(m, pos);
            }
            b.iter(|| {
                for m in ms {
                    black_box(idx.find(m));
                }
            });
        });
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    enumerate_minimizers(c);
    insert_and_find(c);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
