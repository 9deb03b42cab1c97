use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use merkle_prover::MerkleTree;

fn records(count: usize) -> Vec<Vec<u8>> {
    (0..count as u32).map(|i| i.to_be_bytes().repeat(8)).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle_build_sorted");
    for count in [1_000usize, 10_000] {
        let data = records(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| MerkleTree::build_sorted(black_box(data)))
        });
    }
    group.finish();
}

fn bench_proofs(c: &mut Criterion) {
    let data = records(10_000);
    let tree = MerkleTree::build_sorted(&data).unwrap();

    c.bench_function("merkle_prove_inclusion", |b| {
        b.iter(|| tree.prove_inclusion(black_box(5_000)))
    });
    c.bench_function("merkle_prove_and_verify_exclusion", |b| {
        b.iter(|| {
            let proof = tree.prove_exclusion(black_box(b"absent")).unwrap();
            tree.verify_exclusion(b"absent", &proof)
        })
    });
}

criterion_group!(benches, bench_build, bench_proofs);
criterion_main!(benches);
