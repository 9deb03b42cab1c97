use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sm3_engine::{extend, hash};

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("sm3_hash");
    for size in [64usize, 1024, 16 * 1024] {
        let message = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &message, |b, message| {
            b.iter(|| hash(black_box(message)))
        });
    }
    group.finish();
}

fn bench_extend(c: &mut Criterion) {
    let digest = hash(&[0x42u8; 16]);
    c.bench_function("sm3_length_extension", |b| {
        b.iter(|| extend(black_box(&digest), 16, black_box(b"admin=true")))
    });
}

criterion_group!(benches, bench_hash, bench_extend);
criterion_main!(benches);
