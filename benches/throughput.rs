// Handoff throughput through the bounded buffer, one producer and one consumer.

use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use insert_strings::{BoundedBuffer, CancellationToken, Coordinator};

const ITEMS: u64 = 10_000;

fn handoff(capacity: usize) {
    let buffer = BoundedBuffer::new(capacity).unwrap();
    let token = CancellationToken::new();

    let producer = {
        let buffer = buffer.clone();
        let token = token.clone();
        thread::spawn(move || {
            for i in 0..ITEMS {
                buffer.deposit(i, &token).unwrap();
            }
        })
    };
    for _ in 0..ITEMS {
        black_box(buffer.fetch(&token).unwrap());
    }
    producer.join().unwrap();
}

fn buffer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_handoff");
    group.throughput(Throughput::Elements(ITEMS));
    for capacity in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
            b.iter(|| handoff(cap))
        });
    }
    group.finish();
}

fn claim_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinator_claims");
    group.throughput(Throughput::Elements(ITEMS));
    group.bench_function("single_thread", |b| {
        b.iter(|| {
            let coordinator = Coordinator::new(ITEMS as usize).unwrap();
            while let Some(seq) = coordinator.claim_next() {
                black_box(seq);
            }
        })
    });
    group.finish();
}

criterion_group!(benches, buffer_throughput, claim_throughput);
criterion_main!(benches);
