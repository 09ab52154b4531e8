//! Benchmarks for raw byte transfer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use wam_rt::ring::RawRingBuffer;

use crate::BLOCK_SIZES;

pub fn bench_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring/raw");

    for &size in BLOCK_SIZES {
        // One quantum of f32 samples, as bytes
        let bytes = size * 4;
        let data: Vec<u8> = (0..bytes).map(|i| i as u8).collect();
        let mut out = vec![0u8; bytes];
        let (mut tx, mut rx) = RawRingBuffer::new(16 * 1024).unwrap();

        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::new("write_read", size), &size, |b, _| {
            b.iter(|| {
                tx.write(black_box(&data));
                rx.read(black_box(&mut out))
            })
        });

        // Offset the cursors so every transfer straddles the wrap point
        let (mut tx, mut rx) = RawRingBuffer::new(bytes * 2).unwrap();
        tx.write(&data[..bytes / 2 + 3]);
        rx.skip(bytes / 2 + 3);

        group.bench_with_input(BenchmarkId::new("wrapping", size), &size, |b, _| {
            b.iter(|| {
                tx.write(black_box(&data));
                rx.read(black_box(&mut out))
            })
        });
    }

    group.finish();
}
