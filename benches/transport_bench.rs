//! Benchmarks for the real-time path.
//!
//! Run with: cargo bench
//!
//! Everything here runs inside an audio callback, so it has to finish well
//! within the quantum deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - ring/*       Raw byte transfer and event framing
//!   - param/*      Interpolation of one parameter
//!   - scenarios/*  Whole render quanta through the engine

use criterion::{criterion_group, criterion_main};

mod param;
mod ring;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    ring::bench_raw,
    ring::bench_event,
    param::bench_interpolator,
    scenarios::bench_quantum,
);
criterion_main!(benches);
