//! Benchmarks for parameter interpolation.

mod interpolator;

pub use interpolator::bench_interpolator;
