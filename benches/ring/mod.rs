//! Benchmarks for the lock-free transports.

mod event;
mod raw;

pub use event::bench_event;
pub use raw::bench_raw;
