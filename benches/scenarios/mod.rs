//! Real-world scenario benchmarks.
//!
//! These model a host driving the engine: a control thread scheduling
//! automation and a callback rendering quanta.

mod quantum;

pub use quantum::bench_quantum;
