//! Wait-free single-producer/single-consumer transports.
//!
//! Every ring is created once, split into a producer and a consumer half, and
//! never resized. Neither half blocks, locks or allocates after construction,
//! so either may live on the real-time thread.

/// Framed, time-stamped event records.
pub mod event;
/// Power-of-two byte ring with acquire/release cursors.
pub mod raw;
/// Fixed-size numeric records.
pub mod typed;

pub use event::{EventConsumer, EventProducer, EventRingBuffer};
pub use raw::{RawConsumer, RawProducer, RawRingBuffer};
pub use typed::{Element, TypedConsumer, TypedProducer, TypedRingBuffer};
