use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/*
Raw SPSC Byte Ring
==================

One writer, one reader, a power-of-two block of bytes in between.

  capacity C    Size of the byte arena. Must be a power of two so positions
                can be masked with `C - 1` instead of divided.

  cursor        A position in [0, 2C). The arena slot is `cursor & (C - 1)`.
                Running the cursors over twice the capacity lets
                `write - read` tell "full" (== C) apart from "empty" (== 0)
                without sacrificing a slot.

Ownership of the cursors is split: only the producer stores `write`, only the
consumer stores `read`. Each side keeps its own cursor in a local field and
only touches the shared atomic to publish it.

Hand-over:

  producer: copy bytes into the free region, then store `write` (Release)
  consumer: load `write` (Acquire), copy bytes out, then store `read` (Release)
  producer: load `read` (Acquire) before reusing the freed region

A span that crosses the end of the arena is copied in two pieces, so callers
always see contiguous reads and writes no matter where the cursors sit.
*/

#[repr(align(64))]
struct CachePadded<T>(T);

/// Fixed-capacity single-producer/single-consumer byte ring buffer.
///
/// Construct with [`RawRingBuffer::new`], which hands back the two halves.
/// The arena is freed once both halves are dropped.
pub struct RawRingBuffer {
    data: Box<[UnsafeCell<u8>]>,
    capacity: usize,
    write: CachePadded<AtomicUsize>,
    read: CachePadded<AtomicUsize>,
}

// SAFETY: the producer only writes into the free region and the consumer only
// reads from the filled region. Regions change hands through release stores
// and acquire loads on the cursors, so no byte is accessed by both sides at once.
unsafe impl Sync for RawRingBuffer {}

impl RawRingBuffer {
    /// Allocate a ring of `capacity` bytes and split it into its two halves.
    ///
    /// Fails with [`Error::InvalidCapacity`] unless `capacity` is a non-zero
    /// power of two.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> Result<(RawProducer, RawConsumer)> {
        validate_capacity(capacity)?;

        let data = (0..capacity).map(|_| UnsafeCell::new(0u8)).collect();
        let buffer = Arc::new(Self {
            data,
            capacity,
            write: CachePadded(AtomicUsize::new(0)),
            read: CachePadded(AtomicUsize::new(0)),
        });

        let producer = RawProducer {
            buffer: Arc::clone(&buffer),
            write: 0,
        };
        let consumer = RawConsumer { buffer, read: 0 };
        Ok((producer, consumer))
    }

    #[inline]
    fn slot(&self, cursor: usize) -> usize {
        cursor & (self.capacity - 1)
    }

    #[inline]
    fn wrap(&self, cursor: usize) -> usize {
        cursor & (2 * self.capacity - 1)
    }

    #[inline]
    fn filled(&self, write: usize, read: usize) -> usize {
        self.wrap(write.wrapping_sub(read))
    }

    #[inline]
    fn base(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.data.as_ptr())
    }

    /// # Safety
    ///
    /// `src.len()` bytes starting at `cursor` must lie in the free region and
    /// the caller must be the sole producer.
    unsafe fn copy_in(&self, cursor: usize, src: &[u8]) {
        let start = self.slot(cursor);
        let first = src.len().min(self.capacity - start);
        // SAFETY: `start + first <= capacity` and `src.len() - first <= start`,
        // so both copies stay inside the arena; the caller owns these bytes.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.base().add(start), first);
            ptr::copy_nonoverlapping(src.as_ptr().add(first), self.base(), src.len() - first);
        }
    }

    /// # Safety
    ///
    /// `dst.len()` bytes starting at `cursor` must lie in the filled region and
    /// the caller must be the sole consumer.
    unsafe fn copy_out(&self, cursor: usize, dst: &mut [u8]) {
        let start = self.slot(cursor);
        let first = dst.len().min(self.capacity - start);
        // SAFETY: same bounds as `copy_in`; the producer does not touch the
        // filled region until the consumer publishes a new read cursor.
        unsafe {
            ptr::copy_nonoverlapping(self.base().add(start), dst.as_mut_ptr(), first);
            ptr::copy_nonoverlapping(self.base(), dst.as_mut_ptr().add(first), dst.len() - first);
        }
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 || !capacity.is_power_of_two() || capacity > usize::MAX / 2 {
        return Err(Error::InvalidCapacity(capacity));
    }
    Ok(())
}

/// Writing half of a [`RawRingBuffer`]. Owned by exactly one thread.
pub struct RawProducer {
    buffer: Arc<RawRingBuffer>,
    write: usize,
}

impl RawProducer {
    pub fn capacity(&self) -> usize {
        self.buffer.capacity
    }

    /// Bytes that can be written right now.
    #[inline]
    pub fn available_to_write(&self) -> usize {
        let read = self.buffer.read.0.load(Ordering::Acquire);
        self.buffer.capacity - self.buffer.filled(self.write, read)
    }

    /// Write as many bytes of `data` as fit and return how many were written.
    ///
    /// Never blocks. A short count means the ring was (nearly) full.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.available_to_write());
        if count == 0 {
            return 0;
        }

        // SAFETY: `count` bytes from our cursor are free and we are the only producer.
        unsafe { self.buffer.copy_in(self.write, &data[..count]) };
        self.publish(count);
        count
    }

    /// Write all of `data` or nothing.
    ///
    /// On [`Error::BufferFull`] the ring is left untouched. Slices longer than
    /// the whole ring fail with [`Error::FrameTooLarge`].
    pub fn write_exact(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.buffer.capacity {
            return Err(Error::FrameTooLarge {
                frame: data.len(),
                capacity: self.buffer.capacity,
            });
        }

        let available = self.available_to_write();
        if data.len() > available {
            return Err(Error::BufferFull {
                needed: data.len(),
                available,
            });
        }

        // SAFETY: checked above that the whole span is free.
        unsafe { self.buffer.copy_in(self.write, data) };
        self.publish(data.len());
        Ok(())
    }

    /// True once the consumer half has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.buffer) < 2
    }

    #[inline]
    fn publish(&mut self, count: usize) {
        self.write = self.buffer.wrap(self.write.wrapping_add(count));
        self.buffer.write.0.store(self.write, Ordering::Release);
    }
}

/// Reading half of a [`RawRingBuffer`]. Owned by exactly one thread.
pub struct RawConsumer {
    buffer: Arc<RawRingBuffer>,
    read: usize,
}

impl RawConsumer {
    pub fn capacity(&self) -> usize {
        self.buffer.capacity
    }

    /// Bytes that can be read right now.
    #[inline]
    pub fn available_to_read(&self) -> usize {
        let write = self.buffer.write.0.load(Ordering::Acquire);
        self.buffer.filled(write, self.read)
    }

    /// Read up to `out.len()` bytes, returning the count. Zero when empty.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let count = self.peek(out);
        self.advance(count);
        count
    }

    /// Fill all of `out` or consume nothing.
    pub fn read_exact(&mut self, out: &mut [u8]) -> bool {
        if self.available_to_read() < out.len() {
            return false;
        }
        self.read(out) == out.len()
    }

    /// Copy up to `out.len()` bytes without consuming them.
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.available_to_read());
        if count == 0 {
            return 0;
        }

        // SAFETY: `count` bytes from our cursor are filled and published.
        unsafe { self.buffer.copy_out(self.read, &mut out[..count]) };
        count
    }

    /// Discard up to `count` bytes, returning how many were dropped.
    pub fn skip(&mut self, count: usize) -> usize {
        let count = count.min(self.available_to_read());
        self.advance(count);
        count
    }

    /// Drain up to `max_bytes` into a fresh `Vec`.
    ///
    /// Allocates, so this is for control-thread consumers only.
    pub fn read_to_vec(&mut self, max_bytes: usize) -> Vec<u8> {
        let mut out = vec![0u8; max_bytes.min(self.available_to_read())];
        let count = self.read(&mut out);
        out.truncate(count);
        out
    }

    /// True once the producer half has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.buffer) < 2
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.read = self.buffer.wrap(self.read.wrapping_add(count));
        self.buffer.read.0.store(self.read, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_capacities() {
        for capacity in [0usize, 3, 5, 6, 7, 100, 1000, 1023, 1025] {
            assert_eq!(
                RawRingBuffer::new(capacity).err(),
                Some(Error::InvalidCapacity(capacity)),
                "capacity {capacity} should be rejected"
            );
        }
        for capacity in [1usize, 2, 4, 64, 1024] {
            assert!(RawRingBuffer::new(capacity).is_ok());
        }
    }

    #[test]
    fn partial_write_when_nearly_full() {
        let (mut tx, mut rx) = RawRingBuffer::new(8).unwrap();

        assert_eq!(tx.write(&[1, 2, 3, 4, 5, 6]), 6);
        assert_eq!(tx.write(&[7, 8, 9, 10]), 2);
        assert_eq!(tx.available_to_write(), 0);
        assert_eq!(rx.available_to_read(), 8);

        let mut out = [0u8; 8];
        assert_eq!(rx.read(&mut out), 8);
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rx.read(&mut out), 0);
    }

    #[test]
    fn reads_across_the_wrap_point() {
        let (mut tx, mut rx) = RawRingBuffer::new(8).unwrap();
        let mut scratch = [0u8; 8];

        tx.write(&[0; 6]);
        rx.read(&mut scratch[..6]);

        // Cursor now sits at slot 6, so this span wraps.
        assert_eq!(tx.write(&[10, 11, 12, 13, 14]), 5);
        let mut out = [0u8; 5];
        assert!(rx.read_exact(&mut out));
        assert_eq!(out, [10, 11, 12, 13, 14]);
    }

    #[test]
    fn peek_does_not_consume() {
        let (mut tx, mut rx) = RawRingBuffer::new(16).unwrap();
        tx.write(&[1, 2, 3]);

        let mut out = [0u8; 2];
        assert_eq!(rx.peek(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(rx.available_to_read(), 3);

        assert_eq!(rx.skip(1), 1);
        assert_eq!(rx.read_to_vec(16), vec![2, 3]);
    }

    #[test]
    fn write_exact_is_all_or_nothing() {
        let (mut tx, mut rx) = RawRingBuffer::new(8).unwrap();
        tx.write_exact(&[1, 2, 3, 4, 5]).unwrap();

        let err = tx.write_exact(&[6, 7, 8, 9]).unwrap_err();
        assert_eq!(
            err,
            Error::BufferFull {
                needed: 4,
                available: 3
            }
        );
        assert_eq!(rx.available_to_read(), 5);

        assert!(matches!(
            tx.write_exact(&[0; 9]),
            Err(Error::FrameTooLarge { frame: 9, capacity: 8 })
        ));
        assert_eq!(rx.read_to_vec(8), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn read_exact_leaves_short_data_in_place() {
        let (mut tx, mut rx) = RawRingBuffer::new(8).unwrap();
        tx.write(&[9, 9]);
        let mut out = [0u8; 3];
        assert!(!rx.read_exact(&mut out));
        assert_eq!(rx.available_to_read(), 2);
    }

    #[test]
    fn full_and_empty_are_distinguished_over_many_laps() {
        let (mut tx, mut rx) = RawRingBuffer::new(4).unwrap();
        let mut out = [0u8; 4];

        for lap in 0..10u8 {
            assert_eq!(tx.write(&[lap; 4]), 4);
            assert_eq!(tx.available_to_write(), 0);
            assert_eq!(rx.available_to_read(), 4);
            assert_eq!(rx.read(&mut out), 4);
            assert_eq!(out, [lap; 4]);
            assert_eq!(rx.available_to_read(), 0);
            assert_eq!(tx.available_to_write(), 4);
        }
    }

    #[test]
    fn halves_notice_abandonment() {
        let (tx, rx) = RawRingBuffer::new(4).unwrap();
        assert!(!tx.is_abandoned());
        drop(rx);
        assert!(tx.is_abandoned());
    }
}
