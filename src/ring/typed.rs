//! Fixed-size numeric records over a [`RawRingBuffer`].
//!
//! Used for low-rate streams such as telemetry, where dropping the newest
//! record on overflow is acceptable because the reader polls often.

use std::marker::PhantomData;

use super::raw::{RawConsumer, RawProducer, RawRingBuffer};
use crate::error::{Error, Result};

/// Plain numeric types that can travel through a [`TypedRingBuffer`].
///
/// Elements are stored little-endian so the byte layout does not depend on
/// the host.
pub trait Element: Copy + Default + Send + 'static {
    const SIZE: usize;

    fn write_le(self, out: &mut [u8]);

    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_element!(u8, u16, u32, u64, i16, i32, i64, f32, f64);

/// Constructor for typed record rings.
pub struct TypedRingBuffer<T: Element, const N: usize> {
    _marker: PhantomData<[T; N]>,
}

impl<T: Element, const N: usize> TypedRingBuffer<T, N> {
    /// Bytes occupied by one `[T; N]` record.
    pub const RECORD_BYTES: usize = T::SIZE * N;

    /// Create a ring of `capacity_bytes` (a power of two) holding `[T; N]` records.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity_bytes: usize) -> Result<(TypedProducer<T, N>, TypedConsumer<T, N>)> {
        if N == 0 {
            return Err(Error::InvalidConfig("typed records need at least one element"));
        }

        let (raw_tx, raw_rx) = RawRingBuffer::new(capacity_bytes)?;
        if Self::RECORD_BYTES > capacity_bytes {
            return Err(Error::FrameTooLarge {
                frame: Self::RECORD_BYTES,
                capacity: capacity_bytes,
            });
        }

        let producer = TypedProducer {
            raw: raw_tx,
            scratch: vec![0u8; Self::RECORD_BYTES].into_boxed_slice(),
            _marker: PhantomData,
        };
        let consumer = TypedConsumer {
            raw: raw_rx,
            scratch: vec![0u8; Self::RECORD_BYTES].into_boxed_slice(),
            _marker: PhantomData,
        };
        Ok((producer, consumer))
    }
}

pub struct TypedProducer<T: Element, const N: usize> {
    raw: RawProducer,
    scratch: Box<[u8]>,
    _marker: PhantomData<[T; N]>,
}

impl<T: Element, const N: usize> TypedProducer<T, N> {
    /// Push a record. Returns false (and drops the record) when the ring is full.
    pub fn push(&mut self, record: [T; N]) -> bool {
        for (&value, bytes) in record.iter().zip(self.scratch.chunks_exact_mut(T::SIZE)) {
            value.write_le(bytes);
        }
        self.raw.write_exact(&self.scratch).is_ok()
    }

    /// Records that still fit.
    pub fn free_records(&self) -> usize {
        self.raw.available_to_write() / TypedRingBuffer::<T, N>::RECORD_BYTES
    }

    pub fn is_abandoned(&self) -> bool {
        self.raw.is_abandoned()
    }
}

pub struct TypedConsumer<T: Element, const N: usize> {
    raw: RawConsumer,
    scratch: Box<[u8]>,
    _marker: PhantomData<[T; N]>,
}

impl<T: Element, const N: usize> TypedConsumer<T, N> {
    pub fn pop(&mut self) -> Option<[T; N]> {
        if !self.raw.read_exact(&mut self.scratch) {
            return None;
        }

        let mut record = [T::default(); N];
        for (value, bytes) in record.iter_mut().zip(self.scratch.chunks_exact(T::SIZE)) {
            *value = T::read_le(bytes);
        }
        Some(record)
    }

    /// Drain everything and keep only the newest record.
    pub fn pop_latest(&mut self) -> Option<[T; N]> {
        let mut latest = None;
        while let Some(record) = self.pop() {
            latest = Some(record);
        }
        latest
    }

    /// Complete records waiting to be read.
    pub fn len(&self) -> usize {
        self.raw.available_to_read() / TypedRingBuffer::<T, N>::RECORD_BYTES
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_abandoned(&self) -> bool {
        self.raw.is_abandoned()
    }
}
