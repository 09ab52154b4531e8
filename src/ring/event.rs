//! Framed, time-stamped events over a [`RawRingBuffer`].
//!
//! Frames are written in one all-or-nothing copy, so the reader never sees
//! half an event. The reader peeks the fixed header first and only consumes
//! the frame once it knows the event is due.

use super::raw::{RawConsumer, RawProducer, RawRingBuffer};
use crate::error::{Error, Result};
use crate::event::codec::{self, FrameHeader};
use crate::event::{Event, HEADER_LEN, MAX_FRAME_LEN};

/// Half the `u32` timestamp space. Timestamps closer behind than this are past.
const WRAP_HALF: u32 = 1 << 31;

/// Constructor for event rings.
pub struct EventRingBuffer;

impl EventRingBuffer {
    /// Smallest capacity that can hold every possible frame.
    pub const MIN_CAPACITY: usize = MAX_FRAME_LEN.next_power_of_two();

    /// Create an event ring of `capacity` bytes.
    ///
    /// Besides [`Error::InvalidCapacity`], fails with [`Error::FrameTooLarge`]
    /// when the largest frame would not fit an empty ring. Checking here means
    /// a frame can never be too large at runtime.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> Result<(EventProducer, EventConsumer)> {
        let (raw_tx, raw_rx) = RawRingBuffer::new(capacity)?;
        if capacity < MAX_FRAME_LEN {
            return Err(Error::FrameTooLarge {
                frame: MAX_FRAME_LEN,
                capacity,
            });
        }

        let producer = EventProducer { raw: raw_tx };
        let consumer = EventConsumer {
            raw: raw_rx,
            scratch: [0; MAX_FRAME_LEN],
            malformed: 0,
        };
        Ok((producer, consumer))
    }
}

/// Writing half, usually owned by the control thread.
pub struct EventProducer {
    raw: RawProducer,
}

impl EventProducer {
    /// Serialize and enqueue one event.
    ///
    /// On [`Error::BufferFull`] the event is dropped and the ring is left
    /// exactly as it was. Throttling or coalescing is up to the caller.
    pub fn write(&mut self, event: &Event) -> Result<()> {
        let mut frame = [0u8; MAX_FRAME_LEN];
        let len = codec::encode(event, &mut frame);
        self.raw.write_exact(&frame[..len])
    }

    pub fn available_to_write(&self) -> usize {
        self.raw.available_to_write()
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn is_abandoned(&self) -> bool {
        self.raw.is_abandoned()
    }
}

/// Reading half, usually owned by the real-time thread.
pub struct EventConsumer {
    raw: RawConsumer,
    scratch: [u8; MAX_FRAME_LEN],
    malformed: u64,
}

impl EventConsumer {
    /// Timestamp of the next buffered event, without consuming it.
    pub fn peek_timestamp(&self) -> Option<u32> {
        self.peek_header().map(|header| header.timestamp)
    }

    /// Consume and return the next event if its timestamp is `<= deadline`.
    ///
    /// Frames that fail to decode are skipped and counted in
    /// [`malformed`](Self::malformed). A corrupt length discards everything
    /// buffered, since frame boundaries can no longer be trusted.
    pub fn pop_due(&mut self, deadline: u32) -> Option<Event> {
        self.pop_when(|timestamp| timestamp <= deadline)
    }

    /// Consume the next event if it falls in the `len` samples from `start`,
    /// or before them. Timestamps wrap: anything up to 2^31 samples behind
    /// `start` counts as earlier, the rest of the clock as later.
    pub fn pop_window(&mut self, start: u32, len: u32) -> Option<Event> {
        self.pop_when(|timestamp| {
            let ahead = timestamp.wrapping_sub(start);
            ahead < len || ahead >= WRAP_HALF
        })
    }

    fn pop_when(&mut self, due: impl Fn(u32) -> bool) -> Option<Event> {
        loop {
            let header = self.peek_header()?;

            if !header.is_sane() {
                self.malformed += 1;
                let buffered = self.raw.available_to_read();
                self.raw.skip(buffered);
                return None;
            }
            if !due(header.timestamp) {
                return None;
            }

            let frame = &mut self.scratch[..header.total_len];
            if !self.raw.read_exact(frame) {
                return None;
            }

            match codec::decode_payload(header.kind, &frame[HEADER_LEN..]) {
                Some(payload) => {
                    return Some(Event {
                        timestamp: header.timestamp,
                        payload,
                    })
                }
                None => self.malformed += 1,
            }
        }
    }

    /// Next event regardless of its timestamp.
    pub fn pop(&mut self) -> Option<Event> {
        self.pop_due(u32::MAX)
    }

    /// Drain every event due by `deadline` into `out`, in write order.
    ///
    /// Events after the deadline stay buffered. May grow `out`; the real-time
    /// path uses [`read_due_bounded`](Self::read_due_bounded) instead.
    pub fn read_all_due_by(&mut self, deadline: u32, out: &mut Vec<Event>) -> usize {
        let start = out.len();
        while let Some(event) = self.pop_due(deadline) {
            out.push(event);
        }
        out.len() - start
    }

    /// Like [`read_all_due_by`](Self::read_all_due_by) but stops once `out`
    /// reaches its current capacity, so it never allocates. Due events that do
    /// not fit stay buffered.
    pub fn read_due_bounded(&mut self, deadline: u32, out: &mut Vec<Event>) -> usize {
        let start = out.len();
        while out.len() < out.capacity() {
            match self.pop_due(deadline) {
                Some(event) => out.push(event),
                None => break,
            }
        }
        out.len() - start
    }

    /// Bounded drain over a wrapping window, see [`pop_window`](Self::pop_window).
    pub fn read_window_bounded(&mut self, start: u32, len: u32, out: &mut Vec<Event>) -> usize {
        let first = out.len();
        while out.len() < out.capacity() {
            match self.pop_window(start, len) {
                Some(event) => out.push(event),
                None => break,
            }
        }
        out.len() - first
    }

    /// Frames discarded because they could not be decoded.
    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    pub fn available_to_read(&self) -> usize {
        self.raw.available_to_read()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.available_to_read() < HEADER_LEN
    }

    pub fn is_abandoned(&self) -> bool {
        self.raw.is_abandoned()
    }

    fn peek_header(&self) -> Option<FrameHeader> {
        let mut header = [0u8; HEADER_LEN];
        if self.raw.peek(&mut header) < HEADER_LEN {
            return None;
        }
        Some(FrameHeader::parse(&header))
    }
}
