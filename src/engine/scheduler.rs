use crate::event::Event;
use crate::ring::EventConsumer;

/// An event placed inside the current render quantum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// Sample offset from the start of the quantum.
    pub offset: usize,
    pub event: Event,
}

/// Drains due events from the inbound ring and places them in the quantum.
///
/// Late events (timestamped before the quantum started) land at offset 0 and
/// are counted. At most `max_events` are taken per quantum; the rest wait.
pub(crate) struct Scheduler {
    inbound: EventConsumer,
    drained: Vec<Event>,
    due: Vec<TimedEvent>,
    late: u64,
}

impl Scheduler {
    pub fn new(inbound: EventConsumer, max_events: usize) -> Self {
        Self {
            inbound,
            drained: Vec::with_capacity(max_events),
            due: Vec::with_capacity(max_events),
            late: 0,
        }
    }

    /// Collect the events due in `[start, start + len)`, sorted by offset.
    /// Events sharing an offset keep their write order. Timestamps are
    /// compared modulo 2^32, so the window keeps working once the sample
    /// clock outgrows the wire format.
    pub fn collect(&mut self, start: u64, len: usize) -> &[TimedEvent] {
        self.drained.clear();
        self.due.clear();
        if len == 0 {
            return &self.due;
        }

        // The wire clock is the low 32 bits of the sample clock.
        let start = start as u32;
        let len = len as u32;
        self.inbound.read_window_bounded(start, len, &mut self.drained);

        for &event in &self.drained {
            let ahead = event.timestamp.wrapping_sub(start);
            let offset = if ahead < len {
                ahead as usize
            } else {
                self.late += 1;
                0
            };
            self.due.push(TimedEvent { offset, event });
        }

        // Insertion sort: stable, in place, and the input is usually sorted already.
        for i in 1..self.due.len() {
            let mut j = i;
            while j > 0 && self.due[j - 1].offset > self.due[j].offset {
                self.due.swap(j - 1, j);
                j -= 1;
            }
        }

        &self.due
    }

    pub fn late(&self) -> u64 {
        self.late
    }

    pub fn malformed(&self) -> u64 {
        self.inbound.malformed()
    }

    pub fn is_abandoned(&self) -> bool {
        self.inbound.is_abandoned()
    }
}
