// Purpose: time-stamped events carried from the control thread to the real-time thread
// Decoded once at the framing layer into a plain `Copy` sum type.

pub(crate) mod codec;
pub mod midi;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::{CurveType, ParamIndex};

pub use codec::{HEADER_LEN, MAX_FRAME_LEN};
pub use midi::MidiEvent;

/// Longest sysex payload an event frame can carry.
pub const MAX_SYSEX_LEN: usize = 256;

/// An event scheduled at an absolute sample time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub timestamp: u32,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(timestamp: u32, payload: EventPayload) -> Self {
        Self { timestamp, payload }
    }

    pub fn param_change(timestamp: u32, change: ParamChange) -> Self {
        Self::new(timestamp, EventPayload::ParamChange(change))
    }

    pub fn midi(timestamp: u32, midi: MidiEvent) -> Self {
        Self::new(timestamp, EventPayload::Midi(midi))
    }

    pub fn transport(timestamp: u32, transport: TransportData) -> Self {
        Self::new(timestamp, EventPayload::Transport(transport))
    }

    /// Fails with [`Error::FrameTooLarge`] when `bytes` exceeds [`MAX_SYSEX_LEN`].
    pub fn sysex(timestamp: u32, bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(
            timestamp,
            EventPayload::Sysex(SysexData::from_slice(bytes)?),
        ))
    }

    /// Serialized size of this event's frame.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.payload.encoded_len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    ParamChange(ParamChange),
    Midi(MidiEvent),
    Transport(TransportData),
    Sysex(SysexData),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::ParamChange(_) => EventKind::ParamChange,
            EventPayload::Midi(_) => EventKind::Midi,
            EventPayload::Transport(_) => EventKind::Transport,
            EventPayload::Sysex(_) => EventKind::Sysex,
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        match self {
            EventPayload::ParamChange(_) => codec::PARAM_CHANGE_LEN,
            EventPayload::Midi(_) => codec::MIDI_LEN,
            EventPayload::Transport(_) => codec::TRANSPORT_LEN,
            EventPayload::Sysex(data) => data.len(),
        }
    }
}

/// Wire tag of each payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    ParamChange = 1,
    Midi = 2,
    Transport = 3,
    Sysex = 4,
}

impl EventKind {
    pub(crate) fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(EventKind::ParamChange),
            2 => Some(EventKind::Midi),
            3 => Some(EventKind::Transport),
            4 => Some(EventKind::Sysex),
            _ => None,
        }
    }
}

/// Move one parameter toward `value`, starting at the event's timestamp.
///
/// `ramp_samples == 0` (or a [`CurveType::Step`] curve) applies the value
/// at the event's sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub index: ParamIndex,
    pub value: f32,
    pub ramp_samples: u32,
    pub curve: CurveType,
}

impl ParamChange {
    pub fn new(index: ParamIndex, value: f32, ramp_samples: u32, curve: CurveType) -> Self {
        Self {
            index,
            value,
            ramp_samples,
            curve,
        }
    }

    /// Instant change.
    pub fn step(index: ParamIndex, value: f32) -> Self {
        Self::new(index, value, 0, CurveType::Step)
    }
}

/// Host transport snapshot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportData {
    pub tempo_bpm: f32,
    pub current_bar: u32,
    pub time_sig_numerator: u8,
    pub time_sig_denominator: u8,
    pub playing: bool,
}

impl Default for TransportData {
    fn default() -> Self {
        Self {
            tempo_bpm: 120.0,
            current_bar: 0,
            time_sig_numerator: 4,
            time_sig_denominator: 4,
            playing: false,
        }
    }
}

/// Inline sysex payload so events stay `Copy` and never touch the heap.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SysexData {
    len: u16,
    bytes: [u8; MAX_SYSEX_LEN],
}

impl SysexData {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_SYSEX_LEN {
            return Err(Error::FrameTooLarge {
                frame: HEADER_LEN + bytes.len(),
                capacity: MAX_FRAME_LEN,
            });
        }

        let mut data = Self {
            len: bytes.len() as u16,
            bytes: [0; MAX_SYSEX_LEN],
        };
        data.bytes[..bytes.len()].copy_from_slice(bytes);
        Ok(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for SysexData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SysexData").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysex_rejects_oversized_payloads() {
        let ok = Event::sysex(0, &[0xF0, 0x7E, 0xF7]).unwrap();
        assert_eq!(ok.frame_len(), HEADER_LEN + 3);

        let too_long = vec![0u8; MAX_SYSEX_LEN + 1];
        assert!(matches!(
            Event::sysex(0, &too_long),
            Err(Error::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn kinds_match_payloads() {
        let change = Event::param_change(5, ParamChange::step(ParamIndex::new(0), 1.0));
        assert_eq!(change.payload.kind(), EventKind::ParamChange);
        assert_eq!(EventKind::from_u8(EventKind::Sysex as u8), Some(EventKind::Sysex));
        assert_eq!(EventKind::from_u8(0), None);
    }
}
