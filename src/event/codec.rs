//! Event frame layout.
//!
//! ```text
//! offset  size  field
//! 0       4     total_length   u32 LE, header included
//! 4       4     timestamp      u32 LE, samples
//! 8       1     type           EventKind tag
//! 9       n     payload        total_length - 9 bytes
//! ```
//!
//! Payloads:
//!
//! ```text
//! ParamChange  index u32 | value f32 | ramp_samples u32 | curve u8   (13)
//! Midi         status u8 | data1 u8 | data2 u8                         (3)
//! Transport    tempo f32 | bar u32 | sig_num u8 | sig_den u8 | playing u8 (11)
//! Sysex        raw bytes                                               (0..=256)
//! ```

use super::{
    Event, EventKind, EventPayload, MidiEvent, ParamChange, SysexData, TransportData,
    MAX_SYSEX_LEN,
};
use crate::param::{CurveType, ParamIndex};

pub const HEADER_LEN: usize = 9;
/// Largest frame any event can produce.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_SYSEX_LEN;

pub(crate) const PARAM_CHANGE_LEN: usize = 13;
pub(crate) const MIDI_LEN: usize = 3;
pub(crate) const TRANSPORT_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameHeader {
    pub total_len: usize,
    pub timestamp: u32,
    pub kind: u8,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        Self {
            total_len: u32_at(bytes, 0) as usize,
            timestamp: u32_at(bytes, 4),
            kind: bytes[8],
        }
    }

    /// A length that could not have come from [`encode`] means the stream is corrupt.
    pub fn is_sane(&self) -> bool {
        (HEADER_LEN..=MAX_FRAME_LEN).contains(&self.total_len)
    }

    pub fn payload_len(&self) -> usize {
        self.total_len.saturating_sub(HEADER_LEN)
    }
}

/// Serialize `event` into `out`, returning the frame length.
pub(crate) fn encode(event: &Event, out: &mut [u8; MAX_FRAME_LEN]) -> usize {
    let len = event.frame_len();
    out[0..4].copy_from_slice(&(len as u32).to_le_bytes());
    out[4..8].copy_from_slice(&event.timestamp.to_le_bytes());
    out[8] = event.payload.kind() as u8;

    let payload = &mut out[HEADER_LEN..len];
    match event.payload {
        EventPayload::ParamChange(change) => {
            payload[0..4].copy_from_slice(&change.index.as_u32().to_le_bytes());
            payload[4..8].copy_from_slice(&change.value.to_le_bytes());
            payload[8..12].copy_from_slice(&change.ramp_samples.to_le_bytes());
            payload[12] = change.curve.to_u8();
        }
        EventPayload::Midi(midi) => payload.copy_from_slice(&midi.to_bytes()),
        EventPayload::Transport(transport) => {
            payload[0..4].copy_from_slice(&transport.tempo_bpm.to_le_bytes());
            payload[4..8].copy_from_slice(&transport.current_bar.to_le_bytes());
            payload[8] = transport.time_sig_numerator;
            payload[9] = transport.time_sig_denominator;
            payload[10] = transport.playing as u8;
        }
        EventPayload::Sysex(data) => payload.copy_from_slice(data.as_slice()),
    }

    len
}

/// Decode a payload. `None` for unknown tags or lengths that do not match the tag.
pub(crate) fn decode_payload(kind: u8, payload: &[u8]) -> Option<EventPayload> {
    match EventKind::from_u8(kind)? {
        EventKind::ParamChange if payload.len() == PARAM_CHANGE_LEN => {
            Some(EventPayload::ParamChange(ParamChange {
                index: ParamIndex::new(u32_at(payload, 0)),
                value: f32::from_bits(u32_at(payload, 4)),
                ramp_samples: u32_at(payload, 8),
                curve: CurveType::from_u8(payload[12])?,
            }))
        }
        EventKind::Midi if payload.len() == MIDI_LEN => Some(EventPayload::Midi(
            MidiEvent::from_bytes([payload[0], payload[1], payload[2]]),
        )),
        EventKind::Transport if payload.len() == TRANSPORT_LEN => {
            Some(EventPayload::Transport(TransportData {
                tempo_bpm: f32::from_bits(u32_at(payload, 0)),
                current_bar: u32_at(payload, 4),
                time_sig_numerator: payload[8],
                time_sig_denominator: payload[9],
                playing: payload[10] != 0,
            }))
        }
        EventKind::Sysex => SysexData::from_slice(payload).ok().map(EventPayload::Sysex),
        _ => None,
    }
}

#[inline]
fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
