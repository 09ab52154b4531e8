#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A three-byte MIDI message, decoded once when it leaves the event ring.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyPressure { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// Signed bend around the centre, -8192..=8191.
    PitchBend { channel: u8, value: i16 },
    /// System or otherwise unrecognised bytes, passed through untouched.
    Other([u8; 3]),
}

impl MidiEvent {
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let [status, data1, data2] = bytes;
        let channel = status & 0x0F;
        let data1 = data1 & 0x7F;
        let data2 = data2 & 0x7F;

        match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: data1,
                velocity: data2,
            },
            0x90 => MidiEvent::NoteOn {
                channel,
                key: data1,
                velocity: data2,
            },
            0xA0 => MidiEvent::PolyPressure {
                channel,
                key: data1,
                pressure: data2,
            },
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: data1,
                value: data2,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: data1,
            },
            0xD0 => MidiEvent::ChannelPressure {
                channel,
                pressure: data1,
            },
            0xE0 => MidiEvent::PitchBend {
                channel,
                value: (((data2 as i16) << 7) | data1 as i16) - 8192,
            },
            _ => MidiEvent::Other(bytes),
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            } => [0x80 | (channel & 0x0F), key & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => [0x90 | (channel & 0x0F), key & 0x7F, velocity & 0x7F],
            MidiEvent::PolyPressure {
                channel,
                key,
                pressure,
            } => [0xA0 | (channel & 0x0F), key & 0x7F, pressure & 0x7F],
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
            MidiEvent::ProgramChange { channel, program } => {
                [0xC0 | (channel & 0x0F), program & 0x7F, 0]
            }
            MidiEvent::ChannelPressure { channel, pressure } => {
                [0xD0 | (channel & 0x0F), pressure & 0x7F, 0]
            }
            MidiEvent::PitchBend { channel, value } => {
                let raw = (value.clamp(-8192, 8191) + 8192) as u16;
                [
                    0xE0 | (channel & 0x0F),
                    (raw & 0x7F) as u8,
                    ((raw >> 7) & 0x7F) as u8,
                ]
            }
            MidiEvent::Other(bytes) => bytes,
        }
    }

    /// Channel of a channel-voice message, `None` for system messages.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::PolyPressure { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. }
            | MidiEvent::ChannelPressure { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => Some(channel),
            MidiEvent::Other(_) => None,
        }
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
