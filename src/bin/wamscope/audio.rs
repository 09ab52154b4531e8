//! Audio side: a cpal output stream whose callback owns the [`Processor`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::Producer;
use wam_rt::event::midi::midi_note_to_freq;
use wam_rt::{Controller, Event, EventPayload, MidiEvent, ParamIndex, Processor, MAX_BLOCK_SIZE};

/// Parameter indices, resolved once before the stream starts.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub gain: ParamIndex,
    pub frequency: ParamIndex,
    pub shape: ParamIndex,
    pub mute: ParamIndex,
}

impl Params {
    pub fn resolve(controller: &Controller) -> wam_rt::Result<Self> {
        let registry = controller.registry();
        Ok(Self {
            gain: registry.resolve("gain")?,
            frequency: registry.resolve("frequency")?,
            shape: registry.resolve("shape")?,
            mute: registry.resolve("mute")?,
        })
    }
}

/// Keeps the stream alive and exposes the audio clock.
pub struct AudioHost {
    _stream: cpal::Stream,
    clock: Arc<AtomicU64>,
    sample_rate: f32,
}

impl AudioHost {
    pub fn start(
        mut processor: Processor,
        params: Params,
        mut scope_tx: Producer<f32>,
    ) -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let clock = Arc::new(AtomicU64::new(0));
        let callback_clock = clock.clone();
        let mut voice = Voice::default();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut sample_time = 0u64;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    processor.on_render_quantum(frames, sample_time);

                    let block = &mut render_buf[..frames];
                    voice.render(&processor, &params, sample_rate, block);
                    if let Some(note) = voice.take_started_note() {
                        processor.emit(note);
                    }
                    processor.measure_output(block);

                    // The UI may fall behind; drop scope samples rather than block
                    for &sample in block.iter() {
                        let _ = scope_tx.push(sample);
                    }

                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    sample_time += frames as u64;
                    frames_written += frames;
                }

                callback_clock.store(sample_time, Ordering::Relaxed);
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            clock,
            sample_rate,
        })
    }

    /// Samples rendered so far, updated once per callback.
    pub fn clock(&self) -> Arc<AtomicU64> {
        self.clock.clone()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Monophonic oscillator. A held MIDI note overrides the frequency parameter.
#[derive(Default)]
struct Voice {
    phase: f32,
    held_note: Option<u8>,
    started: Option<Event>,
}

impl Voice {
    fn render(&mut self, processor: &Processor, params: &Params, sample_rate: f32, out: &mut [f32]) {
        let gain = processor.values(params.gain);
        let frequency = processor.values(params.frequency);
        let shape = processor.values(params.shape);
        let mute = processor.values(params.mute);
        let mut events = processor.events().iter().peekable();

        for (i, sample) in out.iter_mut().enumerate() {
            while let Some(timed) = events.next_if(|timed| timed.offset <= i) {
                if let EventPayload::Midi(midi) = timed.event.payload {
                    self.handle_midi(timed.event.timestamp, midi);
                }
            }

            let freq = match self.held_note {
                Some(note) => midi_note_to_freq(note),
                None => frequency.get(i).copied().unwrap_or(220.0),
            };
            self.phase = (self.phase + freq / sample_rate).fract();

            let raw = match shape.get(i).copied().unwrap_or(0.0) as u32 {
                1 => {
                    if self.phase < 0.5 {
                        1.0
                    } else {
                        -1.0
                    }
                }
                2 => 2.0 * self.phase - 1.0,
                _ => (self.phase * std::f32::consts::TAU).sin(),
            };

            let muted = mute.get(i).is_some_and(|&m| m >= 0.5);
            *sample = if muted {
                0.0
            } else {
                raw * gain.get(i).copied().unwrap_or(0.0)
            };
        }
    }

    fn handle_midi(&mut self, timestamp: u32, midi: MidiEvent) {
        match midi {
            MidiEvent::NoteOn { key, velocity, .. } if velocity > 0 => {
                self.held_note = Some(key);
                self.started = Some(Event::midi(timestamp, midi));
            }
            MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => {
                if self.held_note == Some(key) {
                    self.held_note = None;
                }
            }
            _ => {}
        }
    }

    /// Note-on to echo back to the control thread, at most one per quantum.
    fn take_started_note(&mut self) -> Option<Event> {
        self.started.take()
    }
}
