//! TUI for wamscope
//!
//! Keys schedule automation through the [`Controller`]; the screen shows what
//! the audio thread actually produced.

mod spectrum;
mod status;
mod waveform;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use wam_rt::{Controller, CurveType, Event, EventPayload, MidiEvent, ParamIndex, Telemetry};

use crate::audio::Params;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, StatusView};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// How far ahead of the audio clock changes are scheduled, in samples.
/// One callback of headroom keeps them from arriving late.
const SCHEDULE_AHEAD: u32 = 2048;

/// Notes on keys 1-8: one octave of C major from middle C
const SCALE: [u8; 8] = [60, 62, 64, 65, 67, 69, 71, 72];

pub struct ScopeApp {
    controller: Controller,
    params: Params,
    clock: Arc<AtomicU64>,
    sample_rate: f32,
    scope_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    /// Last requested value per parameter, indexed by ParamIndex
    targets: Vec<f32>,
    telemetry: Telemetry,
    held_note: Option<u8>,
    last_echo: Option<u8>,
    emitted: Vec<Event>,
    message: String,
    should_quit: bool,
}

impl ScopeApp {
    pub fn new(
        controller: Controller,
        params: Params,
        clock: Arc<AtomicU64>,
        sample_rate: f32,
        scope_rx: Consumer<f32>,
    ) -> Self {
        let targets = controller
            .registry()
            .iter()
            .map(|(_, info)| info.default_value)
            .collect();

        Self {
            controller,
            params,
            clock,
            sample_rate,
            scope_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            targets,
            telemetry: Telemetry::default(),
            held_note: None,
            last_echo: None,
            emitted: Vec::new(),
            message: String::from("ready"),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_engine();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let TermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Pull scope samples, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let available = self.scope_rx.slots();
        if available == 0 {
            return;
        }

        if let Ok(chunk) = self.scope_rx.read_chunk(available) {
            self.audio_buffer.extend(chunk);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
        self.spectrum.update(&self.audio_buffer);
    }

    fn poll_engine(&mut self) {
        if let Some(telemetry) = self.controller.poll_telemetry() {
            self.telemetry = telemetry;
        }

        self.emitted.clear();
        self.controller.poll_events(&mut self.emitted);
        for event in &self.emitted {
            if let EventPayload::Midi(MidiEvent::NoteOn { key, .. }) = event.payload {
                self.last_echo = Some(key);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let params = self.params;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => self.nudge(params.gain, 0.1, 0.05, CurveType::Linear),
            KeyCode::Down => self.nudge(params.gain, -0.1, 0.05, CurveType::Linear),
            KeyCode::Right => self.scale(params.frequency, 1.25, 0.1),
            KeyCode::Left => self.scale(params.frequency, 0.8, 0.1),
            KeyCode::Char('s') => {
                let top = self.info_max(params.frequency);
                self.set(params.frequency, top, 2.0, CurveType::Exponential);
            }
            KeyCode::Char('d') => self.set(params.frequency, 220.0, 2.0, CurveType::Exponential),
            KeyCode::Char('w') => {
                let next = (self.target(params.shape) + 1.0) % 3.0;
                self.set(params.shape, next, 0.0, CurveType::Step);
            }
            KeyCode::Char('m') => {
                let muted = self.target(params.mute) >= 0.5;
                self.set(params.mute, if muted { 0.0 } else { 1.0 }, 0.0, CurveType::Step);
            }
            KeyCode::Char(c @ '1'..='8') => {
                let note = SCALE[(c as u8 - b'1') as usize];
                self.note(note);
            }
            KeyCode::Char('0') | KeyCode::Char(' ') => self.release(),
            _ => {}
        }
    }

    fn at(&self) -> u32 {
        (self.clock.load(Ordering::Relaxed) as u32).wrapping_add(SCHEDULE_AHEAD)
    }

    fn target(&self, index: ParamIndex) -> f32 {
        self.targets.get(index.get()).copied().unwrap_or_default()
    }

    fn info_max(&self, index: ParamIndex) -> f32 {
        self.controller
            .registry()
            .info(index)
            .map_or(0.0, |info| info.max_value)
    }

    fn nudge(&mut self, index: ParamIndex, delta: f32, seconds: f32, curve: CurveType) {
        let target = self.target(index) + delta;
        self.set(index, target, seconds, curve);
    }

    fn scale(&mut self, index: ParamIndex, factor: f32, seconds: f32) {
        let target = self.target(index) * factor;
        self.set(index, target, seconds, CurveType::Exponential);
    }

    fn set(&mut self, index: ParamIndex, target: f32, seconds: f32, curve: CurveType) {
        let Some(info) = self.controller.registry().info(index) else {
            return;
        };
        let target = info.constrain(target);
        let ramp = (seconds * self.sample_rate) as u32;
        let label = info.label.clone();
        let text = info.value_string(target);

        let at = self.at();
        match self.controller.schedule_index(index, target, ramp, at, curve) {
            Ok(()) => {
                if let Some(slot) = self.targets.get_mut(index.get()) {
                    *slot = target;
                }
                self.message = format!("{label} → {text} over {ramp} samples");
            }
            Err(err) => self.message = format!("{label}: {err}"),
        }
    }

    fn note(&mut self, key: u8) {
        self.release();
        let midi = MidiEvent::NoteOn {
            channel: 0,
            key,
            velocity: 100,
        };
        let at = self.at();
        match self.controller.send_midi(at, midi) {
            Ok(()) => {
                self.held_note = Some(key);
                self.message = format!("note on {key}");
            }
            Err(err) => self.message = format!("note on {key}: {err}"),
        }
    }

    fn release(&mut self) {
        let Some(key) = self.held_note.take() else {
            return;
        };
        let midi = MidiEvent::NoteOff {
            channel: 0,
            key,
            velocity: 0,
        };
        let at = self.at();
        if let Err(err) = self.controller.send_midi(at, midi) {
            self.message = format!("note off {key}: {err}");
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),  // Status
                Constraint::Min(8),     // Waveform
                Constraint::Length(10), // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let view = StatusView {
            telemetry: &self.telemetry,
            registry: self.controller.registry(),
            targets: &self.targets,
            sample_rate: self.sample_rate,
            held_note: self.held_note,
            last_echo: self.last_echo,
            rejected: self.controller.rejected_events(),
            message: &self.message,
        };
        render_status(frame, chunks[0], &view);
        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(
            " [↑↓] Gain  [←→] Freq  [S/D] Sweep up/down  [W] Shape  [M] Mute  [1-8] Note  [0] Release  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
