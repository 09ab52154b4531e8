//! Status panel - parameter targets, output level, and engine counters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wam_rt::event::midi::midi_note_to_freq;
use wam_rt::{ParameterRegistry, Telemetry};

/// Everything the status panel shows, borrowed from the app
pub struct StatusView<'a> {
    pub telemetry: &'a Telemetry,
    pub registry: &'a ParameterRegistry,
    pub targets: &'a [f32],
    pub sample_rate: f32,
    pub held_note: Option<u8>,
    pub last_echo: Option<u8>,
    pub rejected: u64,
    pub message: &'a str,
}

pub fn render_status(frame: &mut Frame, area: Rect, view: &StatusView) {
    let block = Block::default().title(" wamscope ").borders(Borders::ALL);
    let telemetry = view.telemetry;

    let seconds = telemetry.sample_time as f64 / view.sample_rate.max(1.0) as f64;
    let clock = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz  ", view.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("t={seconds:.2}s  block {}  ", telemetry.quantum_len),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "Peak: {:.1} dB  RMS: {:.1} dB",
                telemetry.peak_db(),
                telemetry.rms_db()
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let mut params = vec![Span::raw(" ")];
    for (index, info) in view.registry.iter() {
        let target = view.targets.get(index.get()).copied().unwrap_or_default();
        params.push(Span::styled(
            format!("{}: {}  ", info.label, info.value_string(target)),
            Style::default().fg(Color::Cyan),
        ));
    }
    let note = match (view.held_note, view.last_echo) {
        (Some(key), _) => format!("note {key} ({:.1} Hz)", midi_note_to_freq(key)),
        (None, Some(key)) => format!("last note {key}"),
        (None, None) => String::from("no note"),
    };
    params.push(Span::styled(note, Style::default().fg(Color::Green)));

    let warn = |count: u64| {
        if count > 0 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let counters = Line::from(vec![
        Span::styled(
            format!(" dropped {}  ", telemetry.dropped_events + view.rejected),
            warn(telemetry.dropped_events + view.rejected),
        ),
        Span::styled(
            format!("late {}  ", telemetry.late_events),
            warn(telemetry.late_events),
        ),
        Span::styled(
            format!("clamped {}  ", telemetry.clamped_values),
            warn(telemetry.clamped_values),
        ),
        Span::styled(
            format!("overruns {}  ", telemetry.telemetry_overruns),
            warn(telemetry.telemetry_overruns),
        ),
        Span::styled(
            format!("malformed {}", telemetry.malformed_frames),
            warn(telemetry.malformed_frames),
        ),
    ]);

    let message = Line::from(Span::styled(
        format!(" {}", view.message),
        Style::default().fg(Color::White),
    ));

    let paragraph = Paragraph::new(vec![clock, Line::from(params), counters, message]).block(block);
    frame.render_widget(paragraph, area);
}
