//! Spectrum view
//!
//! Hann-windowed FFT of the scope buffer, plotted on a log-frequency axis
//! with a slowly decaying peak hold.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Points on the log-frequency axis
const POINTS: usize = 64;
const FLOOR_DB: f64 = -100.0;
/// Peak hold decay per update, in dB
const HOLD_DECAY_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin for each plotted point
    bins: Vec<usize>,
    /// (log10 Hz, dB) per point
    live: Vec<(f64, f64)>,
    hold: Vec<(f64, f64)>,
    /// Loudest frequency in the last update
    dominant_hz: f64,
    bin_hz: f64,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window = (0..size)
            .map(|i| {
                let phase = std::f32::consts::TAU * i as f32 / size.saturating_sub(1).max(1) as f32;
                0.5 - 0.5 * phase.cos()
            })
            .collect();

        let bin_hz = sample_rate as f64 / size.max(1) as f64;
        let nyquist = (sample_rate as f64 / 2.0).clamp(40.0, 20_000.0);
        let last_bin = (size / 2).saturating_sub(1);

        let mut bins = Vec::with_capacity(POINTS);
        let mut live = Vec::with_capacity(POINTS);
        for i in 0..POINTS {
            let t = i as f64 / (POINTS - 1) as f64;
            let freq = 20.0 * (nyquist / 20.0).powf(t);
            bins.push(((freq / bin_hz).round() as usize).min(last_bin));
            live.push((freq.log10(), FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            bins,
            hold: live.clone(),
            live,
            dominant_hz: 0.0,
            bin_hz,
        }
    }

    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Normalize so a full-scale sine sits near 0 dB
        let norm = 2.0 / self.window.iter().sum::<f32>().max(1.0);
        let mut loudest = (0usize, f64::MIN);
        for (point, &bin) in self.bins.iter().enumerate() {
            let magnitude = (self.scratch[bin].norm() * norm).max(1e-9) as f64;
            let db = (20.0 * magnitude.log10()).max(FLOOR_DB);

            self.live[point].1 = db;
            let held = &mut self.hold[point].1;
            *held = db.max(*held - HOLD_DECAY_DB);

            if db > loudest.1 {
                loudest = (bin, db);
            }
        }
        self.dominant_hz = loudest.0 as f64 * self.bin_hz;
    }

    pub fn data(&self) -> SpectrumData<'_> {
        SpectrumData {
            live: &self.live,
            hold: &self.hold,
            dominant_hz: self.dominant_hz,
        }
    }
}

pub struct SpectrumData<'a> {
    live: &'a [(f64, f64)],
    hold: &'a [(f64, f64)],
    dominant_hz: f64,
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, data: SpectrumData) {
    let title = format!(" Spectrum  ~{:.0} Hz ", data.dominant_hz);

    let hold = Dataset::default()
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::DarkGray))
        .data(data.hold);
    let live = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(data.live);

    let (low, high) = match (data.live.first(), data.live.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => (1.0, 4.0),
    };

    let chart = Chart::new(vec![hold, live])
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([low, high])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 6.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
