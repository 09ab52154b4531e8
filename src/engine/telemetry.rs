//! Status records published by the real-time side.
//!
//! A [`Telemetry`] snapshot travels as one fixed-size `f64` record through a
//! [`TypedRingBuffer`](crate::ring::TypedRingBuffer). Counters are cumulative
//! since the engine was built, so losing a record loses nothing but time
//! resolution.

/// Number of `f64` slots in one record.
pub const TELEMETRY_FIELDS: usize = 9;

pub(crate) type TelemetryRecord = [f64; TELEMETRY_FIELDS];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Telemetry {
    /// Sample time of the quantum that published this record.
    pub sample_time: u64,
    pub quantum_len: u32,
    /// Output peak since the previous record.
    pub peak: f32,
    /// Output RMS since the previous record.
    pub rms: f32,
    /// Events that never reached their destination.
    pub dropped_events: u64,
    /// Events that arrived after their timestamp and were applied at offset 0.
    pub late_events: u64,
    /// Parameter targets that were clamped into range.
    pub clamped_values: u64,
    /// Records lost because the telemetry ring was full.
    pub telemetry_overruns: u64,
    pub malformed_frames: u64,
}

impl Telemetry {
    pub(crate) fn to_record(self) -> TelemetryRecord {
        [
            self.sample_time as f64,
            self.quantum_len as f64,
            self.peak as f64,
            self.rms as f64,
            self.dropped_events as f64,
            self.late_events as f64,
            self.clamped_values as f64,
            self.telemetry_overruns as f64,
            self.malformed_frames as f64,
        ]
    }

    pub(crate) fn from_record(record: &TelemetryRecord) -> Self {
        Self {
            sample_time: record[0] as u64,
            quantum_len: record[1] as u32,
            peak: record[2] as f32,
            rms: record[3] as f32,
            dropped_events: record[4] as u64,
            late_events: record[5] as u64,
            clamped_values: record[6] as u64,
            telemetry_overruns: record[7] as u64,
            malformed_frames: record[8] as u64,
        }
    }

    /// Output peak in dBFS, floored at -120.
    pub fn peak_db(&self) -> f32 {
        amplitude_to_db(self.peak)
    }

    pub fn rms_db(&self) -> f32 {
        amplitude_to_db(self.rms)
    }
}

fn amplitude_to_db(amplitude: f32) -> f32 {
    (20.0 * amplitude.max(1e-6).log10()).max(-120.0)
}

/// Accumulates output level between telemetry records.
#[derive(Debug, Default)]
pub(crate) struct OutputMeter {
    peak: f32,
    sum_squares: f64,
    samples: u64,
}

impl OutputMeter {
    pub fn measure(&mut self, block: &[f32]) {
        for &sample in block {
            self.peak = self.peak.max(sample.abs());
            self.sum_squares += (sample as f64) * (sample as f64);
        }
        self.samples += block.len() as u64;
    }

    /// Return `(peak, rms)` and start a new window.
    pub fn take(&mut self) -> (f32, f32) {
        let rms = if self.samples == 0 {
            0.0
        } else {
            (self.sum_squares / self.samples as f64).sqrt() as f32
        };
        let peak = self.peak;
        *self = Self::default();
        (peak, rms)
    }
}
