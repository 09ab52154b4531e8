use super::scheduler::{Scheduler, TimedEvent};
use super::telemetry::{OutputMeter, Telemetry, TELEMETRY_FIELDS};
use crate::event::{Event, EventPayload, TransportData};
use crate::param::{ParamIndex, ParameterInterpolator, ParameterState};
use crate::ring::{EventProducer, TypedProducer};

/// Real-time half of the engine.
///
/// Move it into the audio callback and call
/// [`on_render_quantum`](Self::on_render_quantum) once per block before
/// rendering. Every method is bounded and wait-free: no locks, no allocation,
/// no logging.
pub struct Processor {
    scheduler: Scheduler,
    interpolators: Vec<ParameterInterpolator>,

    // One `max_block_size` lane per parameter
    values: Vec<f32>,
    max_block_size: usize,
    quantum_len: usize,
    sample_time: u64,

    events: Vec<TimedEvent>,
    transport: TransportData,

    outbound: EventProducer,
    telemetry: TypedProducer<f64, TELEMETRY_FIELDS>,
    telemetry_interval: u32,
    quanta_since_publish: u32,
    meter: OutputMeter,

    dropped: u64,
    telemetry_overruns: u64,
}

pub(crate) struct ProcessorParts {
    pub scheduler: Scheduler,
    pub interpolators: Vec<ParameterInterpolator>,
    pub max_block_size: usize,
    pub max_events: usize,
    pub outbound: EventProducer,
    pub telemetry: TypedProducer<f64, TELEMETRY_FIELDS>,
    pub telemetry_interval: u32,
}

impl Processor {
    pub(crate) fn new(parts: ProcessorParts) -> Self {
        let mut values = vec![0.0; parts.interpolators.len() * parts.max_block_size];
        for (lane, interpolator) in values
            .chunks_mut(parts.max_block_size)
            .zip(&parts.interpolators)
        {
            lane.fill(interpolator.value());
        }

        Self {
            scheduler: parts.scheduler,
            interpolators: parts.interpolators,
            values,
            max_block_size: parts.max_block_size,
            quantum_len: 0,
            sample_time: 0,
            events: Vec::with_capacity(parts.max_events),
            transport: TransportData::default(),
            outbound: parts.outbound,
            telemetry: parts.telemetry,
            telemetry_interval: parts.telemetry_interval,
            quanta_since_publish: 0,
            meter: OutputMeter::default(),
            dropped: 0,
            telemetry_overruns: 0,
        }
    }

    /// Start a render quantum of `quantum_len` samples beginning at
    /// `current_sample_time`.
    ///
    /// Drains every event due before the quantum ends, routes parameter
    /// changes to their interpolators, and refreshes every parameter's
    /// per-sample values. Quanta longer than the configured maximum are
    /// truncated.
    pub fn on_render_quantum(&mut self, quantum_len: usize, current_sample_time: u64) {
        let len = quantum_len.min(self.max_block_size);
        self.quantum_len = len;
        self.sample_time = current_sample_time;
        self.events.clear();

        for &timed in self.scheduler.collect(current_sample_time, len) {
            match timed.event.payload {
                EventPayload::ParamChange(change) => {
                    match self.interpolators.get_mut(change.index.get()) {
                        Some(interpolator) => {
                            interpolator.schedule(timed.offset, change);
                        }
                        None => self.dropped += 1,
                    }
                }
                EventPayload::Transport(transport) => {
                    self.transport = transport;
                    self.events.push(timed);
                }
                EventPayload::Midi(_) | EventPayload::Sysex(_) => self.events.push(timed),
            }
        }

        if len > 0 {
            for (lane, interpolator) in self
                .values
                .chunks_mut(self.max_block_size)
                .zip(self.interpolators.iter_mut())
            {
                interpolator.process(&mut lane[..len]);
            }
        }

        self.quanta_since_publish += 1;
        if self.quanta_since_publish >= self.telemetry_interval {
            self.quanta_since_publish = 0;
            self.publish_telemetry();
        }
    }

    /// Per-sample values of a parameter for the current quantum.
    ///
    /// Empty for an unknown index or before the first quantum.
    pub fn values(&self, index: ParamIndex) -> &[f32] {
        let start = index.get() * self.max_block_size;
        self.values
            .get(start..start + self.quantum_len)
            .unwrap_or(&[])
    }

    /// Value at the end of the current quantum.
    pub fn value(&self, index: ParamIndex) -> Option<f32> {
        self.interpolators.get(index.get()).map(|i| i.value())
    }

    pub fn parameter_state(&self, index: ParamIndex) -> Option<&ParameterState> {
        self.interpolators.get(index.get()).map(|i| i.state())
    }

    /// MIDI, sysex and transport events of the current quantum, by offset.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn transport(&self) -> &TransportData {
        &self.transport
    }

    pub fn quantum_len(&self) -> usize {
        self.quantum_len
    }

    pub fn sample_time(&self) -> u64 {
        self.sample_time
    }

    pub fn parameter_count(&self) -> usize {
        self.interpolators.len()
    }

    /// Feed rendered output to the level meter reported in telemetry.
    pub fn measure_output(&mut self, block: &[f32]) {
        self.meter.measure(block);
    }

    /// Send an event to the control thread. False (and counted) when full.
    pub fn emit(&mut self, event: Event) -> bool {
        match self.outbound.write(&event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                false
            }
        }
    }

    /// True once the [`Controller`](super::Controller) has been dropped.
    pub fn is_controller_gone(&self) -> bool {
        self.scheduler.is_abandoned()
    }

    /// Current counters, without publishing them.
    pub fn telemetry(&self) -> Telemetry {
        let (mut dropped, mut clamped) = (self.dropped, 0);
        for interpolator in &self.interpolators {
            dropped += interpolator.dropped_count();
            clamped += interpolator.clamped_count();
        }

        Telemetry {
            sample_time: self.sample_time,
            quantum_len: self.quantum_len as u32,
            peak: 0.0,
            rms: 0.0,
            dropped_events: dropped,
            late_events: self.scheduler.late(),
            clamped_values: clamped,
            telemetry_overruns: self.telemetry_overruns,
            malformed_frames: self.scheduler.malformed(),
        }
    }

    fn publish_telemetry(&mut self) {
        let (peak, rms) = self.meter.take();
        let record = Telemetry {
            peak,
            rms,
            ..self.telemetry()
        }
        .to_record();

        if !self.telemetry.push(record) {
            self.telemetry_overruns += 1;
        }
    }
}
