//! Wiring between the control thread and the real-time thread.
//!
//! [`EngineBuilder::build`] registers parameters, allocates every ring and
//! buffer up front, and returns the two halves:
//!
//! ```text
//!   Controller ──── events ────→ Processor
//!       ↑                            │
//!       ├──── emitted events ────────┤
//!       └──── telemetry records ─────┘
//! ```
//!
//! The halves share nothing but ring memory.

mod controller;
mod processor;
mod scheduler;
mod telemetry;

use log::debug;

pub use self::controller::Controller;
pub use self::processor::Processor;
pub use self::scheduler::TimedEvent;
pub use self::telemetry::{Telemetry, TELEMETRY_FIELDS};

use self::processor::ProcessorParts;
use self::scheduler::Scheduler;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::param::{ParameterInfo, ParameterInterpolator, ParameterRegistry};
use crate::ring::{EventRingBuffer, TypedRingBuffer};

/// Collects parameters and settings, then builds a [`Controller`]/[`Processor`] pair.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    parameters: Vec<ParameterInfo>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a parameter. Indices follow call order, starting at 0.
    pub fn parameter(mut self, info: ParameterInfo) -> Self {
        self.parameters.push(info);
        self
    }

    pub fn parameters(mut self, infos: impl IntoIterator<Item = ParameterInfo>) -> Self {
        self.parameters.extend(infos);
        self
    }

    /// Validate everything and allocate the engine.
    ///
    /// All setup errors surface here, before any audio callback runs.
    pub fn build(self) -> Result<(Controller, Processor)> {
        let config = self.config;
        config.validate()?;

        let mut registry = ParameterRegistry::new();
        for info in self.parameters {
            registry.register(info)?;
        }

        let (inbound_tx, inbound_rx) = EventRingBuffer::new(config.event_capacity)?;
        let (outbound_tx, outbound_rx) = EventRingBuffer::new(config.outbound_capacity)?;
        let (telemetry_tx, telemetry_rx) =
            TypedRingBuffer::<f64, TELEMETRY_FIELDS>::new(config.telemetry_capacity)?;

        let interpolators = registry
            .iter()
            .map(|(index, info)| {
                ParameterInterpolator::new(
                    index,
                    info,
                    config.exponential_fallback,
                    config.max_events_per_quantum,
                )
            })
            .collect();

        debug!(
            "engine built: {} parameter(s), block size {}, event ring {} bytes",
            registry.len(),
            config.max_block_size,
            config.event_capacity
        );

        let processor = Processor::new(ProcessorParts {
            scheduler: Scheduler::new(inbound_rx, config.max_events_per_quantum),
            interpolators,
            max_block_size: config.max_block_size,
            max_events: config.max_events_per_quantum,
            outbound: outbound_tx,
            telemetry: telemetry_tx,
            telemetry_interval: config.telemetry_interval,
        });
        let controller = Controller::new(registry, inbound_tx, outbound_rx, telemetry_rx);

        Ok((controller, processor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExponentialFallback;
    use crate::error::Error;
    use crate::event::{Event, MidiEvent, ParamChange, TransportData};
    use crate::param::{CurveType, ParamIndex};

    fn engine() -> (Controller, Processor) {
        EngineBuilder::new()
            .config(EngineConfig::default().with_telemetry_interval(1))
            .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.5))
            .parameter(ParameterInfo::new("cutoff", 20.0, 20_000.0, 1_000.0))
            .parameter(ParameterInfo::boolean("bypass", false))
            .build()
            .unwrap()
    }

    #[test]
    fn values_start_at_defaults() {
        let (_controller, mut processor) = engine();
        processor.on_render_quantum(64, 0);

        assert_eq!(processor.values(ParamIndex::new(0)), &[0.5; 64][..]);
        assert_eq!(processor.values(ParamIndex::new(1)), &[1_000.0; 64][..]);
        assert!(processor.values(ParamIndex::new(9)).is_empty());
    }

    #[test]
    fn parameter_change_lands_at_its_sample() {
        let (mut controller, mut processor) = engine();
        controller
            .schedule_parameter_change("gain", 1.0, 0, 100)
            .unwrap();

        processor.on_render_quantum(64, 0);
        assert!(processor.values(ParamIndex::new(0)).iter().all(|&v| v == 0.5));

        processor.on_render_quantum(64, 64);
        let gain = processor.values(ParamIndex::new(0));
        assert_eq!(gain[35], 0.5);
        assert_eq!(gain[36], 1.0);
        assert_eq!(gain[63], 1.0);
    }

    #[test]
    fn ramps_span_quanta() {
        let (mut controller, mut processor) = engine();
        controller
            .schedule_parameter_change_with_curve("gain", 0.0, 256, 0, CurveType::Linear)
            .unwrap();

        let mut last = f32::MAX;
        for quantum in 0..4u64 {
            processor.on_render_quantum(64, quantum * 64);
            for &v in processor.values(ParamIndex::new(0)) {
                assert!(v <= last);
                last = v;
            }
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn unknown_ids_are_rejected_on_the_control_side() {
        let (mut controller, _processor) = engine();
        assert!(matches!(
            controller.schedule_parameter_change("nope", 0.0, 0, 0),
            Err(Error::UnknownParameter(_))
        ));
        assert_eq!(
            controller.registry().index_of("cutoff"),
            Some(ParamIndex::new(1))
        );
    }

    #[test]
    fn midi_and_transport_reach_the_quantum() {
        let (mut controller, mut processor) = engine();
        let note = MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 100,
        };
        let transport = TransportData {
            tempo_bpm: 90.0,
            playing: true,
            ..TransportData::default()
        };
        controller.send_midi(10, note).unwrap();
        controller.send_transport(3, transport).unwrap();
        controller.send_sysex(20, &[0xF0, 0x7E, 0xF7]).unwrap();

        processor.on_render_quantum(32, 0);
        let events = processor.events();
        let offsets: Vec<usize> = events.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, [3, 10, 20]);
        assert_eq!(events[1].event, Event::midi(10, note));
        assert_eq!(processor.transport().tempo_bpm, 90.0);
        assert!(processor.transport().playing);

        processor.on_render_quantum(32, 32);
        assert!(processor.events().is_empty());
    }

    #[test]
    fn telemetry_reports_level_and_counters() {
        let (mut controller, mut processor) = engine();
        controller
            .schedule_parameter_change("gain", 7.0, 0, 0)
            .unwrap();
        controller
            .send(&Event::param_change(0, ParamChange::step(ParamIndex::new(42), 1.0)))
            .unwrap();

        processor.on_render_quantum(64, 1_000);
        processor.measure_output(&[0.5, -0.5, 0.5, -0.5]);
        processor.on_render_quantum(64, 1_064);

        let telemetry = controller.poll_telemetry().unwrap();
        assert_eq!(telemetry.sample_time, 1_064);
        assert_eq!(telemetry.quantum_len, 64);
        assert_eq!(telemetry.peak, 0.5);
        assert_eq!(telemetry.clamped_values, 1);
        assert_eq!(telemetry.dropped_events, 1);
        assert_eq!(telemetry.late_events, 2);
        assert!(controller.poll_telemetry().is_none());
    }

    #[test]
    fn emitted_events_reach_the_controller() {
        let (mut controller, mut processor) = engine();
        let cc = MidiEvent::ControlChange {
            channel: 1,
            controller: 7,
            value: 64,
        };
        assert!(processor.emit(Event::midi(5, cc)));

        let mut out = Vec::new();
        assert_eq!(controller.poll_events(&mut out), 1);
        assert_eq!(out[0], Event::midi(5, cc));
    }

    #[test]
    fn oversized_quanta_are_truncated() {
        let (_controller, mut processor) = EngineBuilder::new()
            .config(EngineConfig::default().with_max_block_size(128))
            .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.0))
            .build()
            .unwrap();

        processor.on_render_quantum(4096, 0);
        assert_eq!(processor.quantum_len(), 128);
        assert_eq!(processor.values(ParamIndex::new(0)).len(), 128);
    }

    #[test]
    fn setup_errors_surface_from_build() {
        let duplicate = EngineBuilder::new()
            .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.0))
            .parameter(ParameterInfo::new("gain", 0.0, 2.0, 0.0))
            .build();
        assert!(matches!(duplicate, Err(Error::DuplicateParameter(_))));

        let bad_ring = EngineBuilder::new()
            .config(EngineConfig::default().with_event_capacity(3000))
            .build();
        assert!(matches!(bad_ring, Err(Error::InvalidCapacity(3000))));

        let odd_ring = EngineBuilder::new()
            .config(EngineConfig::default().with_event_capacity(300))
            .build();
        assert!(matches!(odd_ring, Err(Error::InvalidCapacity(300))));

        let small_ring = EngineBuilder::new()
            .config(EngineConfig::default().with_event_capacity(256))
            .build();
        assert!(matches!(
            small_ring,
            Err(Error::FrameTooLarge { capacity: 256, .. })
        ));

        let small_outbound = EngineBuilder::new()
            .config(EngineConfig::default().with_outbound_capacity(128))
            .build();
        assert!(matches!(
            small_outbound,
            Err(Error::FrameTooLarge { capacity: 128, .. })
        ));

        let bad_floor = EngineBuilder::new()
            .config(
                EngineConfig::default()
                    .with_exponential_fallback(ExponentialFallback::Floor(-1.0)),
            )
            .build();
        assert!(matches!(bad_floor, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn events_stay_sample_accurate_past_the_32_bit_clock() {
        let (mut controller, mut processor) = engine();
        let gain = ParamIndex::new(0);
        let start = 1u64 << 32;

        controller.schedule_parameter_change("gain", 1.0, 0, 40).unwrap();
        processor.on_render_quantum(64, start);
        let values = processor.values(gain);
        assert_eq!(values[0], 0.5);
        assert_eq!(values[39], 0.5);
        assert_eq!(values[40], 1.0);
        assert_eq!(processor.telemetry().late_events, 0);

        // Far ahead of the wrapped clock: waits for its sample.
        controller.schedule_parameter_change("gain", 0.0, 0, 1_100_000).unwrap();
        processor.on_render_quantum(64, start + 1_000_000);
        assert!(processor.values(gain).iter().all(|&v| v == 1.0));

        processor.on_render_quantum(64, start + 1_099_990);
        let values = processor.values(gain);
        assert_eq!(values[9], 1.0);
        assert_eq!(values[10], 0.0);
        assert_eq!(processor.telemetry().late_events, 0);

        // u32::MAX is now a million samples behind the clock.
        controller.schedule_parameter_change("gain", 0.25, 0, u32::MAX).unwrap();
        processor.on_render_quantum(64, start + 1_200_000);
        assert_eq!(processor.values(gain)[0], 0.25);
        assert_eq!(processor.telemetry().late_events, 1);
    }

    #[test]
    fn halves_notice_when_the_other_is_dropped() {
        let (controller, processor) = engine();
        assert!(!processor.is_controller_gone());
        drop(controller);
        assert!(processor.is_controller_gone());
    }
}
