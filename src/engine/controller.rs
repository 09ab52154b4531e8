use log::{debug, warn};

use super::telemetry::{Telemetry, TELEMETRY_FIELDS};
use crate::error::{Error, Result};
use crate::event::{Event, MidiEvent, ParamChange, TransportData};
use crate::param::{CurveType, ParamIndex, ParameterRegistry};
use crate::ring::{EventConsumer, EventProducer, TypedConsumer};

/// Control-thread half of the engine.
///
/// Resolves parameter ids, frames events for the real-time side, and reads
/// back telemetry and emitted events. May block, allocate and log.
pub struct Controller {
    registry: ParameterRegistry,
    inbound: EventProducer,
    outbound: EventConsumer,
    telemetry: TypedConsumer<f64, TELEMETRY_FIELDS>,
    latest: Option<Telemetry>,
    rejected: u64,
}

impl Controller {
    pub(crate) fn new(
        registry: ParameterRegistry,
        inbound: EventProducer,
        outbound: EventConsumer,
        telemetry: TypedConsumer<f64, TELEMETRY_FIELDS>,
    ) -> Self {
        Self {
            registry,
            inbound,
            outbound,
            telemetry,
            latest: None,
            rejected: 0,
        }
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Move parameter `id` to `target` over `ramp_samples`, starting at
    /// absolute sample time `at`, using the parameter's default curve.
    ///
    /// A `ramp_samples` of zero jumps. Out-of-range targets are clamped on
    /// the real-time side.
    pub fn schedule_parameter_change(
        &mut self,
        id: &str,
        target: f32,
        ramp_samples: u32,
        at: u32,
    ) -> Result<()> {
        let index = self.registry.resolve(id)?;
        let curve = self
            .registry
            .info(index)
            .map(|info| info.curve)
            .unwrap_or_default();
        self.schedule_index(index, target, ramp_samples, at, curve)
    }

    pub fn schedule_parameter_change_with_curve(
        &mut self,
        id: &str,
        target: f32,
        ramp_samples: u32,
        at: u32,
        curve: CurveType,
    ) -> Result<()> {
        let index = self.registry.resolve(id)?;
        self.schedule_index(index, target, ramp_samples, at, curve)
    }

    /// Same as [`schedule_parameter_change_with_curve`](Self::schedule_parameter_change_with_curve)
    /// for an index already resolved through [`registry`](Self::registry).
    pub fn schedule_index(
        &mut self,
        index: ParamIndex,
        target: f32,
        ramp_samples: u32,
        at: u32,
        curve: CurveType,
    ) -> Result<()> {
        if self.registry.info(index).is_none() {
            return Err(Error::UnknownParameter(format!("#{}", index.get())));
        }
        let change = ParamChange::new(index, target, ramp_samples, curve);
        self.send(&Event::param_change(at, change))
    }

    pub fn send_midi(&mut self, at: u32, midi: MidiEvent) -> Result<()> {
        self.send(&Event::midi(at, midi))
    }

    pub fn send_sysex(&mut self, at: u32, bytes: &[u8]) -> Result<()> {
        let event = Event::sysex(at, bytes)?;
        self.send(&event)
    }

    pub fn send_transport(&mut self, at: u32, transport: TransportData) -> Result<()> {
        self.send(&Event::transport(at, transport))
    }

    /// Enqueue any event for the real-time side.
    ///
    /// On [`Error::BufferFull`] the event is dropped; retry later or
    /// coalesce.
    pub fn send(&mut self, event: &Event) -> Result<()> {
        self.inbound.write(event).inspect_err(|err| {
            self.rejected += 1;
            warn!(
                "dropping {:?} event at sample {}: {err}",
                event.payload.kind(),
                event.timestamp
            );
        })
    }

    /// Most recent telemetry record, discarding older ones. `None` when
    /// nothing new was published since the last poll.
    pub fn poll_telemetry(&mut self) -> Option<Telemetry> {
        let telemetry = Telemetry::from_record(&self.telemetry.pop_latest()?);

        if let Some(previous) = self.latest {
            if telemetry.telemetry_overruns > previous.telemetry_overruns {
                warn!(
                    "telemetry ring overran {} time(s); poll more often",
                    telemetry.telemetry_overruns - previous.telemetry_overruns
                );
            }
            if telemetry.malformed_frames > previous.malformed_frames {
                warn!("real-time side discarded malformed event frames");
            }
        }

        self.latest = Some(telemetry);
        Some(telemetry)
    }

    /// Last record returned by [`poll_telemetry`](Self::poll_telemetry).
    pub fn latest_telemetry(&self) -> Option<&Telemetry> {
        self.latest.as_ref()
    }

    /// Append every event emitted by the processor to `out`.
    pub fn poll_events(&mut self, out: &mut Vec<Event>) -> usize {
        let count = self.outbound.read_all_due_by(u32::MAX, out);
        if count > 0 {
            debug!("received {count} event(s) from the processor");
        }
        count
    }

    /// Events rejected by [`send`](Self::send) because the ring was full.
    pub fn rejected_events(&self) -> u64 {
        self.rejected
    }

    /// True once the [`Processor`](super::Processor) has been dropped.
    pub fn is_processor_gone(&self) -> bool {
        self.inbound.is_abandoned()
    }
}
