//! Real-time runtime core for audio plugins.
//!
//! A control thread schedules parameter automation and events; a real-time
//! thread turns them into sample-accurate per-quantum values. The two sides
//! talk only through wait-free single-producer/single-consumer rings.
//!
//! ```no_run
//! use wam_rt::{EngineBuilder, ParameterInfo};
//!
//! let (mut controller, mut processor) = EngineBuilder::new()
//!     .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.5))
//!     .build()?;
//! let gain = controller.registry().resolve("gain")?;
//!
//! // Control thread
//! controller.schedule_parameter_change("gain", 1.0, 480, 0)?;
//!
//! // Audio callback
//! processor.on_render_quantum(128, 0);
//! let per_sample_gain: &[f32] = processor.values(gain);
//! # let _ = per_sample_gain;
//! # Ok::<(), wam_rt::Error>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod param;
pub mod ring; // Lock-free transports

pub use config::{EngineConfig, ExponentialFallback};
pub use engine::{Controller, EngineBuilder, Processor, Telemetry, TimedEvent};
pub use error::{Error, Result};
pub use event::{Event, EventPayload, MidiEvent, ParamChange, TransportData};
pub use param::{CurveType, ParamIndex, ParameterInfo, ParameterKind, ParameterRegistry};

/// Longest render quantum the engine preallocates for, in samples.
pub const MAX_BLOCK_SIZE: usize = 2048;
