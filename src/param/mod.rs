//! Parameter descriptors, lookup, and sample-accurate interpolation.

pub mod info;
pub mod interpolator;
pub mod registry;

pub use info::{CurveType, ParameterInfo, ParameterKind};
pub use interpolator::{InterpolatorPhase, ParameterInterpolator, ParameterState};
pub use registry::{ParamIndex, ParameterRegistry};
