//! Parameter metadata.
//!
//! [`ParameterInfo`] is written once on the control thread, registered, and
//! then only ever read. The real-time side copies the few numbers it needs
//! into its interpolators at build time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How automation moves between two values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveType {
    /// Constant per-sample delta.
    #[default]
    Linear,
    /// Constant per-sample ratio. Suited to frequencies and gains.
    Exponential,
    /// Jump at the event offset, ignoring any ramp length.
    Step,
}

impl CurveType {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            CurveType::Linear => 0,
            CurveType::Exponential => 1,
            CurveType::Step => 2,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(CurveType::Linear),
            1 => Some(CurveType::Exponential),
            2 => Some(CurveType::Step),
            _ => None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterKind {
    #[default]
    Float,
    Int,
    Boolean,
    /// Indexed list of labels; the value is the index.
    Choice(Vec<String>),
}

/// Immutable description of one automatable parameter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Unique identifier used by the control thread (e.g. "cutoff").
    pub id: String,
    /// Display name (e.g. "Filter Cutoff").
    pub label: String,
    pub kind: ParameterKind,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    /// Unit label (e.g. "dB", "Hz").
    pub units: String,
    /// Curve used when a change does not name one.
    pub curve: CurveType,
    /// Quantization step. 0 = continuous.
    pub discrete_step: f32,
    /// Skew for normalization: `value = min + range * normalized^exponent`.
    pub exponent: f32,
}

impl ParameterInfo {
    /// Create a continuous parameter with a linear curve.
    pub fn new(id: impl Into<String>, min_value: f32, max_value: f32, default_value: f32) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind: ParameterKind::Float,
            min_value,
            max_value,
            default_value,
            units: String::new(),
            curve: CurveType::Linear,
            discrete_step: 0.0,
            exponent: 1.0,
        }
    }

    pub fn int(id: impl Into<String>, min_value: i32, max_value: i32, default_value: i32) -> Self {
        Self {
            kind: ParameterKind::Int,
            curve: CurveType::Step,
            discrete_step: 1.0,
            ..Self::new(id, min_value as f32, max_value as f32, default_value as f32)
        }
    }

    pub fn boolean(id: impl Into<String>, default_value: bool) -> Self {
        Self {
            kind: ParameterKind::Boolean,
            curve: CurveType::Step,
            discrete_step: 1.0,
            ..Self::new(id, 0.0, 1.0, if default_value { 1.0 } else { 0.0 })
        }
    }

    pub fn choice<I, S>(id: impl Into<String>, choices: I, default_index: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let max_value = choices.len().saturating_sub(1) as f32;
        Self {
            kind: ParameterKind::Choice(choices),
            curve: CurveType::Step,
            discrete_step: 1.0,
            ..Self::new(id, 0.0, max_value, default_index as f32)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_curve(mut self, curve: CurveType) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_discrete_step(mut self, step: f32) -> Self {
        self.discrete_step = step;
        self
    }

    pub fn with_exponent(mut self, exponent: f32) -> Self {
        self.exponent = exponent;
        self
    }

    /// Check the descriptor is usable. Called by the registry.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason| Err(Error::invalid_parameter(self.id.as_str(), reason));

        if self.id.is_empty() {
            return fail("empty id");
        }
        if !(self.min_value.is_finite() && self.max_value.is_finite()) {
            return fail("range bounds must be finite");
        }
        if self.min_value > self.max_value {
            return fail("min exceeds max");
        }
        if !self.default_value.is_finite()
            || self.default_value < self.min_value
            || self.default_value > self.max_value
        {
            return fail("default outside range");
        }
        if !self.discrete_step.is_finite() || self.discrete_step < 0.0 {
            return fail("discrete step must be finite and non-negative");
        }
        if !self.exponent.is_finite() || self.exponent <= 0.0 {
            return fail("exponent must be positive");
        }
        if let ParameterKind::Choice(choices) = &self.kind {
            if choices.is_empty() {
                return fail("choice parameter without choices");
            }
        }
        Ok(())
    }

    /// Discrete parameters never ramp; they step and quantize.
    pub fn is_discrete(&self) -> bool {
        !matches!(self.kind, ParameterKind::Float) || self.discrete_step > 0.0
    }

    /// Quantization step, 0 for continuous parameters.
    pub fn step(&self) -> f32 {
        match self.kind {
            ParameterKind::Float => self.discrete_step,
            _ if self.discrete_step > 0.0 => self.discrete_step,
            _ => 1.0,
        }
    }

    /// Clamp into `[min, max]`. NaN maps to the default.
    ///
    /// Never panics, even on a descriptor that would fail
    /// [`validate`](Self::validate); an inverted range yields `max`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value;
        }
        value.max(self.min_value).min(self.max_value)
    }

    /// Clamp, then snap discrete parameters to their step grid.
    pub fn constrain(&self, value: f32) -> f32 {
        quantize(self.clamp(value), self.min_value, self.max_value, self.step())
    }

    /// Map a plain value to `0.0..=1.0`, honouring the exponent skew.
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max_value - self.min_value;
        if range <= 0.0 {
            return 0.0;
        }
        let linear = (self.constrain(value) - self.min_value) / range;
        linear.powf(1.0 / self.exponent)
    }

    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        let range = self.max_value - self.min_value;
        self.constrain(self.min_value + range * normalized.powf(self.exponent))
    }

    /// Human-readable value, with units when set.
    pub fn value_string(&self, value: f32) -> String {
        let value = self.constrain(value);
        let text = match &self.kind {
            ParameterKind::Choice(choices) => {
                let index = (value - self.min_value).round().max(0.0) as usize;
                choices.get(index).cloned().unwrap_or_default()
            }
            ParameterKind::Boolean => String::from(if value >= 0.5 { "on" } else { "off" }),
            ParameterKind::Int => format!("{value:.0}"),
            ParameterKind::Float => format!("{value:.2}"),
        };

        if self.units.is_empty() {
            text
        } else {
            format!("{text} {}", self.units)
        }
    }
}

/// Snap `value` onto the grid `min + k * step`, staying inside `[min, max]`.
#[inline]
pub(crate) fn quantize(value: f32, min: f32, max: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    let snapped = min + ((value - min) / step).round() * step;
    snapped.max(min).min(max)
}
