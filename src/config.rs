#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::MAX_BLOCK_SIZE;

/// What an exponential ramp does when an endpoint is zero or negative.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ExponentialFallback {
    /// Ramp linearly instead.
    #[default]
    Linear,
    /// Replace non-positive endpoints with this floor and ramp exponentially,
    /// snapping to the real target on the last sample. Targets below zero
    /// still fall back to linear.
    Floor(f32),
}

/// Sizes and policies fixed when the engine is built.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Bytes in the control → real-time event ring.
    pub event_capacity: usize,
    /// Bytes in the real-time → control event ring.
    pub outbound_capacity: usize,
    /// Bytes in the telemetry ring.
    pub telemetry_capacity: usize,
    /// Longest render quantum, in samples. Longer requests are truncated.
    pub max_block_size: usize,
    /// Events drained per quantum. The rest wait for the next quantum.
    pub max_events_per_quantum: usize,
    /// Publish telemetry every this many quanta.
    pub telemetry_interval: u32,
    pub exponential_fallback: ExponentialFallback,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: 16 * 1024,
            outbound_capacity: 4 * 1024,
            telemetry_capacity: 4 * 1024,
            max_block_size: MAX_BLOCK_SIZE,
            max_events_per_quantum: 256,
            telemetry_interval: 8,
            exponential_fallback: ExponentialFallback::Linear,
        }
    }
}

impl EngineConfig {
    pub fn with_event_capacity(mut self, bytes: usize) -> Self {
        self.event_capacity = bytes;
        self
    }

    pub fn with_outbound_capacity(mut self, bytes: usize) -> Self {
        self.outbound_capacity = bytes;
        self
    }

    pub fn with_telemetry_capacity(mut self, bytes: usize) -> Self {
        self.telemetry_capacity = bytes;
        self
    }

    pub fn with_max_block_size(mut self, samples: usize) -> Self {
        self.max_block_size = samples;
        self
    }

    pub fn with_max_events_per_quantum(mut self, events: usize) -> Self {
        self.max_events_per_quantum = events;
        self
    }

    pub fn with_telemetry_interval(mut self, quanta: u32) -> Self {
        self.telemetry_interval = quanta;
        self
    }

    pub fn with_exponential_fallback(mut self, fallback: ExponentialFallback) -> Self {
        self.exponential_fallback = fallback;
        self
    }

    /// Catch settings that can only be wrong. Ring capacities are left to
    /// the ring constructors, which report `InvalidCapacity` or
    /// `FrameTooLarge`.
    pub fn validate(&self) -> Result<()> {
        if self.max_block_size == 0 {
            return Err(Error::InvalidConfig("max_block_size must be non-zero"));
        }
        if self.max_events_per_quantum == 0 {
            return Err(Error::InvalidConfig(
                "max_events_per_quantum must be non-zero",
            ));
        }
        if self.telemetry_interval == 0 {
            return Err(Error::InvalidConfig("telemetry_interval must be non-zero"));
        }
        if let ExponentialFallback::Floor(floor) = self.exponential_fallback {
            if !(floor.is_finite() && floor > 0.0) {
                return Err(Error::InvalidConfig(
                    "exponential floor must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn ring_sizes_are_left_to_the_rings() {
        let config = EngineConfig::default()
            .with_event_capacity(300)
            .with_outbound_capacity(256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_settings() {
        let base = EngineConfig::default();
        assert!(base.clone().with_max_block_size(0).validate().is_err());
        assert!(base.clone().with_telemetry_interval(0).validate().is_err());
        assert!(base.clone().with_max_events_per_quantum(0).validate().is_err());
        assert!(base
            .clone()
            .with_exponential_fallback(ExponentialFallback::Floor(0.0))
            .validate()
            .is_err());
        assert!(base
            .with_exponential_fallback(ExponentialFallback::Floor(1e-4))
            .validate()
            .is_ok());
    }
}
