use crate::config::ExponentialFallback;
use crate::event::ParamChange;
use crate::param::info::{quantize, CurveType, ParameterInfo};
use crate::param::ParamIndex;

/*
Parameter Interpolation
=======================

Automation arrives as sparse events ("go to 0.8 over 480 samples, starting at
sample 1200"). DSP code wants one value per sample. The interpolator sits in
between and turns the former into the latter, one render quantum at a time.

Vocabulary
----------

  quantum     The block of N samples the host asks us to render.

  offset      Where inside the quantum an event takes effect (0..N).

  ramp        How many samples a change takes to reach its target.
              Zero means "jump".

  curve       Linear (constant delta per sample), Exponential (constant
              ratio per sample), or Step (jump, ignore the ramp length).


The State Machine
-----------------

                 change, ramp > 0
      ┌──────┐ ─────────────────→ ┌─────────┐
      │ Idle │                    │ Ramping │ ──┐ change, ramp > 0
      └──────┘ ←───────────────── └─────────┘ ←─┘ (restart from current)
        ↑  │    remaining == 0         │
        │  │                           │ change, ramp == 0
        │  │ change, ramp == 0         ↓
        │  └──────────────────→ ┌─────────┐
        └────────────────────── │ Stepped │
              value written     └─────────┘

Key behavior: a new change while Ramping starts from the CURRENT interpolated
value, not from the previous target. This keeps the output continuous.


Filling a Quantum
-----------------

  out: [ ....... | ....... | ............ ]
         carry on  event A    event B ...
                   applied    applied

Scheduled changes are kept sorted by offset (ties keep arrival order). We
generate samples up to the next offset, apply that change, and continue.
Every written value is clamped to [min, max] and, for discrete parameters,
snapped to the step grid. The clamp is applied to the output regardless of
what the curve math produced.


Curves
------

  Linear:       value(k) = start + k * (target - start) / ramp
  Exponential:  value(k) = start * ratio^k,  ratio = (target / start)^(1 / ramp)

On the last sample of a ramp the value snaps to the exact target, so
rounding never leaves a ramp short.

An exponential curve through zero or across signs is undefined. When either
endpoint is zero or negative the ExponentialFallback policy decides: ramp
linearly, or substitute a small positive floor.
*/

/// Where the interpolator is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolatorPhase {
    Idle,
    Ramping,
    /// A jump was applied and will be emitted on the next sample.
    Stepped,
}

/// Real-time state of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterState {
    pub index: ParamIndex,
    pub current_value: f32,
    pub target_value: f32,
    pub ramp_samples_remaining: u32,
    pub curve: CurveType,
}

#[derive(Debug, Clone, Copy)]
enum RampShape {
    Linear { start: f32, delta: f32 },
    Exponential { value: f64, ratio: f64 },
}

/// Turns scheduled [`ParamChange`]s into per-sample values for one parameter.
///
/// Owned by the real-time thread. Nothing here allocates after construction.
pub struct ParameterInterpolator {
    state: ParameterState,
    phase: InterpolatorPhase,

    // Copied from ParameterInfo at build time
    min_value: f32,
    max_value: f32,
    step: f32,
    discrete: bool,
    fallback: ExponentialFallback,

    // Ramp bookkeeping
    shape: RampShape,
    ramp_elapsed: u32,

    // Changes scheduled for the current quantum, sorted by offset
    pending: Vec<(usize, ParamChange)>,
    max_pending: usize,

    clamped: u64,
    dropped: u64,
}

impl ParameterInterpolator {
    /// `max_pending` bounds how many changes one quantum can hold for this parameter.
    pub fn new(
        index: ParamIndex,
        info: &ParameterInfo,
        fallback: ExponentialFallback,
        max_pending: usize,
    ) -> Self {
        let default = info.constrain(info.default_value);
        let max_pending = max_pending.max(1);
        Self {
            state: ParameterState {
                index,
                current_value: default,
                target_value: default,
                ramp_samples_remaining: 0,
                curve: info.curve,
            },
            phase: InterpolatorPhase::Idle,
            min_value: info.min_value,
            max_value: info.max_value,
            step: info.step(),
            discrete: info.is_discrete(),
            fallback,
            shape: RampShape::Linear {
                start: default,
                delta: 0.0,
            },
            ramp_elapsed: 0,
            pending: Vec::with_capacity(max_pending),
            max_pending,
            clamped: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> &ParameterState {
        &self.state
    }

    pub fn phase(&self) -> InterpolatorPhase {
        self.phase
    }

    /// Most recent value, as it would be written out.
    pub fn value(&self) -> f32 {
        self.constrain(self.state.current_value)
    }

    pub fn is_ramping(&self) -> bool {
        self.phase == InterpolatorPhase::Ramping
    }

    /// Targets that had to be clamped into range.
    pub fn clamped_count(&self) -> u64 {
        self.clamped
    }

    /// Changes dropped because the per-quantum schedule was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Jump to `value` immediately, cancelling any ramp and scheduled change.
    pub fn reset(&mut self, value: f32) {
        let value = self.constrain(value);
        self.state.current_value = value;
        self.state.target_value = value;
        self.state.ramp_samples_remaining = 0;
        self.phase = InterpolatorPhase::Idle;
        self.pending.clear();
    }

    /// Queue a change at `offset` samples into the next [`process`](Self::process) call.
    ///
    /// Returns false (and counts a drop) when the schedule is full.
    pub fn schedule(&mut self, offset: usize, change: ParamChange) -> bool {
        if self.pending.len() >= self.max_pending {
            self.dropped += 1;
            return false;
        }

        // Insert after every entry at or before `offset`, so ties keep arrival order.
        let position = self
            .pending
            .iter()
            .rposition(|&(at, _)| at <= offset)
            .map_or(0, |i| i + 1);
        self.pending.insert(position, (offset, change));
        true
    }

    /// Apply a change right now, as if it landed on the next sample.
    pub fn apply(&mut self, change: ParamChange) {
        let target = self.constrain(change.value);
        if !(self.min_value..=self.max_value).contains(&change.value) {
            self.clamped += 1;
        }

        let curve = if self.discrete {
            CurveType::Step
        } else {
            change.curve
        };
        self.state.target_value = target;
        self.state.curve = curve;

        if change.ramp_samples == 0 || curve == CurveType::Step {
            self.state.current_value = target;
            self.state.ramp_samples_remaining = 0;
            self.phase = InterpolatorPhase::Stepped;
            return;
        }

        let start = self.state.current_value;
        self.shape = self.ramp_shape(start, target, change.ramp_samples, curve);
        self.ramp_elapsed = 0;
        self.state.ramp_samples_remaining = change.ramp_samples;
        self.phase = InterpolatorPhase::Ramping;
    }

    /// Fill `out` with one value per sample, applying scheduled changes at
    /// their offsets. Clears the schedule.
    pub fn process(&mut self, out: &mut [f32]) {
        let mut cursor = 0;

        for i in 0..self.pending.len() {
            let (offset, change) = self.pending[i];
            let at = offset.min(out.len());
            while cursor < at {
                out[cursor] = self.tick();
                cursor += 1;
            }
            self.apply(change);
        }
        self.pending.clear();

        for sample in out[cursor..].iter_mut() {
            *sample = self.tick();
        }
    }

    /// Advance one sample and return the value to write.
    #[inline]
    fn tick(&mut self) -> f32 {
        match self.phase {
            InterpolatorPhase::Idle => {}
            InterpolatorPhase::Stepped => self.phase = InterpolatorPhase::Idle,
            InterpolatorPhase::Ramping => {
                self.ramp_elapsed += 1;
                self.state.ramp_samples_remaining -= 1;

                if self.state.ramp_samples_remaining == 0 {
                    self.state.current_value = self.state.target_value;
                    self.phase = InterpolatorPhase::Idle;
                } else {
                    self.state.current_value = match &mut self.shape {
                        RampShape::Linear { start, delta } => {
                            *start + *delta * self.ramp_elapsed as f32
                        }
                        RampShape::Exponential { value, ratio } => {
                            *value *= *ratio;
                            *value as f32
                        }
                    };
                }
            }
        }

        self.constrain(self.state.current_value)
    }

    fn ramp_shape(&self, start: f32, target: f32, ramp: u32, curve: CurveType) -> RampShape {
        let linear = RampShape::Linear {
            start,
            delta: (target - start) / ramp as f32,
        };
        if curve != CurveType::Exponential {
            return linear;
        }

        let (from, to) = if start > 0.0 && target > 0.0 {
            (start, target)
        } else {
            match self.fallback {
                ExponentialFallback::Linear => return linear,
                ExponentialFallback::Floor(floor) => {
                    if start < 0.0 || target < 0.0 {
                        return linear;
                    }
                    (start.max(floor), target.max(floor))
                }
            }
        };

        let ratio = (to as f64 / from as f64).powf(1.0 / ramp as f64);
        RampShape::Exponential {
            value: from as f64,
            ratio,
        }
    }

    #[inline]
    fn constrain(&self, value: f32) -> f32 {
        let value = if value.is_nan() {
            self.state.current_value
        } else {
            value
        };
        let clamped = value.max(self.min_value).min(self.max_value);
        if self.discrete {
            quantize(clamped, self.min_value, self.max_value, self.step)
        } else {
            clamped
        }
    }
}
