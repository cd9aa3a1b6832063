//! Per-axis rate limiting
//!
//! Bounds how quickly a shaped demand may change from one cycle to the next.
//! Forward and reverse travel are ramped by separate accumulators, the one in
//! use is picked from the sign of the target, so reversing direction starts
//! the new direction's ramp from zero.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Accumulator state for one axis.
///
/// At most one of the accumulators is nonzero at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RampState {
    pub positive_acc: f64,
    pub negative_acc: f64,
    pub limit_per_cycle: f64,
}

/// Rate limiter owning the ramp state of a single axis.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RateLimiter {
    state: RampState,

    /// True if the last step was cut short by the limit.
    limited: bool,
}

/// Which of the two accumulators is driving the output.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Active {
    Positive,
    Negative,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Step `state` towards `target` by at most `max_step_per_cycle`, returning
/// the new output.
///
/// A zero target keeps whichever accumulator is currently nonzero active so a
/// released input ramps down rather than snapping to zero.
pub fn limit(state: &mut RampState, target: f64, max_step_per_cycle: f64) -> f64 {
    let active = if target > 0.0 {
        Active::Positive
    } else if target < 0.0 {
        Active::Negative
    } else if state.negative_acc != 0.0 {
        Active::Negative
    } else {
        Active::Positive
    };

    let max_step = max_step_per_cycle.abs();

    let (acc, other) = match active {
        Active::Positive => (&mut state.positive_acc, &mut state.negative_acc),
        Active::Negative => (&mut state.negative_acc, &mut state.positive_acc),
    };

    let delta = (target - *acc).max(-max_step).min(max_step);
    *acc += delta;
    *other = 0.0;

    *acc
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RampState {
    pub fn new(limit_per_cycle: f64) -> Self {
        Self {
            positive_acc: 0.0,
            negative_acc: 0.0,
            limit_per_cycle,
        }
    }

    /// The value currently held by the accumulators.
    pub fn output(&self) -> f64 {
        self.positive_acc + self.negative_acc
    }
}

impl RateLimiter {
    pub fn new(limit_per_cycle: f64) -> Self {
        Self {
            state: RampState::new(limit_per_cycle),
            limited: false,
        }
    }

    /// Limit the change towards `target`, must be called every cycle.
    pub fn limit(&mut self, target: f64) -> f64 {
        let max_step = self.state.limit_per_cycle;
        let out = limit(&mut self.state, target, max_step);
        self.limited = out != target;

        out
    }

    /// Realign the accumulators with a value that was commanded without
    /// going through the limiter, so that limiting resumes from it.
    pub fn track(&mut self, value: f64) {
        if value < 0.0 {
            self.state.negative_acc = value;
            self.state.positive_acc = 0.0;
        } else {
            self.state.positive_acc = value;
            self.state.negative_acc = 0.0;
        }
        self.limited = false;
    }

    /// Returns true if the last call to `limit` could not reach its target.
    pub fn is_limited(&self) -> bool {
        self.limited
    }

    pub fn output(&self) -> f64 {
        self.state.output()
    }

    pub fn state(&self) -> &RampState {
        &self.state
    }
}
