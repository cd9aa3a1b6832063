//! Operator input shaping
//!
//! A high torque drivetrain is twitchy at small stick deflections, so human
//! inputs pass through a deadband and an odd response curve before being
//! used. The curve gives fine control around zero while keeping full speed
//! reachable at the end of the stick's travel.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::{apply_deadband, sign};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shaper for a single input axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputShaper {
    /// Inputs with a magnitude at or below this are treated as zero.
    #[serde(default)]
    pub deadband: f64,

    /// The response curve applied after the deadband.
    #[serde(default)]
    pub curve: ResponseCurve,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Response curves available to an `InputShaper`.
///
/// Every curve is odd, monotonic, passes through the origin and maps `±1` to
/// `±gain`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseCurve {
    /// `gain * x`
    Linear { gain: f64 },

    /// `gain * x^3`
    Cubic { gain: f64 },

    /// `gain * sign(x) * x^2`
    SignedSquare { gain: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ResponseCurve {
    fn default() -> Self {
        ResponseCurve::Cubic { gain: 1.0 }
    }
}

impl ResponseCurve {
    /// Evaluate the curve at `x`.
    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            ResponseCurve::Linear { gain } => gain * x,
            ResponseCurve::Cubic { gain } => gain * x.powi(3),
            ResponseCurve::SignedSquare { gain } => gain * sign(x) * x.powi(2),
        }
    }

    /// The gain of the curve, i.e. its value at `x = 1`.
    pub fn gain(&self) -> f64 {
        match *self {
            ResponseCurve::Linear { gain }
            | ResponseCurve::Cubic { gain }
            | ResponseCurve::SignedSquare { gain } => gain,
        }
    }
}

impl InputShaper {
    pub fn new(deadband: f64, curve: ResponseCurve) -> Self {
        Self { deadband, curve }
    }

    /// Shape a raw axis value.
    ///
    /// If `adjusted` is false the value is returned untouched. Automatic
    /// controllers use this to pass through demands which are already
    /// physically meaningful.
    pub fn shape(&self, raw: f64, adjusted: bool) -> f64 {
        if !adjusted {
            return raw;
        }

        self.curve.apply(apply_deadband(raw, self.deadband))
    }

    /// Check that the shaper's parameters make sense.
    pub fn is_valid(&self) -> bool {
        (0.0..1.0).contains(&self.deadband) && self.curve.gain() > 0.0
    }
}
