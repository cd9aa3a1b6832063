//! # Closed loop controllers
//!
//! This module provides the discrete PID controller shared by the positioned
//! mechanisms and the automatic alignment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and limits of a PID controller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    #[serde(default)]
    pub k_i: f64,

    /// Dervative gain
    #[serde(default)]
    pub k_d: f64,

    /// Largest absolute error which is considered to be on target.
    #[serde(default)]
    pub tolerance: f64,

    /// Lower output limit, may differ in magnitude from the upper one.
    pub min_output: f64,

    /// Upper output limit.
    pub max_output: f64,
}

/// A discrete PID controller
///
/// The controller is stepped once per cycle so the integral is the sum of the
/// errors and the derivative is the difference between consecutive errors.
#[derive(Debug, Serialize, Clone, Default)]
pub struct PidController {
    params: PidParams,

    /// Previous error
    prev_error: f64,

    /// The integral accumulation
    integral: f64,

    /// Most recent error, `None` until the first step.
    last_error: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidParams {
    /// Returns true if the limits and tolerance are consistent.
    pub fn is_valid(&self) -> bool {
        self.min_output < self.max_output && self.tolerance >= 0.0
    }
}

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(params: PidParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Step the controller with the error for this cycle, returning the
    /// clamped output.
    pub fn get(&mut self, error: f64) -> f64 {
        let p = &self.params;

        // Accumulate the integral, holding it at the value which saturates the
        // output so it cannot wind up past either limit.
        if p.k_i != 0.0 {
            let potential = (self.integral + error) * p.k_i;

            if potential >= p.max_output {
                self.integral = p.max_output / p.k_i;
            } else if potential <= p.min_output {
                self.integral = p.min_output / p.k_i;
            } else {
                self.integral += error;
            }
        }

        let deriv = error - self.prev_error;

        let out = p.k_p * error + p.k_i * self.integral + p.k_d * deriv;

        self.prev_error = error;
        self.last_error = Some(error);

        out.max(p.min_output).min(p.max_output)
    }

    /// Returns true if the last error was within the tolerance.
    pub fn at_setpoint(&self) -> bool {
        match self.last_error {
            Some(e) => e.abs() <= self.params.tolerance,
            None => false,
        }
    }

    /// The error passed to the last step.
    pub fn last_error(&self) -> Option<f64> {
        self.last_error
    }

    /// Forget the integral and derivative history.
    pub fn reset(&mut self) {
        self.prev_error = 0.0;
        self.integral = 0.0;
        self.last_error = None;
    }

    pub fn params(&self) -> &PidParams {
        &self.params
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params(k_p: f64, k_i: f64, k_d: f64) -> PidParams {
        PidParams {
            k_p,
            k_i,
            k_d,
            tolerance: 0.5,
            min_output: -0.5,
            max_output: 1.0,
        }
    }

    #[test]
    fn test_proportional() {
        let mut pid = PidController::new(params(0.01, 0.0, 0.0));

        assert!((pid.get(50.0) - 0.5).abs() < 1e-12);
        assert!((pid.get(-20.0) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_asymmetric_clamp() {
        let mut pid = PidController::new(params(1.0, 0.0, 0.0));

        assert_eq!(pid.get(1000.0), 1.0);
        assert_eq!(pid.get(-1000.0), -0.5);
    }

    #[test]
    fn test_derivative_is_error_difference() {
        let mut pid = PidController::new(params(0.0, 0.0, 0.1));

        assert!((pid.get(2.0) - 0.2).abs() < 1e-12);
        assert!((pid.get(3.0) - 0.1).abs() < 1e-12);
        assert!((pid.get(3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_anti_windup() {
        let mut pid = PidController::new(params(0.0, 0.1, 0.0));

        // Saturate for a long time
        for _ in 0..1000 {
            assert!(pid.get(100.0) <= 1.0);
        }

        // The integral is held at saturation so the output leaves the limit
        // as soon as the error changes sign
        let out = pid.get(-1.0);
        assert!(out < 1.0);
        assert!(out >= -0.5);
    }

    #[test]
    fn test_at_setpoint_and_reset() {
        let mut pid = PidController::new(params(0.1, 0.01, 0.0));
        assert!(!pid.at_setpoint());

        pid.get(0.4);
        assert!(pid.at_setpoint());
        pid.get(-0.6);
        assert!(!pid.at_setpoint());

        pid.reset();
        assert!(!pid.at_setpoint());
        assert_eq!(pid.last_error(), None);
        assert!((pid.get(1.0) - 0.11).abs() < 1e-12);
    }
}
