//! Parameters structure for SetpointCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::SetpointCtrlError;
use crate::controllers::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for a single positioned mechanism.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Name of the mechanism, used in logs and as the archive directory.
    pub name: String,

    // ---- RANGE ----
    /// Lowest allowed setpoint.
    ///
    /// Units: sensor units
    pub min: f64,

    /// Highest allowed setpoint.
    ///
    /// Units: sensor units
    pub max: f64,

    /// Setpoint held at start up, clamped into the range.
    #[serde(default)]
    pub initial: f64,

    // ---- CONTROL ----
    /// Position loop gains, output range and on-target tolerance.
    pub pid: PidParams,

    // ---- MANUAL ADJUSTMENT ----
    /// Setpoint change per cycle at full axis deflection.
    ///
    /// Units: sensor units per cycle
    pub adjust_rate: f64,

    /// Axis magnitudes at or below this do not adjust the setpoint.
    #[serde(default)]
    pub adjust_deadband: f64,

    /// Preset setpoints selectable by index.
    #[serde(default)]
    pub presets: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), SetpointCtrlError> {
        let invalid = |msg: String| -> Result<(), SetpointCtrlError> {
            Err(SetpointCtrlError::InvalidParams(self.name.clone(), msg))
        };

        if !(self.min <= self.max) {
            return invalid(format!(
                "min ({}) must not be greater than max ({})",
                self.min, self.max
            ));
        }

        if !self.pid.is_valid() {
            return invalid(format!("PID parameters are invalid: {:?}", self.pid));
        }

        if self.adjust_rate < 0.0 {
            return invalid(format!(
                "adjust rate must not be negative, found {}",
                self.adjust_rate
            ));
        }

        if !(0.0..1.0).contains(&self.adjust_deadband) {
            return invalid(format!(
                "adjust deadband must be in [0, 1), found {}",
                self.adjust_deadband
            ));
        }

        Ok(())
    }
}
