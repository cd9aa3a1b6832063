//! Parameters structure for AlignCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::AlignCtrlError;
use crate::controllers::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for an alignment controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Name of the target, used in logs and as the archive directory.
    pub name: String,

    /// Yaw reading at which the robot is aligned. Nonzero when the camera is
    /// not on the robot's centreline.
    ///
    /// Units: degrees
    #[serde(default)]
    pub target_yaw_deg: f64,

    /// Drive axis used for the correction.
    #[serde(default)]
    pub correction_axis: CorrectionAxis,

    /// How the correction is calculated from the yaw error.
    pub strategy: AlignStrategy,

    /// Yaw errors at or below this are on target.
    ///
    /// Units: degrees
    pub tolerance_deg: f64,

    /// Once on target the robot stays on target until the error exceeds
    /// this. Defaults to `tolerance_deg`, i.e. no hysteresis.
    ///
    /// Units: degrees
    #[serde(default)]
    pub release_tolerance_deg: Option<f64>,

    /// Clear the PID history whenever the gate is opened.
    #[serde(default)]
    pub reset_on_enable: bool,

    /// Forward demand added while on target to close in on it.
    ///
    /// Units: normalised
    #[serde(default)]
    pub cruise_forward: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The drive axis which carries the alignment correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionAxis {
    Rotation,
    Strafe,
}

/// Correction strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlignStrategy {
    /// PID on the yaw error.
    Pid(PidParams),

    /// Fixed speed towards the target outside a deadband, nothing inside it.
    BangBang { speed: f64, deadband_deg: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CorrectionAxis {
    fn default() -> Self {
        CorrectionAxis::Rotation
    }
}

impl Default for AlignStrategy {
    fn default() -> Self {
        AlignStrategy::BangBang {
            speed: 0.0,
            deadband_deg: 0.0,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            name: String::from("align"),
            target_yaw_deg: 0.0,
            correction_axis: CorrectionAxis::default(),
            strategy: AlignStrategy::default(),
            tolerance_deg: 0.0,
            release_tolerance_deg: None,
            reset_on_enable: false,
            cruise_forward: 0.0,
        }
    }
}

impl Params {
    /// Tolerance used to leave the on target state.
    pub fn release_tolerance_deg(&self) -> f64 {
        self.release_tolerance_deg.unwrap_or(self.tolerance_deg)
    }

    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), AlignCtrlError> {
        let invalid = |msg: String| -> Result<(), AlignCtrlError> {
            Err(AlignCtrlError::InvalidParams(self.name.clone(), msg))
        };

        if self.tolerance_deg < 0.0 {
            return invalid(format!(
                "tolerance must not be negative, found {}",
                self.tolerance_deg
            ));
        }

        if self.release_tolerance_deg() < self.tolerance_deg {
            return invalid(format!(
                "release tolerance ({}) must not be below the tolerance ({})",
                self.release_tolerance_deg(),
                self.tolerance_deg
            ));
        }

        if !(-1.0..=1.0).contains(&self.cruise_forward) {
            return invalid(format!(
                "cruise forward must be in [-1, 1], found {}",
                self.cruise_forward
            ));
        }

        match self.strategy {
            AlignStrategy::Pid(ref p) if !p.is_valid() => {
                invalid(format!("PID parameters are invalid: {:?}", p))
            }
            AlignStrategy::BangBang {
                speed,
                deadband_deg,
            } if !(0.0..=1.0).contains(&speed) || deadband_deg < 0.0 => invalid(format!(
                "bang-bang speed must be in [0, 1] and deadband positive, found {} and {}",
                speed, deadband_deg
            )),
            _ => Ok(()),
        }
    }
}
