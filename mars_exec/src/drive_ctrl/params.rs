//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{DriveCtrlError, DriveMode, InputShaper};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One value for each of the three drive axes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisParams<T> {
    pub forward: T,
    pub strafe: T,
    pub rotation: T,
}

/// Parameters for Drive control.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- SHAPING ----
    /// Deadband and response curve of each axis.
    pub shaping: AxisParams<InputShaper>,

    /// Multipliers applied to each axis while slow mode is held, after
    /// shaping.
    ///
    /// Units: none, (0, 1]
    pub slow_scale: AxisParams<f64>,

    // ---- RAMPING ----
    /// Largest change of each axis' demand in a single cycle.
    ///
    /// Units: normalised per cycle
    pub ramp_limit_per_cycle: AxisParams<f64>,

    // ---- MODES ----
    /// Mode the drivetrain starts in.
    #[serde(default)]
    pub initial_mode: DriveMode,

    /// If true the field orientation is re-zeroed every time the drive mode
    /// is toggled.
    #[serde(default)]
    pub zero_heading_on_mode_toggle: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> AxisParams<T> {
    pub fn new(forward: T, strafe: T, rotation: T) -> Self {
        Self {
            forward,
            strafe,
            rotation,
        }
    }

    /// Combine two sets of axis values with a function.
    pub fn zip_with<U, V, F>(&self, other: &AxisParams<U>, f: F) -> AxisParams<V>
    where
        F: Fn(&T, &U) -> V,
    {
        AxisParams {
            forward: f(&self.forward, &other.forward),
            strafe: f(&self.strafe, &other.strafe),
            rotation: f(&self.rotation, &other.rotation),
        }
    }

    pub fn map<U, F>(&self, f: F) -> AxisParams<U>
    where
        F: Fn(&T) -> U,
    {
        AxisParams {
            forward: f(&self.forward),
            strafe: f(&self.strafe),
            rotation: f(&self.rotation),
        }
    }

    /// Iterate over the axes with their names, in forward, strafe, rotation
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        vec![
            ("forward", &self.forward),
            ("strafe", &self.strafe),
            ("rotation", &self.rotation),
        ]
        .into_iter()
    }
}

impl Params {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), DriveCtrlError> {
        for (axis, shaper) in self.shaping.iter() {
            if !shaper.is_valid() {
                return Err(DriveCtrlError::InvalidParams(format!(
                    "shaping for the {} axis is invalid: {:?}",
                    axis, shaper
                )));
            }
        }

        for (axis, scale) in self.slow_scale.iter() {
            if !(*scale > 0.0 && *scale <= 1.0) {
                return Err(DriveCtrlError::InvalidParams(format!(
                    "slow scale for the {} axis must be in (0, 1], found {}",
                    axis, scale
                )));
            }
        }

        for (axis, limit) in self.ramp_limit_per_cycle.iter() {
            if !(*limit > 0.0) {
                return Err(DriveCtrlError::InvalidParams(format!(
                    "ramp limit for the {} axis must be positive, found {}",
                    axis, limit
                )));
            }
        }

        Ok(())
    }
}
