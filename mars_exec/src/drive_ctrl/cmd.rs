//! Commands passed into DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::DriveMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A drive command for a single cycle.
///
/// Commands only hold for the cycle they are written in. The default command
/// is the neutral (stop) command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Forward speed, positive is forwards.
    ///
    /// Units: normalised, [-1, 1]
    pub forward: f64,

    /// Sideways speed, positive is to the right. Only used in mecanum mode.
    ///
    /// Units: normalised, [-1, 1]
    pub strafe: f64,

    /// Rotation speed, positive is clockwise.
    ///
    /// Units: normalised, [-1, 1]
    pub rotation: f64,

    /// Interpret `forward` and `strafe` relative to the field rather than the
    /// chassis. Only used in mecanum mode.
    pub field_oriented: bool,

    /// Shape and rate limit the command. Human inputs should set this,
    /// automatic controllers which already output a physical demand should
    /// not.
    pub adjusted: bool,

    /// Geometry the command can only be executed in. If the drivetrain is in
    /// the other mode it is switched before the command is routed.
    #[serde(default)]
    pub required_mode: Option<DriveMode>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCommand {
    /// A human tank command (forward and rotation only).
    pub fn tank(forward: f64, rotation: f64) -> Self {
        Self {
            forward,
            rotation,
            adjusted: true,
            ..Default::default()
        }
    }

    /// A human mecanum command.
    pub fn mecanum(forward: f64, strafe: f64, rotation: f64) -> Self {
        Self {
            forward,
            strafe,
            rotation,
            adjusted: true,
            ..Default::default()
        }
    }

    /// Set whether this command is field oriented.
    pub fn field_oriented(mut self, field_oriented: bool) -> Self {
        self.field_oriented = field_oriented;
        self
    }

    /// Mark the command as a raw demand which bypasses shaping and rate
    /// limiting.
    pub fn raw(mut self) -> Self {
        self.adjusted = false;
        self
    }

    /// Require the drivetrain to be in `mode` when the command is executed.
    pub fn in_mode(mut self, mode: DriveMode) -> Self {
        self.required_mode = Some(mode);
        self
    }

    /// Returns true if every axis of the command is zero.
    pub fn is_stop(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.rotation == 0.0
    }
}
