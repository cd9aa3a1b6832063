//! Drivetrain geometry mode

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::eqpt::SolenoidPosition;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The two drive geometries of the octocanum drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Traction wheels down, left and right groups driven arcade style.
    Tank,

    /// Mecanum wheels down, omnidirectional driving.
    Mecanum,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Tank
    }
}

impl DriveMode {
    /// The only transition between modes.
    pub fn toggle(self) -> Self {
        match self {
            DriveMode::Tank => DriveMode::Mecanum,
            DriveMode::Mecanum => DriveMode::Tank,
        }
    }

    /// Position the shifter must be held in for this mode.
    pub fn shifter_position(self) -> SolenoidPosition {
        match self {
            DriveMode::Tank => SolenoidPosition::Forward,
            DriveMode::Mecanum => SolenoidPosition::Reverse,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(DriveMode::Tank.toggle(), DriveMode::Mecanum);
        assert_eq!(DriveMode::Mecanum.toggle(), DriveMode::Tank);
        assert_eq!(DriveMode::Tank.toggle().toggle(), DriveMode::Tank);
    }

    #[test]
    fn test_shifter_positions_differ() {
        assert_ne!(
            DriveMode::Tank.shifter_position(),
            DriveMode::Mecanum.shifter_position()
        );
    }
}
