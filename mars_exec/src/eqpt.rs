//! # Equipment demand types
//!
//! Types shared by several modules when describing what an actuator should do.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Position of a double acting solenoid valve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolenoidPosition {
    Forward,
    Reverse,
}

impl Default for SolenoidPosition {
    fn default() -> Self {
        SolenoidPosition::Forward
    }
}
