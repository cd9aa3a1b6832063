//! Drive control module
//!
//! Drives the octocanum drivetrain, which is either in a tank (traction
//! wheels) or a mecanum geometry depending on the position of a pneumatic
//! shifter. Both geometries are backed by motor controllers with safety
//! timers, so the geometry which is not in use is fed a no-op demand every
//! cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_arcade;
mod calc_cartesian;
mod cmd;
pub mod fod;
mod mode;
mod params;
pub mod ramp;
pub mod shaping;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use fod::FieldOrientation;
pub use mode::*;
pub use params::*;
pub use ramp::{RampState, RateLimiter};
pub use shaping::{InputShaper, ResponseCurve};
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of motor groups driven in tank mode (left, right).
pub const NUM_TANK_WHEELS: usize = 2;

/// The number of wheels driven in mecanum mode.
pub const NUM_MECANUM_WHEELS: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load the drive control parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid drive control parameters: {0}")]
    InvalidParams(String),

    #[error("Could not open the drive control archive: {0}")]
    ArchiveError(util::archive::ArchiveError),
}
