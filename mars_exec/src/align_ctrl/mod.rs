//! Automatic alignment module
//!
//! Steers the robot onto a target seen by the vision system. While the
//! operator holds the alignment gate and a target is detected the controller
//! produces a drive command which replaces the operator's for that cycle.
//! Otherwise it produces nothing and the operator keeps control.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during AlignCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum AlignCtrlError {
    #[error("Could not load the alignment parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters for {0}: {1}")]
    InvalidParams(String, String),

    #[error("Could not open the alignment archive: {0}")]
    ArchiveError(util::archive::ArchiveError),
}
