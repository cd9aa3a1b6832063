//! Setpoint control module
//!
//! Closed loop position control of a single mechanism. The lift and the wrist
//! are both instances of `SetpointCtrl`, loaded from their own parameter
//! files.

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

/// Possible errors that can occur during SetpointCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SetpointCtrlError {
    #[error("Could not load the setpoint control parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters for {0}: {1}")]
    InvalidParams(String, String),

    #[error("Could not open the setpoint control archive: {0}")]
    ArchiveError(util::archive::ArchiveError),
}
