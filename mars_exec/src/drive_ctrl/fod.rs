//! Field oriented drive transform
//!
//! Rotates the commanded (forward, strafe) vector so that "forward" is always
//! the field's forward regardless of which way the chassis is facing.
//!
//! Conventions: heading is in degrees and increases clockwise (gyro
//! convention), strafe is positive to the right. Only the heading relative to
//! the last zeroing is used so no wrapping is needed, the heading may grow
//! past ±360 degrees.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The field orientation reference.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FieldOrientation {
    /// Heading reading which is considered to be the field's forward.
    ///
    /// Units: degrees
    reference_deg: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate the command `(y, x)` = (forward, strafe) by the negative of the
/// heading, returning the rotated `(y', x')`.
///
/// Since heading is clockwise positive this is a counter-clockwise rotation
/// of the (strafe, forward) plane by `heading_deg`.
pub fn rotate(y: f64, x: f64, heading_deg: f64) -> (f64, f64) {
    let v = Rotation2::new(heading_deg.to_radians()) * Vector2::new(x, y);

    (v[1], v[0])
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FieldOrientation {
    /// Make the current heading the new field forward.
    pub fn zero(&mut self, current_heading_deg: f64) {
        self.reference_deg = current_heading_deg;
        info!("Field orientation zeroed at {:.02} deg", current_heading_deg);
    }

    /// Heading of the chassis relative to the field forward.
    pub fn relative_heading(&self, heading_deg: f64) -> f64 {
        heading_deg - self.reference_deg
    }

    /// Rotate the command into the field frame using the given heading
    /// reading.
    pub fn rotate(&self, y: f64, x: f64, heading_deg: f64) -> (f64, f64) {
        rotate(y, x, self.relative_heading(heading_deg))
    }

    pub fn reference_deg(&self) -> f64 {
        self.reference_deg
    }
}
