//! # Mars robot library.
//!
//! This library holds the control modules of the robot so that the
//! executable, the benches and other crates in the workspace can use them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Automatic alignment - steers onto vision targets in place of the operator
pub mod align_ctrl;

/// Climb control - knee, leg drive and lift piston
pub mod climb_ctrl;

/// Closed loop controllers shared by the modules
pub mod controllers;

/// Data store - holds every module and runs the control cycle
pub mod data_store;

/// Drive control - shapes operator commands and drives the octocanum drivetrain
pub mod drive_ctrl;

/// Equipment definitions common to several modules
pub mod eqpt;

/// Intake control - cargo roller and hatch piston
pub mod intake_ctrl;

/// Operator input mapping
pub mod operator;

/// Parameters of the executable
pub mod params;

/// Setpoint control - closed loop position control of the lift and the wrist
pub mod setpoint_ctrl;
