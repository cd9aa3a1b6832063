//! Operator input mapping
//!
//! Turns one cycle of gamepad state into the demands written to each control
//! module. The primary gamepad drives the robot and the climber, the
//! secondary gamepad runs the lift, wrist and intake.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use serde::{Deserialize, Serialize};

// Internal
use crate::drive_ctrl::{self, DriveCommand, DriveMode};
use util::{maths::clamp_norm, params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// POV angles of the D-pad directions.
pub const POV_UP: u16 = 0;
pub const POV_RIGHT: u16 = 90;
pub const POV_DOWN: u16 = 180;
pub const POV_LEFT: u16 = 270;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A debounced gamepad button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Button {
    /// The button is down this cycle.
    pub held: bool,

    /// The button went down this cycle. True for exactly one cycle per
    /// press.
    pub pressed: bool,
}

/// State of one gamepad for a single cycle.
///
/// Stick axes follow the gamepad convention, Y is positive when the stick is
/// pulled towards the operator. Triggers are in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadState {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,

    pub a: Button,
    pub b: Button,
    pub x: Button,
    pub y: Button,
    pub left_bumper: Button,
    pub right_bumper: Button,
    pub back: Button,
    pub start: Button,

    /// D-pad angle, `None` when released.
    ///
    /// Units: degrees, clockwise from up
    pub pov: Option<u16>,
}

/// A vision target reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionReading {
    /// Units: degrees, positive to the right
    pub yaw_deg: f64,
    pub detected: bool,
}

/// Every external input for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    pub primary: GamepadState,
    pub secondary: GamepadState,

    /// Gyro heading.
    ///
    /// Units: degrees, clockwise positive
    pub heading_deg: f64,

    /// Units: lift encoder counts
    pub lift_position: f64,

    /// Units: wrist encoder counts
    pub wrist_position: f64,

    pub tape: VisionReading,
    pub cargo: VisionReading,
}

/// Parameters of the operator mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Params {
    /// Leg drive demand while the climb drive button is held.
    pub climb_drive_speed: f64,

    /// Knee demand magnitude while the D-pad is held up or down.
    pub climb_knee_speed: f64,

    /// Whether mecanum driving starts field oriented.
    #[serde(default)]
    pub field_oriented_at_start: bool,
}

/// Operator mapping state.
#[derive(Debug, Default)]
pub struct Operator {
    params: Params,

    /// Field oriented mecanum driving, toggled by the operator.
    field_oriented: bool,
}

/// Demands produced by the operator for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OperatorDemands {
    pub drive_cmd: DriveCommand,
    pub drive_input: drive_ctrl::InputData,

    pub align_tape_enabled: bool,
    pub align_cargo_enabled: bool,

    pub lift_preset: Option<usize>,
    pub lift_raise: f64,
    pub lift_lower: f64,
    pub wrist_adjust: f64,

    pub intake_roller: f64,
    pub intake_piston: bool,

    pub climb_knee: f64,
    pub climb_drive: f64,
    pub climb_piston: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GamepadState {
    /// Clear every `pressed` edge, leaving the held state.
    pub fn clear_edges(&mut self) {
        for b in [
            &mut self.a,
            &mut self.b,
            &mut self.x,
            &mut self.y,
            &mut self.left_bumper,
            &mut self.right_bumper,
            &mut self.back,
            &mut self.start,
        ]
        .iter_mut()
        {
            b.pressed = false;
        }
    }
}

impl InputFrame {
    /// The frame as seen on the cycles after the one it arrived on: axes and
    /// held buttons stay, edges are gone.
    pub fn held(&self) -> Self {
        let mut f = *self;
        f.primary.clear_edges();
        f.secondary.clear_edges();
        f
    }
}

impl Operator {
    /// Load the operator parameters from the given parameter file.
    pub fn init(param_file: &str) -> Result<Self, params::LoadError> {
        Ok(Self::new(params::load(param_file)?))
    }

    pub fn new(params: Params) -> Self {
        Self {
            field_oriented: params.field_oriented_at_start,
            params,
        }
    }

    pub fn field_oriented(&self) -> bool {
        self.field_oriented
    }

    /// Map a frame to module demands.
    ///
    /// `mode` is the drive mode at the start of the cycle. If this frame
    /// toggles the mode the drive command is built for the new one, since
    /// DriveCtrl applies the toggle before using the command.
    pub fn map(&mut self, frame: &InputFrame, mode: DriveMode) -> OperatorDemands {
        let pri = &frame.primary;
        let sec = &frame.secondary;

        if pri.back.pressed {
            self.field_oriented = !self.field_oriented;
            info!(
                "Field oriented driving {}",
                match self.field_oriented {
                    true => "on",
                    false => "off",
                }
            );
        }

        let toggle_mode = pri.right_bumper.pressed;
        let mode = match toggle_mode {
            true => mode.toggle(),
            false => mode,
        };

        let drive_cmd = match mode {
            DriveMode::Mecanum => DriveCommand::mecanum(
                clamp_norm(pri.right_trigger - pri.left_trigger - pri.right_y).0,
                pri.right_x,
                pri.left_x,
            )
            .field_oriented(self.field_oriented),
            DriveMode::Tank => DriveCommand::tank(-pri.right_y, pri.left_x),
        };

        let climb_knee = match pri.pov {
            Some(POV_UP) => self.params.climb_knee_speed,
            Some(POV_DOWN) => -self.params.climb_knee_speed,
            _ => 0.0,
        };

        let lift_preset = match sec.pov {
            Some(POV_DOWN) => Some(0),
            Some(POV_LEFT) => Some(1),
            Some(POV_UP) => Some(2),
            _ => None,
        };

        OperatorDemands {
            drive_cmd,
            drive_input: drive_ctrl::InputData {
                toggle_mode,
                zero_heading: pri.start.pressed,
                slow: pri.left_bumper.held,
                heading_deg: frame.heading_deg,
            },

            align_tape_enabled: pri.x.held,
            align_cargo_enabled: pri.b.held,

            lift_preset,
            lift_raise: sec.right_trigger,
            lift_lower: sec.left_trigger,
            wrist_adjust: -sec.right_y,

            intake_roller: -sec.left_y,
            intake_piston: sec.x.held,

            climb_knee,
            climb_drive: match pri.a.held {
                true => self.params.climb_drive_speed,
                false => 0.0,
            },
            climb_piston: pri.y.held,
        }
    }
}
