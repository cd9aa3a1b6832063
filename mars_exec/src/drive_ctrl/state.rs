//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{
    AxisParams, DriveCommand, DriveCtrlError, DriveMode, FieldOrientation, Params, RateLimiter,
};
use crate::eqpt::SolenoidPosition;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp_norm,
    module::{Demanded, State},
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    /// Current drive geometry
    mode: DriveMode,

    /// Command written for the current cycle, reset to neutral once consumed
    pending_cmd: DriveCommand,

    fod: FieldOrientation,

    ramps: AxisParams<RateLimiter>,

    pub(crate) report: StatusReport,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,

    num_cycles: u64,
}

/// Input data to Drive Control.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct InputData {
    /// Toggle the drive mode. This is an edge, it must only be true for the
    /// cycle in which the button was pressed.
    pub toggle_mode: bool,

    /// Make the current heading the field's forward. Also an edge.
    pub zero_heading: bool,

    /// Slow mode, held.
    pub slow: bool,

    /// Gyro heading reading.
    ///
    /// Units: degrees, clockwise positive
    pub heading_deg: f64,
}

/// Output demands from DriveCtrl.
///
/// Both geometries receive a demand every cycle, the inactive one is fed
/// without being commanded.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct OutputData {
    pub tank: TankDem,
    pub mecanum: MecanumDem,
    pub shifter: SolenoidPosition,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub mode: DriveMode,

    /// The mode changed this cycle.
    pub mode_toggled: bool,

    /// The field orientation was zeroed this cycle.
    pub heading_zeroed: bool,

    /// An axis of the command was outside [-1, 1] and has been clamped.
    pub input_clamped: AxisParams<bool>,

    /// An axis did not reach its target because of the ramp limit.
    pub rate_limited: AxisParams<bool>,
}

/// Demand to the tank geometry.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub enum TankDem {
    /// Keep the motor safety fed but command nothing.
    Feed,

    /// Arcade drive.
    Arcade { forward: f64, rotation: f64 },
}

/// Demand to the mecanum geometry.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub enum MecanumDem {
    /// Keep the motor safety fed but command nothing.
    Feed,

    /// Chassis relative cartesian drive.
    Cartesian {
        forward: f64,
        strafe: f64,
        rotation: f64,
    },
}

/// Flat record of the drive output used for archiving.
#[derive(Serialize)]
struct ArchRecord {
    cycle: u64,
    mode: DriveMode,
    forward: f64,
    strafe: f64,
    rotation: f64,
    tank_fed_only: bool,
    mecanum_fed_only: bool,
    shifter: SolenoidPosition,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(DriveCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        self.arch_output = Archiver::from_path(session, "drive_ctrl/output.csv")
            .map_err(DriveCtrlError::ArchiveError)?;

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Edge triggered inputs
        if input_data.toggle_mode {
            self.toggle_mode(input_data.heading_deg);
        }
        if input_data.zero_heading {
            self.zero_heading(input_data.heading_deg);
        }

        let cmd = self.take_demands();

        if let Some(mode) = cmd.required_mode {
            if mode != self.mode {
                info!("Switching to {:?} for a command which requires it", mode);
                self.toggle_mode(input_data.heading_deg);
            }
        }

        let mut dem = self.condition(&cmd, input_data.slow);

        if self.mode == DriveMode::Mecanum && cmd.field_oriented {
            let (forward, strafe) = self.fod.rotate(dem.forward, dem.strafe, input_data.heading_deg);
            dem.forward = forward;
            dem.strafe = strafe;
        }

        // Route to the active geometry, feed the other
        let output = match self.mode {
            DriveMode::Tank => {
                if dem.strafe != 0.0 {
                    warn!("Strafe demand of {:.03} dropped in tank mode", dem.strafe);
                }
                OutputData {
                    tank: TankDem::Arcade {
                        forward: dem.forward,
                        rotation: dem.rotation,
                    },
                    mecanum: MecanumDem::Feed,
                    shifter: self.mode.shifter_position(),
                }
            }
            DriveMode::Mecanum => OutputData {
                tank: TankDem::Feed,
                mecanum: MecanumDem::Cartesian {
                    forward: dem.forward,
                    strafe: dem.strafe,
                    rotation: dem.rotation,
                },
                shifter: self.mode.shifter_position(),
            },
        };

        trace!(
            "DriveCtrl output:\n    tank: {:?}\n    mecanum: {:?}\n    shifter: {:?}",
            output.tank,
            output.mecanum,
            output.shifter
        );

        self.report.mode = self.mode;
        self.output = Some(output);
        self.num_cycles += 1;

        Ok((output, self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let output = match self.output {
            Some(o) => o,
            None => return Ok(()),
        };

        let (forward, strafe, rotation) = match (output.tank, output.mecanum) {
            (TankDem::Arcade { forward, rotation }, _) => (forward, 0.0, rotation),
            (
                _,
                MecanumDem::Cartesian {
                    forward,
                    strafe,
                    rotation,
                },
            ) => (forward, strafe, rotation),
            _ => (0.0, 0.0, 0.0),
        };

        self.arch_output.serialise(ArchRecord {
            cycle: self.num_cycles,
            mode: self.mode,
            forward,
            strafe,
            rotation,
            tank_fed_only: output.tank == TankDem::Feed,
            mecanum_fed_only: output.mecanum == MecanumDem::Feed,
            shifter: output.shifter,
        })
    }
}

impl Demanded for DriveCtrl {
    type Demands = DriveCommand;

    fn demands(&self) -> &DriveCommand {
        &self.pending_cmd
    }

    fn demands_mut(&mut self) -> &mut DriveCommand {
        &mut self.pending_cmd
    }
}

impl DriveCtrl {
    /// Create a new instance from already loaded parameters.
    pub fn new(params: Params) -> Result<Self, DriveCtrlError> {
        params.validate()?;

        Ok(Self {
            mode: params.initial_mode,
            ramps: params.ramp_limit_per_cycle.map(|l| RateLimiter::new(*l)),
            params,
            ..Default::default()
        })
    }

    /// Write the drive command for this cycle.
    ///
    /// Later writes in the same cycle replace earlier ones, which is how the
    /// automatic controllers take over from the operator.
    pub fn drive(&mut self, cmd: DriveCommand) {
        self.pending_cmd = cmd;
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn field_orientation(&self) -> &FieldOrientation {
        &self.fod
    }

    /// Switch to the other drive geometry.
    pub fn toggle_mode(&mut self, heading_deg: f64) {
        self.mode = self.mode.toggle();
        self.report.mode_toggled = true;

        info!("Drive mode toggled to {:?}", self.mode);

        if self.params.zero_heading_on_mode_toggle {
            self.zero_heading(heading_deg);
        }
    }

    /// Make the current heading the field's forward.
    pub fn zero_heading(&mut self, heading_deg: f64) {
        self.fod.zero(heading_deg);
        self.report.heading_zeroed = true;
    }

    /// Clamp, shape, scale and rate limit the command.
    ///
    /// Unadjusted commands bypass shaping and limiting, the limiters track
    /// them so that a following human command ramps from where they left
    /// off.
    fn condition(&mut self, cmd: &DriveCommand, slow: bool) -> AxisParams<f64> {
        let (forward, fwd_clamped) = clamp_norm(cmd.forward);
        let (strafe, str_clamped) = clamp_norm(cmd.strafe);
        let (rotation, rot_clamped) = clamp_norm(cmd.rotation);

        self.report.input_clamped = AxisParams::new(fwd_clamped, str_clamped, rot_clamped);
        if fwd_clamped || str_clamped || rot_clamped {
            debug!("Drive command {:?} clamped", cmd);
        }

        let raw = AxisParams::new(forward, strafe, rotation);

        if !cmd.adjusted {
            self.ramps.forward.track(raw.forward);
            self.ramps.strafe.track(raw.strafe);
            self.ramps.rotation.track(raw.rotation);

            return raw;
        }

        let shaped = raw.zip_with(&self.params.shaping, |v, s| s.shape(*v, true));

        let scaled = match slow {
            true => shaped.zip_with(&self.params.slow_scale, |v, k| v * k),
            false => shaped,
        };

        let limited = AxisParams::new(
            self.ramps.forward.limit(scaled.forward),
            self.ramps.strafe.limit(scaled.strafe),
            self.ramps.rotation.limit(scaled.rotation),
        );

        self.report.rate_limited = AxisParams::new(
            self.ramps.forward.is_limited(),
            self.ramps.strafe.is_limited(),
            self.ramps.rotation.is_limited(),
        );

        limited
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_ctrl::{InputShaper, ResponseCurve};

    const EPS: f64 = 1e-9;

    fn test_params() -> Params {
        Params {
            shaping: AxisParams::new(
                InputShaper::default(),
                InputShaper::default(),
                InputShaper::default(),
            ),
            slow_scale: AxisParams::new(0.8, 0.5, 0.5),
            ramp_limit_per_cycle: AxisParams::new(0.1, 0.1, 0.1),
            initial_mode: DriveMode::Tank,
            zero_heading_on_mode_toggle: false,
        }
    }

    fn mecanum_ctrl() -> DriveCtrl {
        let mut dc = DriveCtrl::new(test_params()).unwrap();
        dc.toggle_mode(0.0);
        dc
    }

    fn proc(dc: &mut DriveCtrl, input: InputData) -> OutputData {
        dc.proc(&input).unwrap().0
    }

    fn mecanum_axes(o: &OutputData) -> (f64, f64, f64) {
        match o.mecanum {
            MecanumDem::Cartesian {
                forward,
                strafe,
                rotation,
            } => (forward, strafe, rotation),
            MecanumDem::Feed => panic!("Mecanum geometry was not commanded"),
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut p = test_params();
        p.ramp_limit_per_cycle.strafe = 0.0;
        assert!(matches!(
            DriveCtrl::new(p),
            Err(DriveCtrlError::InvalidParams(_))
        ));

        let mut p = test_params();
        p.slow_scale.forward = 1.5;
        assert!(DriveCtrl::new(p).is_err());
    }

    #[test]
    fn test_tank_feeds_mecanum() {
        let mut dc = DriveCtrl::new(test_params()).unwrap();

        for _ in 0..5 {
            dc.drive(DriveCommand::tank(1.0, 0.0));
            let o = proc(&mut dc, InputData::default());

            assert_eq!(o.mecanum, MecanumDem::Feed);
            assert_eq!(o.shifter, SolenoidPosition::Forward);
            assert!(matches!(o.tank, TankDem::Arcade { .. }));
        }

        // A silent cycle still feeds the inactive geometry
        let o = proc(&mut dc, InputData::default());
        assert_eq!(o.mecanum, MecanumDem::Feed);
    }

    #[test]
    fn test_toggle_reroutes_next_cycle() {
        let mut dc = DriveCtrl::new(test_params()).unwrap();

        dc.drive(DriveCommand::tank(0.5, 0.0));
        let o = proc(&mut dc, InputData::default());
        assert!(matches!(o.tank, TankDem::Arcade { .. }));

        dc.drive(DriveCommand::mecanum(0.5, 0.0, 0.0));
        let (o, r) = dc
            .proc(&InputData {
                toggle_mode: true,
                ..Default::default()
            })
            .unwrap();
        assert!(r.mode_toggled);
        assert_eq!(r.mode, DriveMode::Mecanum);
        assert_eq!(o.tank, TankDem::Feed);
        assert!(matches!(o.mecanum, MecanumDem::Cartesian { .. }));
        assert_eq!(o.shifter, SolenoidPosition::Reverse);

        // The shifter is written every cycle, not only on the toggle
        let o = proc(&mut dc, InputData::default());
        assert_eq!(o.shifter, SolenoidPosition::Reverse);
        assert_eq!(o.tank, TankDem::Feed);
    }

    #[test]
    fn test_silent_cycle_stops() {
        let mut dc = mecanum_ctrl();

        dc.drive(DriveCommand::mecanum(0.4, -0.2, 0.1).raw());
        let o = proc(&mut dc, InputData::default());
        assert_eq!(mecanum_axes(&o), (0.4, -0.2, 0.1));

        // Nothing written this cycle
        let o = proc(&mut dc, InputData::default());
        assert_eq!(mecanum_axes(&o), (0.0, 0.0, 0.0));
        assert!(dc.demands().is_stop());
    }

    #[test]
    fn test_ramped_forward_scenario() {
        let mut dc = mecanum_ctrl();

        for i in 1..=10 {
            dc.drive(DriveCommand::mecanum(1.0, 0.0, 0.0));
            let (forward, strafe, rotation) = mecanum_axes(&proc(&mut dc, InputData::default()));

            assert!((forward - 0.1 * i as f64).abs() < EPS, "cycle {}: {}", i, forward);
            assert_eq!(strafe, 0.0);
            assert_eq!(rotation, 0.0);
        }

        dc.drive(DriveCommand::mecanum(1.0, 0.0, 0.0));
        let (forward, _, _) = mecanum_axes(&proc(&mut dc, InputData::default()));
        assert!((forward - 1.0).abs() < EPS);
    }

    #[test]
    fn test_released_stick_decays() {
        let mut dc = mecanum_ctrl();

        for _ in 0..15 {
            dc.drive(DriveCommand::mecanum(1.0, 0.0, 0.0));
            proc(&mut dc, InputData::default());
        }

        // Operator still driving, stick centred
        dc.drive(DriveCommand::mecanum(0.0, 0.0, 0.0));
        let (o, r) = dc.proc(&InputData::default()).unwrap();
        let (forward, _, _) = mecanum_axes(&o);
        assert!((forward - 0.9).abs() < EPS);
        assert!(r.rate_limited.forward);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let mut dc = mecanum_ctrl();

        dc.drive(DriveCommand::mecanum(3.0, -2.0, 0.5).raw());
        let (o, r) = dc.proc(&InputData::default()).unwrap();

        assert_eq!(mecanum_axes(&o), (1.0, -1.0, 0.5));
        assert!(r.input_clamped.forward);
        assert!(r.input_clamped.strafe);
        assert!(!r.input_clamped.rotation);
    }

    #[test]
    fn test_slow_mode_scales_after_shaping() {
        let mut p = test_params();
        p.ramp_limit_per_cycle = AxisParams::new(2.0, 2.0, 2.0);
        p.shaping.forward = InputShaper::new(0.0, ResponseCurve::SignedSquare { gain: 0.85 });
        let mut dc = DriveCtrl::new(p).unwrap();
        dc.toggle_mode(0.0);

        dc.drive(DriveCommand::mecanum(1.0, 1.0, -1.0));
        let o = proc(
            &mut dc,
            InputData {
                slow: true,
                ..Default::default()
            },
        );
        let (forward, strafe, rotation) = mecanum_axes(&o);

        assert!((forward - 0.85 * 0.8).abs() < EPS);
        assert!((strafe - 0.5).abs() < EPS);
        assert!((rotation + 0.5).abs() < EPS);
    }

    #[test]
    fn test_field_oriented_mecanum() {
        let mut dc = mecanum_ctrl();

        dc.drive(DriveCommand::mecanum(1.0, 0.0, 0.0).raw().field_oriented(true));
        let o = proc(
            &mut dc,
            InputData {
                heading_deg: 90.0,
                ..Default::default()
            },
        );
        let (forward, strafe, _) = mecanum_axes(&o);
        assert!(forward.abs() < EPS);
        assert!((strafe + 1.0).abs() < EPS);

        // Zeroing makes the current facing forward again
        dc.drive(DriveCommand::mecanum(1.0, 0.0, 0.0).raw().field_oriented(true));
        let (o, r) = dc
            .proc(&InputData {
                heading_deg: 90.0,
                zero_heading: true,
                ..Default::default()
            })
            .unwrap();
        assert!(r.heading_zeroed);
        let (forward, strafe, _) = mecanum_axes(&o);
        assert!((forward - 1.0).abs() < EPS);
        assert!(strafe.abs() < EPS);
    }

    #[test]
    fn test_field_orientation_ignored_in_tank() {
        let mut dc = DriveCtrl::new(test_params()).unwrap();

        dc.drive(DriveCommand::tank(0.5, 0.0).raw().field_oriented(true));
        let o = proc(
            &mut dc,
            InputData {
                heading_deg: 90.0,
                ..Default::default()
            },
        );
        assert_eq!(
            o.tank,
            TankDem::Arcade {
                forward: 0.5,
                rotation: 0.0
            }
        );
    }

    #[test]
    fn test_zero_on_toggle() {
        let mut p = test_params();
        p.zero_heading_on_mode_toggle = true;
        let mut dc = DriveCtrl::new(p).unwrap();

        proc(
            &mut dc,
            InputData {
                toggle_mode: true,
                heading_deg: 37.0,
                ..Default::default()
            },
        );
        assert_eq!(dc.field_orientation().reference_deg(), 37.0);
    }

    #[test]
    fn test_required_mode_switches_before_routing() {
        let mut dc = DriveCtrl::new(test_params()).unwrap();
        assert_eq!(dc.mode(), DriveMode::Tank);

        dc.drive(
            DriveCommand::mecanum(0.0, 0.24, 0.0)
                .raw()
                .in_mode(DriveMode::Mecanum),
        );
        let (o, r) = dc.proc(&InputData::default()).unwrap();

        assert!(r.mode_toggled);
        assert_eq!(r.mode, DriveMode::Mecanum);
        assert_eq!(o.tank, TankDem::Feed);
        assert_eq!(o.shifter, SolenoidPosition::Reverse);
        assert_eq!(mecanum_axes(&o), (0.0, 0.24, 0.0));

        // Already in the required mode, nothing changes
        dc.drive(DriveCommand::default().in_mode(DriveMode::Mecanum));
        let (_, r) = dc.proc(&InputData::default()).unwrap();
        assert!(!r.mode_toggled);
        assert_eq!(dc.mode(), DriveMode::Mecanum);
    }

    #[test]
    fn test_raw_command_then_human_ramps_from_it() {
        let mut dc = mecanum_ctrl();

        dc.drive(DriveCommand::mecanum(0.0, 0.0, 0.7).raw());
        proc(&mut dc, InputData::default());

        dc.drive(DriveCommand::mecanum(0.0, 0.0, 0.0));
        let (_, _, rotation) = mecanum_axes(&proc(&mut dc, InputData::default()));
        assert!((rotation - 0.6).abs() < EPS);
    }
}
