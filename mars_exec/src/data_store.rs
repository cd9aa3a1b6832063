//! # Data Store
//!
//! Holds every control module and runs them in order once per cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use thiserror::Error;

// Internal
use crate::{
    align_ctrl::{self, AlignCtrl, AlignCtrlError},
    climb_ctrl::{self, ClimbCtrl, ClimbCtrlError},
    drive_ctrl::{self, DriveCtrl, DriveCtrlError},
    intake_ctrl::{self, IntakeCtrl, IntakeCtrlError},
    operator::{InputFrame, Operator, OperatorDemands},
    setpoint_ctrl::{self, SetpointCtrl, SetpointCtrlError},
};
use util::{
    archive::{ArchiveError, Archived},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const DRIVE_CTRL_PARAMS: &str = "drive_ctrl.toml";
pub const LIFT_PARAMS: &str = "lift.toml";
pub const WRIST_PARAMS: &str = "wrist.toml";
pub const ALIGN_TAPE_PARAMS: &str = "align_tape.toml";
pub const ALIGN_CARGO_PARAMS: &str = "align_cargo.toml";
pub const OPERATOR_PARAMS: &str = "operator.toml";
pub const INTAKE_CTRL_PARAMS: &str = "intake_ctrl.toml";
pub const CLIMB_CTRL_PARAMS: &str = "climb_ctrl.toml";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub elapsed_s: f64,

    // Operator
    pub operator: Operator,
    pub operator_dems: OperatorDemands,

    // DriveCtrl
    pub drive_ctrl: DriveCtrl,
    pub drive_ctrl_output: Option<drive_ctrl::OutputData>,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Alignment
    pub align_tape: AlignCtrl,
    pub align_tape_status_rpt: align_ctrl::StatusReport,
    pub align_cargo: AlignCtrl,
    pub align_cargo_status_rpt: align_ctrl::StatusReport,

    // Positioned mechanisms
    pub lift: SetpointCtrl,
    pub lift_output: setpoint_ctrl::OutputData,
    pub lift_status_rpt: setpoint_ctrl::StatusReport,
    pub wrist: SetpointCtrl,
    pub wrist_output: setpoint_ctrl::OutputData,
    pub wrist_status_rpt: setpoint_ctrl::StatusReport,

    // Intake and climber
    pub intake_ctrl: IntakeCtrl,
    pub intake_ctrl_output: intake_ctrl::OutputData,
    pub climb_ctrl: ClimbCtrl,
    pub climb_ctrl_output: climb_ctrl::OutputData,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

/// Everything commanded in one cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleOutput {
    pub drive: drive_ctrl::OutputData,
    pub lift: setpoint_ctrl::OutputData,
    pub wrist: setpoint_ctrl::OutputData,
    pub intake: intake_ctrl::OutputData,
    pub climb: climb_ctrl::OutputData,

    /// True if an alignment controller drove the robot this cycle.
    pub aligning: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while initialising or running the modules.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("Could not load the operator parameters: {0}")]
    OperatorParamLoadError(util::params::LoadError),

    #[error("DriveCtrl error: {0}")]
    DriveCtrl(#[from] DriveCtrlError),

    #[error("SetpointCtrl error: {0}")]
    SetpointCtrl(#[from] SetpointCtrlError),

    #[error("AlignCtrl error: {0}")]
    AlignCtrl(#[from] AlignCtrlError),

    #[error("IntakeCtrl error: {0}")]
    IntakeCtrl(#[from] IntakeCtrlError),

    #[error("ClimbCtrl error: {0}")]
    ClimbCtrl(#[from] ClimbCtrlError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Load every module's parameters and open their archives.
    pub fn init(session: &Session) -> Result<Self, DataStoreError> {
        let mut ds = DataStore::default();

        ds.operator =
            Operator::init(OPERATOR_PARAMS).map_err(DataStoreError::OperatorParamLoadError)?;
        info!("Operator mapping init complete");

        ds.drive_ctrl.init(DRIVE_CTRL_PARAMS, session)?;
        info!("DriveCtrl init complete");

        ds.lift.init(LIFT_PARAMS, session)?;
        ds.wrist.init(WRIST_PARAMS, session)?;
        info!("SetpointCtrl init complete (lift and wrist)");

        ds.align_tape.init(ALIGN_TAPE_PARAMS, session)?;
        ds.align_cargo.init(ALIGN_CARGO_PARAMS, session)?;
        info!("AlignCtrl init complete (tape and cargo)");

        ds.intake_ctrl.init(INTAKE_CTRL_PARAMS, session)?;
        info!("IntakeCtrl init complete");

        ds.climb_ctrl.init(CLIMB_CTRL_PARAMS, session)?;
        info!("ClimbCtrl init complete");

        Ok(ds)
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128).max(1) == 0;

        self.operator_dems = OperatorDemands::default();
        self.drive_ctrl_output = None;
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();
        self.align_tape_status_rpt = align_ctrl::StatusReport::default();
        self.align_cargo_status_rpt = align_ctrl::StatusReport::default();
        self.lift_status_rpt = setpoint_ctrl::StatusReport::default();
        self.wrist_status_rpt = setpoint_ctrl::StatusReport::default();

        self.elapsed_s = util::session::get_elapsed_seconds();
    }

    /// Run one control cycle on the given inputs.
    ///
    /// The operator's demands are written first, an active alignment then
    /// replaces the operator's drive command, and finally every module is
    /// processed.
    pub fn proc_cycle(&mut self, frame: &InputFrame) -> Result<CycleOutput, DataStoreError> {
        // ---- OPERATOR ----

        let dems = self.operator.map(frame, self.drive_ctrl.mode());
        self.apply_operator_dems(&dems);
        self.operator_dems = dems;

        // ---- ALIGNMENT ----

        let mut aligning = false;
        for (align, report, vision) in [
            (&mut self.align_tape, &mut self.align_tape_status_rpt, &frame.tape),
            (&mut self.align_cargo, &mut self.align_cargo_status_rpt, &frame.cargo),
        ]
        .iter_mut()
        {
            let (cmd, r) = align.proc(&align_ctrl::InputData {
                yaw_deg: vision.yaw_deg,
                target_detected: vision.detected,
            })?;
            **report = r;

            // Last writer wins
            if let Some(cmd) = cmd {
                self.drive_ctrl.drive(cmd);
                aligning = true;
            }
        }

        // ---- DRIVE ----

        let (drive, r) = self.drive_ctrl.proc(&dems.drive_input)?;
        self.drive_ctrl_output = Some(drive);
        self.drive_ctrl_status_rpt = r;

        // ---- MECHANISMS ----

        let (lift, r) = self.lift.proc(&setpoint_ctrl::InputData {
            position: frame.lift_position,
        })?;
        self.lift_output = lift;
        self.lift_status_rpt = r;

        let (wrist, r) = self.wrist.proc(&setpoint_ctrl::InputData {
            position: frame.wrist_position,
        })?;
        self.wrist_output = wrist;
        self.wrist_status_rpt = r;

        let (intake, _) = self.intake_ctrl.proc(&())?;
        self.intake_ctrl_output = intake;

        let (climb, _) = self.climb_ctrl.proc(&())?;
        self.climb_ctrl_output = climb;

        if self.is_1_hz_cycle {
            debug!(
                "Cycle {}: mode {:?}, lift {:.01}, wrist {:.01}, aligning {}",
                self.num_cycles,
                self.drive_ctrl.mode(),
                lift.setpoint,
                wrist.setpoint,
                aligning
            );
        }

        Ok(CycleOutput {
            drive,
            lift,
            wrist,
            intake,
            climb,
            aligning,
        })
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Write every module's archive.
    pub fn write_archives(&mut self) -> Result<(), DataStoreError> {
        self.drive_ctrl.write()?;
        self.lift.write()?;
        self.wrist.write()?;
        self.align_tape.write()?;
        self.align_cargo.write()?;
        self.intake_ctrl.write()?;
        self.climb_ctrl.write()?;

        Ok(())
    }

    /// Write the operator's demands into the modules.
    fn apply_operator_dems(&mut self, dems: &OperatorDemands) {
        self.drive_ctrl.drive(dems.drive_cmd);

        self.align_tape.set_enabled(dems.align_tape_enabled);
        self.align_cargo.set_enabled(dems.align_cargo_enabled);

        if let Some(i) = dems.lift_preset {
            self.lift.go_to_preset(i);
        }
        self.lift.adjust_from_axis(dems.lift_raise);
        self.lift.adjust_from_axis(-dems.lift_lower);
        self.wrist.adjust_from_axis(dems.wrist_adjust);

        self.intake_ctrl.set_roller(dems.intake_roller);
        if dems.intake_piston {
            self.intake_ctrl.extend_piston();
        }

        self.climb_ctrl.set_knee_speed(dems.climb_knee);
        self.climb_ctrl.set_drive_speed(dems.climb_drive);
        if dems.climb_piston {
            self.climb_ctrl.extend_piston();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        align_ctrl::{AlignStrategy, CorrectionAxis},
        controllers::PidParams,
        drive_ctrl::{AxisParams, DriveMode, InputShaper, MecanumDem, TankDem},
        eqpt::SolenoidPosition,
        operator::Button,
    };

    fn test_ds() -> DataStore {
        let drive = drive_ctrl::Params {
            shaping: AxisParams::new(
                InputShaper::default(),
                InputShaper::default(),
                InputShaper::default(),
            ),
            slow_scale: AxisParams::new(0.8, 0.5, 0.5),
            ramp_limit_per_cycle: AxisParams::new(0.1, 0.1, 0.1),
            initial_mode: DriveMode::Tank,
            zero_heading_on_mode_toggle: true,
        };

        let lift = setpoint_ctrl::Params {
            name: "lift".into(),
            min: 0.0,
            max: 1980.0,
            initial: 0.0,
            pid: PidParams {
                k_p: 0.00255,
                k_i: 0.0,
                k_d: 0.0,
                tolerance: 0.5,
                min_output: -0.5,
                max_output: 1.0,
            },
            adjust_rate: 70.0,
            adjust_deadband: 0.02,
            presets: vec![0.0, 1025.0, 2150.0],
        };

        let wrist = setpoint_ctrl::Params {
            name: "wrist".into(),
            min: -500.0,
            max: 500.0,
            presets: vec![],
            adjust_rate: 10.0,
            adjust_deadband: 0.01,
            ..lift.clone()
        };

        let tape = align_ctrl::Params {
            name: "align_tape".into(),
            target_yaw_deg: -4.0,
            correction_axis: CorrectionAxis::Rotation,
            strategy: AlignStrategy::Pid(PidParams {
                k_p: 0.078,
                k_i: 0.005,
                k_d: 0.04,
                tolerance: 5.0,
                min_output: -0.7,
                max_output: 0.7,
            }),
            tolerance_deg: 5.0,
            release_tolerance_deg: None,
            reset_on_enable: false,
            cruise_forward: 0.3,
        };

        let cargo = align_ctrl::Params {
            name: "align_cargo".into(),
            correction_axis: CorrectionAxis::Strafe,
            strategy: AlignStrategy::BangBang {
                speed: 0.24,
                deadband_deg: 1.0,
            },
            tolerance_deg: 1.0,
            ..Default::default()
        };

        DataStore {
            operator: Operator::new(crate::operator::Params {
                climb_drive_speed: 0.6,
                climb_knee_speed: 0.4,
                field_oriented_at_start: false,
            }),
            drive_ctrl: DriveCtrl::new(drive).unwrap(),
            lift: SetpointCtrl::new(lift).unwrap(),
            wrist: SetpointCtrl::new(wrist).unwrap(),
            align_tape: AlignCtrl::new(tape).unwrap(),
            align_cargo: AlignCtrl::new(cargo).unwrap(),
            intake_ctrl: IntakeCtrl::new(Default::default()).unwrap(),
            climb_ctrl: ClimbCtrl::new(Default::default()).unwrap(),
            ..Default::default()
        }
    }

    fn cycle(ds: &mut DataStore, frame: &InputFrame) -> CycleOutput {
        ds.cycle_start(50.0);
        let out = ds.proc_cycle(frame).unwrap();
        ds.cycle_end();
        out
    }

    fn press() -> Button {
        Button {
            held: true,
            pressed: true,
        }
    }

    fn hold() -> Button {
        Button {
            held: true,
            pressed: false,
        }
    }

    fn load_shipped<P: serde::de::DeserializeOwned>(file: &str) -> P {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../params")
            .join(file);

        util::params::load_from_path(&path)
            .unwrap_or_else(|e| panic!("Could not load {:?}: {}", path, e))
    }

    #[test]
    fn test_shipped_params_are_valid() {
        DriveCtrl::new(load_shipped(DRIVE_CTRL_PARAMS)).unwrap();
        SetpointCtrl::new(load_shipped(LIFT_PARAMS)).unwrap();
        SetpointCtrl::new(load_shipped(WRIST_PARAMS)).unwrap();
        AlignCtrl::new(load_shipped(ALIGN_TAPE_PARAMS)).unwrap();
        AlignCtrl::new(load_shipped(ALIGN_CARGO_PARAMS)).unwrap();
        IntakeCtrl::new(load_shipped(INTAKE_CTRL_PARAMS)).unwrap();
        ClimbCtrl::new(load_shipped(CLIMB_CTRL_PARAMS)).unwrap();
        Operator::new(load_shipped(OPERATOR_PARAMS));

        let exec: crate::params::MarsExecParams = load_shipped("exec.toml");
        assert!((exec.cycle_period_s - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_idle_cycle() {
        let mut ds = test_ds();

        let out = cycle(&mut ds, &InputFrame::default());

        assert_eq!(
            out.drive.tank,
            TankDem::Arcade {
                forward: 0.0,
                rotation: 0.0
            }
        );
        assert_eq!(out.drive.mecanum, MecanumDem::Feed);
        assert_eq!(out.drive.shifter, SolenoidPosition::Forward);
        assert!(!out.aligning);
        assert_eq!(out.intake.roller, 0.0);
        assert_eq!(out.climb.piston, SolenoidPosition::Forward);
        assert_eq!(ds.num_cycles, 1);
    }

    #[test]
    fn test_mode_toggle_and_mecanum_driving() {
        let mut ds = test_ds();

        let mut f = InputFrame::default();
        f.heading_deg = 30.0;
        f.primary.right_bumper = press();
        f.primary.right_x = 1.0;

        let out = cycle(&mut ds, &f);
        assert_eq!(ds.drive_ctrl.mode(), DriveMode::Mecanum);
        assert_eq!(out.drive.tank, TankDem::Feed);
        assert_eq!(out.drive.shifter, SolenoidPosition::Reverse);
        match out.drive.mecanum {
            MecanumDem::Cartesian { strafe, .. } => assert!((strafe - 0.1).abs() < 1e-9),
            MecanumDem::Feed => panic!("Mecanum not commanded"),
        }

        // Toggling zeroes the field orientation with this configuration
        assert_eq!(ds.drive_ctrl.field_orientation().reference_deg(), 30.0);

        // Holding the bumper on the next frames keeps the mode
        let out = cycle(&mut ds, &f.held());
        assert_eq!(ds.drive_ctrl.mode(), DriveMode::Mecanum);
        assert_eq!(out.drive.tank, TankDem::Feed);
    }

    #[test]
    fn test_alignment_overrides_operator() {
        let mut ds = test_ds();

        let mut f = InputFrame::default();
        f.primary.right_y = -1.0;
        f.primary.x = hold();
        f.tape.yaw_deg = 16.0;
        f.tape.detected = true;

        let out = cycle(&mut ds, &f);
        assert!(out.aligning);
        assert!(ds.align_tape_status_rpt.active);
        match out.drive.tank {
            TankDem::Arcade { forward, rotation } => {
                assert_eq!(forward, 0.0);
                assert_eq!(rotation, 0.7);
            }
            TankDem::Feed => panic!("Tank not commanded"),
        }

        // Target lost, operator drives again through the ramp
        f.tape.detected = false;
        let out = cycle(&mut ds, &f);
        assert!(!out.aligning);
        match out.drive.tank {
            TankDem::Arcade { forward, .. } => assert!(forward > 0.0 && forward <= 0.1 + 1e-9),
            TankDem::Feed => panic!("Tank not commanded"),
        }
    }

    #[test]
    fn test_cargo_wins_when_both_aligning() {
        let mut ds = test_ds();

        let mut f = InputFrame::default();
        f.primary.x = hold();
        f.primary.b = hold();
        f.tape.yaw_deg = 16.0;
        f.tape.detected = true;
        f.cargo.yaw_deg = -5.0;
        f.cargo.detected = true;

        // The cargo aligner strafes, which needs the mecanum geometry
        let out = cycle(&mut ds, &f);
        assert!(out.aligning);
        assert_eq!(ds.drive_ctrl.mode(), DriveMode::Mecanum);
        assert_eq!(out.drive.tank, TankDem::Feed);
        assert_eq!(
            out.drive.mecanum,
            MecanumDem::Cartesian {
                forward: 0.0,
                strafe: -0.24,
                rotation: 0.0
            }
        );
    }

    #[test]
    fn test_shipped_aligners_reach_the_drivetrain() {
        let shipped_ds = |mecanum: bool| {
            let mut ds = test_ds();
            ds.align_tape = AlignCtrl::new(load_shipped(ALIGN_TAPE_PARAMS)).unwrap();
            ds.align_cargo = AlignCtrl::new(load_shipped(ALIGN_CARGO_PARAMS)).unwrap();

            if mecanum {
                let mut f = InputFrame::default();
                f.primary.right_bumper = press();
                cycle(&mut ds, &f);
                assert_eq!(ds.drive_ctrl.mode(), DriveMode::Mecanum);
            }
            ds
        };

        // Operator driving hard while holding the align button
        let mut driving = InputFrame::default();
        driving.primary.right_y = -1.0;
        driving.primary.left_x = 0.8;

        // Tape target to the right, in both geometries
        let mut f = driving;
        f.primary.x = hold();
        f.tape.yaw_deg = 20.0;
        f.tape.detected = true;

        let mut ds = shipped_ds(false);
        let out = cycle(&mut ds, &f);
        assert!(out.aligning);
        assert_eq!(ds.drive_ctrl.mode(), DriveMode::Tank);
        let wheels = out.drive.tank.wheel_speeds();
        assert!(wheels[0] > 0.0 && wheels[1] < 0.0, "{:?}", wheels);

        let mut ds = shipped_ds(true);
        let out = cycle(&mut ds, &f);
        assert!(out.aligning);
        match out.drive.mecanum {
            MecanumDem::Cartesian { rotation, .. } => assert!(rotation > 0.0),
            MecanumDem::Feed => panic!("Mecanum not commanded"),
        }

        // Cargo target to the right, in both geometries
        let mut f = driving;
        f.primary.b = hold();
        f.cargo.yaw_deg = 5.0;
        f.cargo.detected = true;

        for &mecanum in [false, true].iter() {
            let mut ds = shipped_ds(mecanum);
            let out = cycle(&mut ds, &f);
            assert!(out.aligning);
            assert_eq!(out.drive.tank, TankDem::Feed);
            match out.drive.mecanum {
                MecanumDem::Cartesian { strafe, .. } => assert!(strafe > 0.0),
                MecanumDem::Feed => panic!("Mecanum not commanded"),
            }
            assert!(out.drive.mecanum.wheel_speeds().iter().any(|w| *w != 0.0));
        }
    }

    #[test]
    fn test_mechanisms() {
        let mut ds = test_ds();

        let mut f = InputFrame::default();
        f.secondary.pov = Some(crate::operator::POV_LEFT);
        f.secondary.left_y = -0.5;
        f.secondary.x = hold();
        f.primary.y = hold();
        f.primary.a = hold();
        f.lift_position = 1025.0;

        let out = cycle(&mut ds, &f);
        assert_eq!(out.lift.setpoint, 1025.0);
        assert!(ds.lift_status_rpt.at_setpoint);
        assert_eq!(out.intake.roller, 0.5);
        assert_eq!(out.intake.piston, SolenoidPosition::Forward);
        assert_eq!(out.climb.piston, SolenoidPosition::Reverse);
        assert_eq!(out.climb.drive, 0.6);

        // Lift trigger raises the setpoint continuously
        let mut f = InputFrame::default();
        f.secondary.right_trigger = 1.0;
        let out = cycle(&mut ds, &f);
        assert_eq!(out.lift.setpoint, 1095.0);
        assert_eq!(out.climb, climb_ctrl::OutputData::default());
    }
}
