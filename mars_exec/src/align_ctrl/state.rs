//! Implementations for the AlignCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{AlignCtrlError, AlignStrategy, CorrectionAxis, Params};
use crate::{
    controllers::PidController,
    drive_ctrl::{DriveCommand, DriveMode},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Alignment controller state
#[derive(Default)]
pub struct AlignCtrl {
    pub(crate) params: Params,

    /// Operator gate
    enabled: bool,

    /// Gate state on the previous cycle, used to find the opening edge.
    prev_enabled: bool,

    on_target: bool,

    pid: Option<PidController>,

    pub(crate) report: StatusReport,

    pub(crate) output: Option<DriveCommand>,
    arch_output: Archiver,

    num_cycles: u64,
}

/// Vision data for one cycle.
#[derive(Default, Clone, Copy, Debug)]
pub struct InputData {
    /// Angle from the camera to the target, positive to the right.
    ///
    /// Units: degrees
    pub yaw_deg: f64,

    /// The vision system currently sees a target.
    pub target_detected: bool,
}

/// Status report for AlignCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub enabled: bool,
    pub target_detected: bool,

    /// True if a drive command was produced.
    pub active: bool,
    pub on_target: bool,

    /// Target yaw minus the yaw reading. The correction has the opposite
    /// sign.
    pub error_deg: f64,

    /// Correction applied on the configured axis.
    pub correction: f64,
}

/// Flat archive record.
#[derive(Serialize)]
struct ArchRecord {
    cycle: u64,
    enabled: bool,
    target_detected: bool,
    on_target: bool,
    error_deg: f64,
    forward: f64,
    strafe: f64,
    rotation: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for AlignCtrl {
    type InitData = &'static str;
    type InitError = AlignCtrlError;

    type InputData = InputData;
    type OutputData = Option<DriveCommand>;
    type StatusReport = StatusReport;
    type ProcError = AlignCtrlError;

    /// Initialise the AlignCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(AlignCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        self.arch_output = Archiver::from_path(session, format!("{}/output.csv", self.params.name))
            .map_err(AlignCtrlError::ArchiveError)?;

        Ok(())
    }

    /// Perform cyclic processing of the alignment.
    ///
    /// Returns the drive command which must replace the operator's this
    /// cycle, or `None` if the operator keeps control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport {
            enabled: self.enabled,
            target_detected: input_data.target_detected,
            ..Default::default()
        };

        if self.enabled && !self.prev_enabled {
            debug!("{} alignment enabled", self.params.name);

            if self.params.reset_on_enable {
                if let Some(ref mut pid) = self.pid {
                    pid.reset();
                }
            }
        }
        self.prev_enabled = self.enabled;

        if !(self.enabled && input_data.target_detected) {
            self.on_target = false;
            self.output = None;
            self.num_cycles += 1;

            return Ok((None, self.report));
        }

        let error_deg = self.params.target_yaw_deg - input_data.yaw_deg;
        self.update_on_target(error_deg);

        let correction = self.correction(error_deg);

        let mut cmd = DriveCommand::default().raw();
        match self.params.correction_axis {
            CorrectionAxis::Rotation => cmd.rotation = correction,
            CorrectionAxis::Strafe => {
                cmd.strafe = correction;
                cmd = cmd.in_mode(DriveMode::Mecanum);
            }
        }
        if self.on_target {
            cmd.forward = self.params.cruise_forward;
        }

        trace!(
            "{} alignment: error {:.02} deg, on target {}, command {:?}",
            self.params.name,
            error_deg,
            self.on_target,
            cmd
        );

        self.report.active = true;
        self.report.on_target = self.on_target;
        self.report.error_deg = error_deg;
        self.report.correction = correction;

        self.output = Some(cmd);
        self.num_cycles += 1;

        Ok((Some(cmd), self.report))
    }
}

impl Archived for AlignCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let cmd = self.output.unwrap_or_default();

        self.arch_output.serialise(ArchRecord {
            cycle: self.num_cycles,
            enabled: self.report.enabled,
            target_detected: self.report.target_detected,
            on_target: self.report.on_target,
            error_deg: self.report.error_deg,
            forward: cmd.forward,
            strafe: cmd.strafe,
            rotation: cmd.rotation,
        })
    }
}

impl AlignCtrl {
    /// Create a new instance from already loaded parameters.
    pub fn new(params: Params) -> Result<Self, AlignCtrlError> {
        params.validate()?;

        let pid = match params.strategy {
            AlignStrategy::Pid(p) => Some(PidController::new(p)),
            AlignStrategy::BangBang { .. } => None,
        };

        Ok(Self {
            params,
            pid,
            ..Default::default()
        })
    }

    /// Open or close the operator gate.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn on_target(&self) -> bool {
        self.on_target
    }

    /// Update the on target state with hysteresis between the tolerance and
    /// the release tolerance.
    fn update_on_target(&mut self, error_deg: f64) {
        let limit = match self.on_target {
            true => self.params.release_tolerance_deg(),
            false => self.params.tolerance_deg,
        };

        self.on_target = error_deg.abs() <= limit;
    }

    /// Correction for the given error, positive when the target is to the
    /// right so that the robot turns or slides towards it.
    fn correction(&mut self, error_deg: f64) -> f64 {
        match (self.params.strategy, self.pid.as_mut()) {
            (AlignStrategy::Pid(_), Some(pid)) => -pid.get(error_deg),
            (AlignStrategy::BangBang { speed, deadband_deg }, _) => {
                if error_deg < -deadband_deg {
                    speed
                } else if error_deg > deadband_deg {
                    -speed
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}
