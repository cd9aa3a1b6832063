//! Climb control module
//!
//! The climber has a powered knee which lowers the rear leg, a drive wheel
//! on the foot of the leg and a piston which lifts the front of the robot.
//! All demands hold for one cycle only.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Deserialize, Serialize};

// Internal
use crate::eqpt::SolenoidPosition;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::{Demanded, State},
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Climb control module state
#[derive(Default)]
pub struct ClimbCtrl {
    params: Params,

    dems: Demands,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Demands written to the climber for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Demands {
    pub knee: f64,
    pub drive: f64,
    pub extend_piston: bool,
}

/// Parameters for climb control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Largest knee motor demand magnitude.
    pub max_knee_speed: f64,

    /// Largest leg drive demand magnitude.
    pub max_drive_speed: f64,
}

/// Output demands of the climber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    pub knee: f64,
    pub drive: f64,
    pub piston: SolenoidPosition,
}

/// Status report for ClimbCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub knee_limited: bool,
    pub drive_limited: bool,
    pub piston_extended: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ClimbCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ClimbCtrlError {
    #[error("Could not load the climb parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Climb speed limits must be in (0, 1], found {0:?}")]
    InvalidParams(Params),

    #[error("Could not open the climb archive: {0}")]
    ArchiveError(ArchiveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            max_knee_speed: 1.0,
            max_drive_speed: 1.0,
        }
    }
}

impl State for ClimbCtrl {
    type InitData = &'static str;
    type InitError = ClimbCtrlError;

    type InputData = ();
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ClimbCtrlError;

    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(ClimbCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        self.arch_output = Archiver::from_path(session, "climb_ctrl/output.csv")
            .map_err(ClimbCtrlError::ArchiveError)?;

        Ok(())
    }

    fn proc(
        &mut self,
        _input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let dems = self.take_demands();

        let knee_max = self.params.max_knee_speed;
        let drive_max = self.params.max_drive_speed;

        // The piston is plumbed so that extending needs the reverse position
        let output = OutputData {
            knee: clamp(&dems.knee, &-knee_max, &knee_max),
            drive: clamp(&dems.drive, &-drive_max, &drive_max),
            piston: match dems.extend_piston {
                true => SolenoidPosition::Reverse,
                false => SolenoidPosition::Forward,
            },
        };
        let report = StatusReport {
            knee_limited: output.knee != dems.knee,
            drive_limited: output.drive != dems.drive,
            piston_extended: dems.extend_piston,
        };

        trace!("ClimbCtrl output: {:?}", output);

        self.output = Some(output);

        Ok((output, report))
    }
}

impl Archived for ClimbCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.output {
            Some(o) => self.arch_output.serialise(o),
            None => Ok(()),
        }
    }
}

impl Demanded for ClimbCtrl {
    type Demands = Demands;

    fn demands(&self) -> &Demands {
        &self.dems
    }

    fn demands_mut(&mut self) -> &mut Demands {
        &mut self.dems
    }
}

impl ClimbCtrl {
    pub fn new(params: Params) -> Result<Self, ClimbCtrlError> {
        let in_range = |v: f64| v > 0.0 && v <= 1.0;

        if !(in_range(params.max_knee_speed) && in_range(params.max_drive_speed)) {
            return Err(ClimbCtrlError::InvalidParams(params));
        }

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    pub fn set_knee_speed(&mut self, speed: f64) {
        self.dems.knee = speed;
    }

    pub fn set_drive_speed(&mut self, speed: f64) {
        self.dems.drive = speed;
    }

    pub fn extend_piston(&mut self) {
        self.dems.extend_piston = true;
    }
}
