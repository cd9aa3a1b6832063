//! Intake control module
//!
//! Drives the cargo roller and the hatch panel piston. Both demands are
//! written by the operator every cycle and fall back to stopped and
//! retracted once they have been used.

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

/// Intake control module state
#[derive(Default)]
pub struct IntakeCtrl {
    params: Params,

    dems: Demands,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Demands written to the intake for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Demands {
    pub roller: f64,
    pub extend_piston: bool,
}

/// Parameters for intake control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Largest roller demand magnitude.
    ///
    /// Units: normalised, (0, 1]
    pub max_roller_speed: f64,
}

/// Output demands of the intake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    /// Roller demand, positive draws cargo in.
    pub roller: f64,

    pub piston: SolenoidPosition,
}

/// Status report for IntakeCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub roller_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during IntakeCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum IntakeCtrlError {
    #[error("Could not load the intake parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Maximum roller speed must be in (0, 1], found {0}")]
    InvalidMaxRollerSpeed(f64),

    #[error("Could not open the intake archive: {0}")]
    ArchiveError(ArchiveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            max_roller_speed: 1.0,
        }
    }
}

impl State for IntakeCtrl {
    type InitData = &'static str;
    type InitError = IntakeCtrlError;

    type InputData = ();
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = IntakeCtrlError;

    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(IntakeCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        self.arch_output = Archiver::from_path(session, "intake_ctrl/output.csv")
            .map_err(IntakeCtrlError::ArchiveError)?;

        Ok(())
    }

    fn proc(
        &mut self,
        _input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let dems = self.take_demands();

        let max = self.params.max_roller_speed;
        let roller = clamp(&dems.roller, &-max, &max);

        let output = OutputData {
            roller,
            piston: match dems.extend_piston {
                true => SolenoidPosition::Forward,
                false => SolenoidPosition::Reverse,
            },
        };
        let report = StatusReport {
            roller_limited: roller != dems.roller,
        };

        trace!("IntakeCtrl output: {:?}", output);

        self.output = Some(output);

        Ok((output, report))
    }
}

impl Archived for IntakeCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.output {
            Some(o) => self.arch_output.serialise(o),
            None => Ok(()),
        }
    }
}

impl Demanded for IntakeCtrl {
    type Demands = Demands;

    fn demands(&self) -> &Demands {
        &self.dems
    }

    fn demands_mut(&mut self) -> &mut Demands {
        &mut self.dems
    }
}

impl IntakeCtrl {
    pub fn new(params: Params) -> Result<Self, IntakeCtrlError> {
        if !(params.max_roller_speed > 0.0 && params.max_roller_speed <= 1.0) {
            return Err(IntakeCtrlError::InvalidMaxRollerSpeed(params.max_roller_speed));
        }

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Set the roller demand for this cycle.
    pub fn set_roller(&mut self, speed: f64) {
        self.dems.roller = speed;
    }

    /// Extend the hatch piston for this cycle.
    pub fn extend_piston(&mut self) {
        self.dems.extend_piston = true;
    }
}
