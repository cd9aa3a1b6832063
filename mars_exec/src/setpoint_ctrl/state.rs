//! Implementations for the SetpointCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{Params, SetpointCtrlError};
use crate::controllers::PidController;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A setpoint which always lies within `[min, max]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Setpoint {
    value: f64,
    min: f64,
    max: f64,
}

/// Setpoint control module state
#[derive(Default)]
pub struct SetpointCtrl {
    pub(crate) params: Params,

    setpoint: Setpoint,

    pid: PidController,

    /// Set when a write was clamped, reported on the next proc.
    write_clamped: bool,

    pub(crate) report: StatusReport,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,

    num_cycles: u64,
}

/// Input data to Setpoint Control.
#[derive(Default, Clone, Copy, Debug)]
pub struct InputData {
    /// Position feedback of the mechanism. A sensor which has not reported
    /// yet reads as zero.
    ///
    /// Units: sensor units
    pub position: f64,
}

/// Output of Setpoint Control.
#[derive(Default, Clone, Copy, Serialize, Debug, PartialEq)]
pub struct OutputData {
    /// The setpoint being tracked.
    pub setpoint: f64,

    /// Motor demand.
    ///
    /// Units: normalised, within the PID output range
    pub output: f64,
}

/// Status report for SetpointCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The mechanism is within tolerance of the setpoint.
    pub at_setpoint: bool,

    /// A setpoint write since the last cycle fell outside the range.
    pub setpoint_clamped: bool,

    /// Setpoint minus feedback.
    pub error: f64,
}

/// Flat archive record.
#[derive(Serialize)]
struct ArchRecord {
    cycle: u64,
    setpoint: f64,
    output: f64,
    error: f64,
    at_setpoint: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Setpoint {
    /// Create a new setpoint, clamping `value` into the range.
    pub fn new(value: f64, min: f64, max: f64) -> Self {
        let mut s = Self { value: min, min, max };
        s.set(value);
        s
    }

    /// Set the value, returning true if it had to be clamped.
    pub fn set(&mut self, value: f64) -> bool {
        self.value = clamp(&value, &self.min, &self.max);

        self.value != value
    }

    /// Add `delta` to the value, clamping the result.
    pub fn adjust(&mut self, delta: f64) -> bool {
        self.set(self.value + delta)
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl State for SetpointCtrl {
    type InitData = &'static str;
    type InitError = SetpointCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SetpointCtrlError;

    /// Initialise the SetpointCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(SetpointCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        self.arch_output =
            Archiver::from_path(session, format!("{}/output.csv", self.params.name))
                .map_err(SetpointCtrlError::ArchiveError)?;

        Ok(())
    }

    /// Perform cyclic processing of Setpoint Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport {
            setpoint_clamped: self.write_clamped,
            ..Default::default()
        };
        self.write_clamped = false;

        let output = OutputData {
            setpoint: self.setpoint.get(),
            output: self.tick(input_data.position),
        };

        self.report.at_setpoint = self.pid.at_setpoint();
        self.report.error = self.setpoint.get() - input_data.position;

        trace!(
            "{}: setpoint {:.02}, feedback {:.02}, output {:.03}",
            self.params.name,
            output.setpoint,
            input_data.position,
            output.output
        );

        self.output = Some(output);
        self.num_cycles += 1;

        Ok((output, self.report))
    }
}

impl Archived for SetpointCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if let Some(o) = self.output {
            self.arch_output.serialise(ArchRecord {
                cycle: self.num_cycles,
                setpoint: o.setpoint,
                output: o.output,
                error: self.report.error,
                at_setpoint: self.report.at_setpoint,
            })?;
        }

        Ok(())
    }
}

impl SetpointCtrl {
    /// Create a new instance from already loaded parameters.
    pub fn new(params: Params) -> Result<Self, SetpointCtrlError> {
        params.validate()?;

        Ok(Self {
            setpoint: Setpoint::new(params.initial, params.min, params.max),
            pid: PidController::new(params.pid),
            params,
            ..Default::default()
        })
    }

    /// Set the setpoint, clamped into the mechanism's range.
    pub fn set_absolute(&mut self, value: f64) {
        if self.setpoint.set(value) {
            debug!(
                "{}: setpoint {} clamped to {}",
                self.params.name,
                value,
                self.setpoint.get()
            );
            self.write_clamped = true;
        }
    }

    /// Move the setpoint by `delta`, clamped into the mechanism's range.
    pub fn adjust_by(&mut self, delta: f64) {
        if self.setpoint.adjust(delta) {
            self.write_clamped = true;
        }
    }

    /// Move the setpoint proportionally to an analog input.
    ///
    /// Magnitudes inside the adjust deadband do nothing, otherwise the
    /// setpoint moves by `magnitude * adjust_rate`.
    pub fn adjust_from_axis(&mut self, magnitude: f64) {
        if magnitude.abs() > self.params.adjust_deadband {
            self.adjust_by(magnitude * self.params.adjust_rate);
        }
    }

    /// Go to one of the configured preset setpoints.
    pub fn go_to_preset(&mut self, index: usize) {
        match self.params.presets.get(index) {
            Some(&p) => self.set_absolute(p),
            None => warn!(
                "{}: no preset with index {} ({} configured), ignored",
                self.params.name,
                index,
                self.params.presets.len()
            ),
        }
    }

    pub fn get(&self) -> f64 {
        self.setpoint.get()
    }

    pub fn setpoint(&self) -> &Setpoint {
        &self.setpoint
    }

    /// Step the position loop with this cycle's feedback.
    pub fn tick(&mut self, position: f64) -> f64 {
        self.pid.get(self.setpoint.get() - position)
    }

    /// Returns true if the last tick was within tolerance.
    pub fn at_setpoint(&self) -> bool {
        self.pid.at_setpoint()
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }
}
