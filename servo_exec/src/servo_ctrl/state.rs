//! ServoCtrl module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Instant;

// Internal
use super::*;
use comms_if::eqpt::{track::ObjectTrack, vel::VelocityCommand};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::{self, Session},
    time::secs_between,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Visual servo control module state
pub struct ServoCtrl {
    params: ServoParams,

    /// Lateral velocity controller
    lin_ctrl: AxisController,

    /// Yaw rate controller
    ang_ctrl: AxisController,

    /// Filter applied to the error rate, shared by both controllers
    filter: DerivFilter,

    /// Error at the last cycle the object was seen
    last_error: f64,

    /// Time of the last cycle the object was seen
    last_time: Instant,

    report: StatusReport,
    arch_report: Archiver,
}

/// Data required to initialise ServoCtrl through the [`State`] interface.
pub struct InitData {
    /// The loaded parameters
    pub params: ServoParams,

    /// If true the status report of every cycle is archived
    pub archive: bool,
}

/// Input data to visual servo control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// The latest measurement from the tracker
    pub track: ObjectTrack,

    /// The time at which this cycle is processed
    pub time: Instant,
}

/// Status report for ServoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Session time of the cycle
    pub time_s: f64,

    /// True if the object was seen this cycle
    pub present: bool,

    /// Normalised horizontal position of the object, which is also the error
    pub cam_x: f64,

    /// Normalised vertical position of the object
    pub cam_y: f64,

    /// Area of the object
    pub cam_area: f64,

    /// Time since the last cycle the object was seen
    pub dt_s: f64,

    /// Unfiltered error rate
    pub err_dot: f64,

    /// Filtered error rate passed to the controllers
    pub err_dot_avg: f64,

    /// Lateral controller output before limiting
    pub out_lin_y: f64,

    /// Yaw controller output before limiting
    pub out_ang_z: f64,

    /// True if the limiter changed the lateral output
    pub lin_limited: bool,

    /// True if the limiter changed the yaw output
    pub ang_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ServoCtrl {
    fn default() -> Self {
        Self::new(ServoParams::default(), Instant::now())
    }
}

impl ServoCtrl {
    /// Create a new controller. `start` is the time processing begins,
    /// which the first cycle's time step is measured from.
    pub fn new(params: ServoParams, start: Instant) -> Self {
        Self {
            lin_ctrl: AxisController::new(params.linear_y),
            ang_ctrl: AxisController::new(params.angular_z),
            params,
            filter: DerivFilter::new(),
            last_error: 0.0,
            last_time: start,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// The parameters this controller was built from.
    pub fn params(&self) -> &ServoParams {
        &self.params
    }

    /// The report from the most recent cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// The lateral velocity controller.
    pub fn lin_ctrl(&self) -> &AxisController {
        &self.lin_ctrl
    }

    /// The yaw rate controller.
    pub fn ang_ctrl(&self) -> &AxisController {
        &self.ang_ctrl
    }

    /// Compute the velocity command for the object seen this cycle.
    fn calc_tracking_cmd(&mut self, track: &ObjectTrack, time: Instant) -> VelocityCommand {
        let (cam_x, cam_y) = self.params.geometry.normalise(track.x, track.y);

        let error = cam_x;
        let dt = secs_between(self.last_time, time);

        // With no time step the rate is unknown, a zero rate is ignored by the filter
        let err_dot = if dt > 0.0 {
            (error - self.last_error) / dt
        } else {
            0.0
        };
        let err_dot_avg = self.filter.observe(err_dot);

        let out_lin_y = self.lin_ctrl.update(error, err_dot_avg, dt);
        let out_ang_z = self.ang_ctrl.update(error, err_dot_avg, dt);

        self.last_time = time;
        self.last_error = error;

        let lim_lin_y = limit(out_lin_y);
        let lim_ang_z = limit(out_ang_z);

        debug!(
            "cam_x = {:.2}, out_y = {:.2}, out_z = {:.4}, err_dot = {:.3}, err_dot_avg = {:.3}",
            cam_x, lim_lin_y, lim_ang_z, err_dot, err_dot_avg
        );

        self.report.present = true;
        self.report.cam_x = cam_x;
        self.report.cam_y = cam_y;
        self.report.cam_area = track.area;
        self.report.dt_s = dt;
        self.report.err_dot = err_dot;
        self.report.err_dot_avg = err_dot_avg;
        self.report.out_lin_y = out_lin_y;
        self.report.out_ang_z = out_ang_z;
        self.report.lin_limited = lim_lin_y != out_lin_y;
        self.report.ang_limited = lim_ang_z != out_ang_z;

        VelocityCommand {
            linear: lim_lin_y * self.params.linear_y.speed,
            angular: lim_ang_z * self.params.angular_z.speed,
        }
    }
}

impl State for ServoCtrl {
    type InitData = InitData;
    type InitError = ServoCtrlError;

    type InputData = InputData;
    type OutputData = VelocityCommand;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the ServoCtrl module, resetting all controller state.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        *self = Self::new(init_data.params, Instant::now());

        if init_data.archive {
            self.arch_report = Archiver::from_path(session, "servo_ctrl/status_report.csv")
                .map_err(ServoCtrlError::ArchiveError)?;
        }

        Ok(())
    }

    /// Perform cyclic processing of visual servo control.
    ///
    /// Processing never fails, degenerate inputs result in a zero command.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport {
            time_s: session::get_elapsed_seconds(),
            ..StatusReport::default()
        };

        let cmd = if input_data.track.present {
            self.calc_tracking_cmd(&input_data.track, input_data.time)
        } else {
            trace!("nothing");
            VelocityCommand::zero()
        };

        Ok((cmd, self.report))
    }
}

impl Archived for ServoCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}
