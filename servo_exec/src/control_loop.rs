//! # Control loop
//!
//! Drives [`ServoCtrl`] at a fixed rate, reading the latest tracking
//! measurement each cycle and sending the resulting velocity command to a
//! [`VelocitySink`].
//!
//! The loop is a small state machine:
//!
//! - `Running`: one command computed and sent per cycle.
//! - `Draining`: entered once the [`CancelToken`] is set. A single zero
//!   command is sent and the sink flushed.
//! - `Terminated`: the loop has finished.
//!
//! The token is checked at the start of every cycle and again after every
//! command sent while running, so exactly one zero command follows a
//! cancellation no matter when it arrives.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};

use comms_if::eqpt::vel::VelocityCommand;
use util::{archive::Archived, module::State, session};

use crate::{
    cancel::CancelToken,
    servo_ctrl::{InputData, ServoCtrl},
    track_slot::TrackReader,
    vel_sink::VelocitySink,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The fixed-rate visual servo control loop.
pub struct ControlLoop<S: VelocitySink> {
    servo_ctrl: ServoCtrl,

    track_reader: TrackReader,

    sink: S,

    cancel: CancelToken,

    /// Target period of one cycle
    period: Duration,

    state: LoopState,

    /// Number of cycles executed while running
    num_cycles: u64,

    /// Number of cycles which took longer than the period
    num_overruns: u64,
}

/// Summary of a completed run, saved into the session at exit.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RunSummary {
    /// Number of cycles executed while running
    pub num_cycles: u64,

    /// Number of cycles which took longer than the period
    pub num_overruns: u64,

    /// Session time at which the loop terminated
    pub terminated_at_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// States of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Draining,
    Terminated,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S: VelocitySink> ControlLoop<S> {
    /// Create a new loop in the `Running` state.
    pub fn new(
        servo_ctrl: ServoCtrl,
        track_reader: TrackReader,
        sink: S,
        cancel: CancelToken,
        period: Duration,
    ) -> Self {
        Self {
            servo_ctrl,
            track_reader,
            sink,
            cancel,
            period,
            state: LoopState::Running,
            num_cycles: 0,
            num_overruns: 0,
        }
    }

    /// The current state of the loop.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The sink commands are sent to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The controller driven by the loop.
    pub fn servo_ctrl(&self) -> &ServoCtrl {
        &self.servo_ctrl
    }

    /// Execute one cycle without any sleep, returning the state afterwards.
    ///
    /// Each call in the `Running` or `Draining` states sends exactly one
    /// command. Calls once `Terminated` do nothing.
    pub fn step(&mut self) -> LoopState {
        self.poll_cancel();

        match self.state {
            LoopState::Running => {
                self.run_cycle();
                self.poll_cancel();
            }
            LoopState::Draining => self.drain(),
            LoopState::Terminated => (),
        }

        self.state
    }

    /// Run the loop at the target rate until it terminates.
    ///
    /// Returns the run summary and the sink.
    pub fn run(mut self) -> (RunSummary, S) {
        info!(
            "Entering control loop at {:.1} Hz",
            1.0 / self.period.as_secs_f64()
        );

        while self.state != LoopState::Terminated {
            let cycle_start = Instant::now();

            self.step();

            // Sleep for the remainder of the cycle. The draining cycle also
            // sleeps so the final command has time to be delivered.
            let cycle_dur = cycle_start.elapsed();
            match self.period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - self.period.as_secs_f64()
                    );
                    self.num_overruns += 1;
                }
            }
        }

        info!("Bye");

        let summary = RunSummary {
            num_cycles: self.num_cycles,
            num_overruns: self.num_overruns,
            terminated_at_s: session::get_elapsed_seconds(),
        };

        (summary, self.sink)
    }

    fn poll_cancel(&mut self) {
        if self.state == LoopState::Running && self.cancel.is_cancelled() {
            self.state = LoopState::Draining;
        }
    }

    fn run_cycle(&mut self) {
        let input = InputData {
            track: self.track_reader.latest(),
            time: Instant::now(),
        };

        let cmd = match self.servo_ctrl.proc(&input) {
            Ok((cmd, _)) => cmd,
            Err(never) => match never {},
        };

        if let Err(e) = self.servo_ctrl.write() {
            warn!("Could not archive ServoCtrl status: {}", e);
        }

        self.emit(&cmd);
        self.num_cycles += 1;
    }

    fn drain(&mut self) {
        warn!("Stopping the motors...");

        self.emit(&VelocityCommand::zero());
        self.state = LoopState::Terminated;
    }

    fn emit(&mut self, cmd: &VelocityCommand) {
        if let Err(e) = self.sink.send(cmd) {
            warn!("Could not send velocity command: {}", e);
        }
        if let Err(e) = self.sink.flush() {
            warn!("Could not flush velocity commands: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        servo_ctrl::*,
        track_slot::track_slot,
        vel_sink::{RecordingSink, SinkError},
    };
    use comms_if::eqpt::track::ObjectTrack;

    /// Sink which takes longer than a cycle to send and cancels the run
    /// after a number of sends.
    struct SlowSink {
        inner: RecordingSink,
        cancel: CancelToken,
        cancel_after: usize,
        delay: Duration,
    }

    impl VelocitySink for SlowSink {
        fn send(&mut self, cmd: &VelocityCommand) -> Result<(), SinkError> {
            thread::sleep(self.delay);
            self.inner.send(cmd)?;
            if self.inner.cmds.len() == self.cancel_after {
                self.cancel.cancel();
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), SinkError> {
            self.inner.flush()
        }
    }

    fn tracking_loop() -> (ControlLoop<RecordingSink>, CancelToken) {
        let gains = AxisGains::new(1.0, 0.0, 0.0, 0.0, 1.0);
        let params = ServoParams {
            geometry: CaptureGeometry { size_x: 640, size_y: 480 },
            linear_y: gains,
            angular_z: gains,
            ..ServoParams::default()
        };

        let (writer, reader) = track_slot();
        writer.publish(ObjectTrack::at(160, 0, 100.0));

        let cancel = CancelToken::new();
        let ctrl_loop = ControlLoop::new(
            ServoCtrl::new(params, Instant::now()),
            reader,
            RecordingSink::new(),
            cancel.clone(),
            Duration::from_millis(1),
        );

        (ctrl_loop, cancel)
    }

    #[test]
    fn test_states() {
        let (mut ctrl_loop, cancel) = tracking_loop();

        assert_eq!(ctrl_loop.step(), LoopState::Running);
        assert_eq!(ctrl_loop.step(), LoopState::Running);

        cancel.cancel();

        // Cancellation seen at the start of the step, which then drains
        assert_eq!(ctrl_loop.step(), LoopState::Terminated);
        assert_eq!(ctrl_loop.step(), LoopState::Terminated);

        let cmds = &ctrl_loop.sink().cmds;
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0], VelocityCommand { linear: 0.5, angular: 0.5 });
        assert!(cmds[2].is_zero());
    }

    #[test]
    fn test_cancel_before_start() {
        let (ctrl_loop, cancel) = tracking_loop();
        cancel.cancel();

        let (summary, sink) = ctrl_loop.run();

        assert_eq!(summary.num_cycles, 0);
        assert_eq!(sink.cmds, vec![VelocityCommand::zero()]);
        assert!(sink.num_flushes >= 1);
    }

    #[test]
    fn test_overruns_counted() {
        let (_, reader) = track_slot();
        let cancel = CancelToken::new();
        let sink = SlowSink {
            inner: RecordingSink::new(),
            cancel: cancel.clone(),
            cancel_after: 3,
            delay: Duration::from_millis(5),
        };

        let ctrl_loop = ControlLoop::new(
            ServoCtrl::default(),
            reader,
            sink,
            cancel,
            Duration::from_millis(1),
        );

        let (summary, sink) = ctrl_loop.run();

        // Every cycle overran, including the draining one, and the run still
        // ended with a single zero command
        assert_eq!(summary.num_cycles, 3);
        assert_eq!(summary.num_overruns, 4);
        assert_eq!(sink.inner.cmds.len(), 4);
        assert!(sink.inner.cmds.iter().all(VelocityCommand::is_zero));
    }
}
