//! End to end scenarios for the visual servo control loop.

use std::time::{Duration, Instant};

use comms_if::eqpt::{track::ObjectTrack, vel::VelocityCommand};
use servo_lib::{
    cancel::CancelToken,
    control_loop::{ControlLoop, LoopState},
    servo_ctrl::*,
    track_slot::{track_slot, TrackWriter},
    vel_sink::{RecordingSink, SinkError, VelocitySink},
};
use util::module::State;

/// Sink which records commands and cancels the run after a number of sends,
/// optionally losing the object at the same time.
struct CancellingSink {
    inner: RecordingSink,
    cancel: CancelToken,
    cancel_after: usize,
    lose_track: Option<TrackWriter>,
}

impl VelocitySink for CancellingSink {
    fn send(&mut self, cmd: &VelocityCommand) -> Result<(), SinkError> {
        self.inner.send(cmd)?;
        if self.inner.cmds.len() == self.cancel_after {
            if let Some(ref writer) = self.lose_track {
                writer.publish(ObjectTrack::absent());
            }
            self.cancel.cancel();
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }
}

fn params(lin: AxisGains, ang: AxisGains) -> ServoParams {
    ServoParams {
        cycle_period_s: 0.001,
        geometry: CaptureGeometry {
            size_x: 640,
            size_y: 480,
        },
        linear_y: lin,
        angular_z: ang,
    }
}

fn build_loop<S: VelocitySink>(
    params: ServoParams,
    sink: S,
    cancel: CancelToken,
) -> (ControlLoop<S>, TrackWriter) {
    let (writer, reader) = track_slot();
    let ctrl_loop = ControlLoop::new(
        ServoCtrl::new(params, Instant::now()),
        reader,
        sink,
        cancel,
        Duration::from_millis(1),
    );
    (ctrl_loop, writer)
}

#[test]
fn no_object_gives_zero_commands() {
    let gains = AxisGains::new(1.0, 1.0, 1.0, 1.0, 1.0);
    let (mut ctrl_loop, _writer) =
        build_loop(params(gains, gains), RecordingSink::new(), CancelToken::new());

    for _ in 0..10 {
        assert_eq!(ctrl_loop.step(), LoopState::Running);
    }

    let cmds = &ctrl_loop.sink().cmds;
    assert_eq!(cmds.len(), 10);
    assert!(cmds.iter().all(VelocityCommand::is_zero));
    assert_eq!(ctrl_loop.servo_ctrl().lin_ctrl().integral(), 0.0);
}

#[test]
fn shutdown_sends_one_final_zero() {
    let gains = AxisGains::new(1.0, 0.0, 0.0, 0.0, 1.0);
    let cancel = CancelToken::new();
    let sink = CancellingSink {
        inner: RecordingSink::new(),
        cancel: cancel.clone(),
        cancel_after: 5,
        lose_track: None,
    };

    let (ctrl_loop, writer) = build_loop(params(gains, gains), sink, cancel);
    writer.publish(ObjectTrack::at(160, 0, 50.0));

    let (summary, sink) = ctrl_loop.run();
    let cmds = &sink.inner.cmds;

    // Five tracking commands then exactly one zero
    assert_eq!(summary.num_cycles, 5);
    assert_eq!(cmds.len(), 6);
    assert!(cmds[..5].iter().all(|c| !c.is_zero()));
    assert!(cmds[5].is_zero());
    assert!(sink.inner.num_flushes >= 6);
}

#[test]
fn shutdown_without_object_sends_one_final_zero() {
    let gains = AxisGains::new(1.0, 0.0, 0.0, 0.0, 1.0);
    let cancel = CancelToken::new();
    let (writer, reader) = track_slot();
    let sink = CancellingSink {
        inner: RecordingSink::new(),
        cancel: cancel.clone(),
        cancel_after: 4,
        lose_track: Some(writer.clone()),
    };

    let ctrl_loop = ControlLoop::new(
        ServoCtrl::new(params(gains, gains), Instant::now()),
        reader,
        sink,
        cancel,
        Duration::from_millis(1),
    );
    writer.publish(ObjectTrack::at(-160, 0, 50.0));

    let (summary, sink) = ctrl_loop.run();
    let cmds = &sink.inner.cmds;

    // The object is gone when the token is set, the loop still drains once
    assert_eq!(summary.num_cycles, 4);
    assert_eq!(cmds.len(), 5);
    assert!(cmds[..4].iter().all(|c| !c.is_zero()));
    assert!(cmds[4].is_zero());
}

#[test]
fn lateral_offset_gives_half_command() {
    let gains = AxisGains::new(1.0, 0.0, 0.0, 0.0, 1.0);
    let t0 = Instant::now();
    let mut ctrl = ServoCtrl::new(params(gains, gains), t0);

    let (cmd, report) = ctrl
        .proc(&InputData {
            track: ObjectTrack::at(160, 0, 100.0),
            time: t0 + Duration::from_millis(20),
        })
        .unwrap();

    assert_eq!(report.cam_x, 0.5);
    assert_eq!(cmd, VelocityCommand { linear: 0.5, angular: 0.5 });
    assert!(!report.lin_limited);
}

#[test]
fn integral_is_held_at_clamp() {
    let gains = AxisGains::new(0.0, 2.0, 0.0, 0.3, 1.0);
    let t0 = Instant::now();
    let mut ctrl = ServoCtrl::new(params(gains, gains), t0);

    // Object held hard right for a long time
    for i in 1..=100 {
        let (cmd, _) = ctrl
            .proc(&InputData {
                track: ObjectTrack::at(320, 0, 10.0),
                time: t0 + Duration::from_millis(100 * i),
            })
            .unwrap();
        assert!(cmd.linear <= 0.6 + 1e-12);
    }

    assert!((ctrl.lin_ctrl().integral() - 0.3).abs() < 1e-12);

    // Moving to the other side unwinds immediately from the clamp
    for i in 101..=200 {
        ctrl.proc(&InputData {
            track: ObjectTrack::at(-320, 0, 10.0),
            time: t0 + Duration::from_millis(100 * i),
        })
        .unwrap();
    }

    assert!((ctrl.lin_ctrl().integral() + 0.3).abs() < 1e-12);
}

#[test]
fn zero_gains_are_inert() {
    let (mut ctrl_loop, writer) = build_loop(
        params(AxisGains::default(), AxisGains::default()),
        RecordingSink::new(),
        CancelToken::new(),
    );

    for x in &[-320, -10, 0, 45, 319] {
        writer.publish(ObjectTrack::at(*x, 12, 30.0));
        ctrl_loop.step();
    }

    assert!(ctrl_loop.sink().cmds.iter().all(VelocityCommand::is_zero));
}
