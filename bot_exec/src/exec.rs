//! Per-cycle execution
//!
//! One control cycle, in strict order: hardware read, odometry update,
//! command sequencing, drive control, hardware write. The odometry update
//! happens-before any command logic that reads the pose in the same cycle.
//! Nothing here blocks - commands that need to wait report not-finished and
//! are stepped again next cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use crate::{
    cmd_seq::CmdCtx,
    data_store::DataStore,
    drive_ctrl::{self, DriveCtrlError},
    hw::DriveHw,
    odom::Pose,
};
use util::module::State;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors during cycle execution.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Error during DriveCtrl processing: {0}")]
    DriveCtrlError(#[from] DriveCtrlError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute exactly one control cycle.
pub fn cycle(ds: &mut DataStore, hw: &mut dyn DriveHw) -> Result<(), CycleError> {
    // ---- SENSING ----

    ds.hw_readings = hw.read();

    // ---- ODOMETRY ----

    ds.odom.update(&ds.hw_readings.snapshot);

    // ---- COMMAND SEQUENCING ----

    let pose = ds.odom.pose();
    let seq_out = ds.cmd_seq.step(&CmdCtx {
        pose: &pose,
        snapshot: &ds.hw_readings.snapshot,
    });
    ds.last_cmd_state = seq_out.state;

    // A sequenced command has exclusive use of the drivetrain; otherwise any
    // demand set by the path follower applies this cycle.
    let desired_speeds = match seq_out.speeds {
        Some(s) => {
            if ds.desired_speeds.take().is_some() {
                warn!("Path follower demand ignored while a command is running");
            }
            Some(s)
        }
        None => ds.desired_speeds.take(),
    };

    // ---- DRIVE CONTROL ----

    let (output, report) = ds.drive_ctrl.proc(&drive_ctrl::InputData {
        desired_speeds,
        wheel_rates: ds.hw_readings.wheel_rates,
    })?;
    ds.drive_ctrl_output = output;
    ds.drive_ctrl_status_rpt = report;

    // ---- ACTUATION ----

    hw.write_command(&output.cmd);

    ds.num_cycles += 1;

    Ok(())
}

/// Reset the pose estimate to the given pose.
///
/// Zeroes the hardware distance/heading references so the next snapshot reads
/// zero deltas, then overwrites the pose. This is the only permitted pose
/// discontinuity.
pub fn reset_pose(ds: &mut DataStore, hw: &mut dyn DriveHw, pose: Pose) {
    hw.reset_encoders();
    hw.reset_heading();
    ds.odom.reset(pose);
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cmd_seq::{self, CmdState, DriveDistance},
        drive_ctrl::{BodySpeeds, DriveCtrl, NormalizedCommand},
        hw::SimDriveHw,
    };

    const CYCLE_PERIOD_S: f64 = 0.02;
    const PI: f64 = std::f64::consts::PI;

    fn drive_params() -> drive_ctrl::Params {
        drive_ctrl::Params {
            track_width_m: 0.141,
            wheel_circumference_m: 0.2199,
            encoder_counts_per_rev: 1440.0,
            wheel_max_speed_ms: 0.5498,
            motor_gain: 0.066,
        }
    }

    fn seq_params() -> cmd_seq::Params {
        cmd_seq::Params {
            drive_speed_ms: -0.5,
            leg_distance_m: 0.25,
            turn_rate_rads: 2.0,
            mirror_routine: false,
        }
    }

    fn fixture() -> (DataStore, SimDriveHw) {
        let params = drive_params();
        let mut ds = DataStore::default();
        ds.drive_ctrl = DriveCtrl::with_params(params.clone()).unwrap();
        ds.cmd_seq = cmd_seq::CmdSeq::with_params(seq_params());

        let mut hw = SimDriveHw::new(params.track_width_m, params.wheel_max_speed_ms);
        reset_pose(&mut ds, &mut hw, Pose::default());

        (ds, hw)
    }

    /// Run cycles until the active command terminates, stepping the
    /// simulation by one period each cycle.
    fn run_until_terminal(ds: &mut DataStore, hw: &mut SimDriveHw, max_cycles: u32) -> CmdState {
        for _ in 0..max_cycles {
            cycle(ds, hw).unwrap();
            hw.step(CYCLE_PERIOD_S);

            match ds.last_cmd_state {
                Some(CmdState::Finished) | Some(CmdState::Interrupted) => {
                    return ds.last_cmd_state.unwrap()
                }
                _ => (),
            }
        }

        panic!("Command did not terminate within {} cycles", max_cycles);
    }

    #[test]
    fn test_zero_command_on_normal_completion() {
        let (mut ds, mut hw) = fixture();

        ds.cmd_seq
            .schedule(Box::new(DriveDistance::new(-0.5, 0.1)))
            .unwrap();

        let state = run_until_terminal(&mut ds, &mut hw, 50_000);
        assert_eq!(state, CmdState::Finished);
        assert_eq!(hw.last_command(), NormalizedCommand::ZERO);
    }

    #[test]
    fn test_zero_command_on_interruption() {
        let (mut ds, mut hw) = fixture();

        ds.cmd_seq
            .schedule(Box::new(DriveDistance::new(-0.5, 10.0)))
            .unwrap();

        // Let the command run and command motion
        for _ in 0..10 {
            cycle(&mut ds, &mut hw).unwrap();
            hw.step(CYCLE_PERIOD_S);
        }
        assert_ne!(hw.last_command(), NormalizedCommand::ZERO);

        ds.cmd_seq.cancel();
        cycle(&mut ds, &mut hw).unwrap();

        assert_eq!(ds.last_cmd_state, Some(CmdState::Interrupted));
        assert_eq!(hw.last_command(), NormalizedCommand::ZERO);
    }

    #[test]
    fn test_follower_demand_applies_when_idle() {
        let (mut ds, mut hw) = fixture();

        ds.set_desired_body_speeds(BodySpeeds {
            forward_ms: 0.2,
            angular_rads: 0.0,
        });
        cycle(&mut ds, &mut hw).unwrap();

        let cmd = hw.last_command();
        assert!(cmd.left > 0.0);
        assert!((cmd.left - cmd.right).abs() < 1e-12);

        // The demand is consumed; the next cycle commands a stop
        cycle(&mut ds, &mut hw).unwrap();
        assert_eq!(hw.last_command(), NormalizedCommand::ZERO);
    }

    #[test]
    fn test_patrol_returns_to_start() {
        let (mut ds, mut hw) = fixture();

        let routine = ds.cmd_seq.build_patrol();
        ds.cmd_seq.schedule(Box::new(routine)).unwrap();

        let state = run_until_terminal(&mut ds, &mut hw, 100_000);
        assert_eq!(state, CmdState::Finished);

        // The out-and-back patrol ends within epsilon of its start, with its
        // original orientation
        let pose = ds.pose();
        assert!(pose.position_m.x.abs() < 0.02, "x = {}", pose.position_m.x);
        assert!(pose.position_m.y.abs() < 0.02, "y = {}", pose.position_m.y);
        assert!(
            util::maths::ang_dist(pose.heading_rad, 0.0).abs() < 0.02,
            "heading = {}",
            pose.heading_rad
        );

        // In a noiseless simulation the odometry tracks the true pose
        let true_pose = hw.true_pose();
        assert!((pose.position_m.x - true_pose.position_m.x).abs() < 1e-3);
        assert!((pose.position_m.y - true_pose.position_m.y).abs() < 1e-3);

        // The patrol swings through a net 2 pi of heading and back
        assert!(pose.heading_rad.abs() < PI);
    }

    #[test]
    fn test_reset_pose_discontinuity_only() {
        let (mut ds, mut hw) = fixture();

        // Drive somewhere
        for _ in 0..100 {
            ds.set_desired_body_speeds(BodySpeeds {
                forward_ms: 0.5,
                angular_rads: 0.0,
            });
            cycle(&mut ds, &mut hw).unwrap();
            hw.step(CYCLE_PERIOD_S);
        }
        assert!(ds.pose().position_m.x > 0.0);

        // Reset and confirm a zero-delta cycle leaves the pose unchanged
        let target = Pose::new(1.0, 2.0, 0.5);
        reset_pose(&mut ds, &mut hw, target);
        assert_eq!(ds.pose(), target);

        cycle(&mut ds, &mut hw).unwrap();
        assert_eq!(ds.pose(), target);
    }
}
