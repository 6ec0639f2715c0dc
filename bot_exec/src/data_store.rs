//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{
    cmd_seq::{CmdSeq, CmdState},
    drive_ctrl::{self, BodySpeeds, DriveCtrl},
    hw::HwReadings,
    odom::{Odom, Pose},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    // Drivetrain sensing
    /// This cycle's raw hardware readings
    pub hw_readings: HwReadings,

    // Odometry
    pub odom: Odom,

    // DriveCtrl
    pub drive_ctrl: DriveCtrl,
    pub drive_ctrl_output: drive_ctrl::OutputData,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Command sequencing
    pub cmd_seq: CmdSeq,

    /// State of the sequenced command after the last cycle, or `None` if no
    /// command was active.
    pub last_cmd_state: Option<CmdState>,

    // Path follower demand
    /// Body speed demand set by an external path follower, consumed on the
    /// next cycle if no command is running.
    pub desired_speeds: Option<BodySpeeds>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Get the current pose estimate.
    ///
    /// Updated once per cycle, strictly before any command logic runs in
    /// that cycle. Consumers see one tick of latency between physical motion
    /// and this estimate.
    pub fn pose(&self) -> Pose {
        self.odom.pose()
    }

    /// Get the actual body speeds, derived from measured wheel rates, not
    /// necessarily those demanded.
    pub fn actual_body_speeds(&self) -> BodySpeeds {
        self.drive_ctrl_output.actual_speeds
    }

    /// Set the desired body speeds for the next cycle.
    ///
    /// Ignored while a sequenced command holds the drivetrain.
    pub fn set_desired_body_speeds(&mut self, speeds: BodySpeeds) {
        self.desired_speeds = Some(speeds);
    }
}
