//! # Odometry module
//!
//! Dead-reckons the bot's pose in the field frame from incremental encoder
//! distances. Heading is taken directly from the heading sensor's absolute
//! angle rather than being derived from the wheel distance difference -
//! angular drift from wheel slip is corrected by the dedicated sensor.
//!
//! The position integration is arc based, using the average of the previous
//! and current heading to reduce first-order integration error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::hw::SensorSnapshot;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading) of the bot in the field frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Pose {
    /// The position in the field frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading (angle to the positive field X axis). Continuous, not
    /// wrapped, matching the cumulative heading sensor.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Odometry estimator state.
///
/// Owns the last seen sensor snapshot needed to compute deltas. The pose is
/// mutated only by [`Odom::update`] during a cycle, or instantaneously
/// overwritten by [`Odom::reset`].
#[derive(Debug, Default)]
pub struct Odom {
    pose: Pose,

    /// The previous snapshot, or `None` immediately after a reset so the next
    /// update only latches its snapshot.
    last_snapshot: Option<SensorSnapshot>,

    /// Offset added to the sensor heading, set at reset so an arbitrary reset
    /// heading coexists with a zeroed heading sensor.
    heading_offset_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Odom {
    /// Get the current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Integrate a new sensor snapshot into the pose estimate.
    ///
    /// Must be called exactly once per control cycle, before any command
    /// logic reads the pose for that cycle.
    pub fn update(&mut self, snapshot: &SensorSnapshot) {
        let heading_rad = self.heading_offset_rad + snapshot.heading_rad;

        match self.last_snapshot {
            Some(ref last) => {
                let d_left_m = snapshot.left_dist_m - last.left_dist_m;
                let d_right_m = snapshot.right_dist_m - last.right_dist_m;
                let d_fwd_m = 0.5 * (d_left_m + d_right_m);

                // Average of previous and current heading reduces the
                // first-order error of straight-segment integration
                let theta_avg_rad = 0.5 * (self.pose.heading_rad + heading_rad);

                self.pose.position_m.x += d_fwd_m * theta_avg_rad.cos();
                self.pose.position_m.y += d_fwd_m * theta_avg_rad.sin();
                self.pose.heading_rad = heading_rad;
            }
            // First update after a reset only latches the snapshot
            None => {
                self.pose.heading_rad = heading_rad;
            }
        }

        self.last_snapshot = Some(*snapshot);
    }

    /// Overwrite the pose estimate.
    ///
    /// The caller must zero the hardware distance/heading references at the
    /// same time (see `exec::reset_pose`), so that the next snapshot reads
    /// zero deltas. This is the only permitted pose discontinuity.
    pub fn reset(&mut self, pose: Pose) {
        self.pose = pose;
        self.heading_offset_rad = pose.heading_rad;
        self.last_snapshot = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
