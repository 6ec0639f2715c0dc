//! Simulated drivetrain hardware
//!
//! A noiseless kinematic simulation of the differential drivetrain. Wheels
//! respond to the written duty factor with a speed proportional to the
//! no-load maximum, with no motor dynamics or slip.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{DriveHw, HwReadings, SensorSnapshot};
use crate::drive_ctrl::{NormalizedCommand, WheelSpeeds};
use crate::odom::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated drivetrain state.
#[derive(Debug)]
pub struct SimDriveHw {
    track_width_m: f64,
    wheel_max_speed_ms: f64,

    /// True pose in the field frame, the simulation's ground truth.
    true_pose: Pose,

    /// Cumulative wheel travel since the last encoder reset.
    left_dist_m: f64,
    right_dist_m: f64,

    /// Accumulated heading since the last heading reset.
    heading_rad: f64,

    /// Wheel rates realised over the last step.
    wheel_rates: WheelSpeeds,

    /// The last duty factor pair written by the controller.
    duty: NormalizedCommand,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDriveHw {
    /// Create a new simulated drivetrain at the field origin.
    pub fn new(track_width_m: f64, wheel_max_speed_ms: f64) -> Self {
        Self {
            track_width_m,
            wheel_max_speed_ms,
            true_pose: Pose::default(),
            left_dist_m: 0.0,
            right_dist_m: 0.0,
            heading_rad: 0.0,
            wheel_rates: WheelSpeeds::default(),
            duty: NormalizedCommand::ZERO,
        }
    }

    /// Advance the simulation by one control period.
    pub fn step(&mut self, dt_s: f64) {
        let left_ms = self.duty.left * self.wheel_max_speed_ms;
        let right_ms = self.duty.right * self.wheel_max_speed_ms;

        let fwd_ms = 0.5 * (left_ms + right_ms);
        let omega_rads = (right_ms - left_ms) / self.track_width_m;

        // Integrate the true pose along the mid-step heading
        let theta_avg_rad = self.true_pose.heading_rad + 0.5 * omega_rads * dt_s;
        self.true_pose.position_m.x += fwd_ms * dt_s * theta_avg_rad.cos();
        self.true_pose.position_m.y += fwd_ms * dt_s * theta_avg_rad.sin();
        self.true_pose.heading_rad += omega_rads * dt_s;

        self.left_dist_m += left_ms * dt_s;
        self.right_dist_m += right_ms * dt_s;
        self.heading_rad += omega_rads * dt_s;

        self.wheel_rates = WheelSpeeds { left_ms, right_ms };
    }

    /// Get the simulation's true pose, for comparison against odometry.
    pub fn true_pose(&self) -> Pose {
        self.true_pose
    }

    /// Get the last command written by the controller.
    pub fn last_command(&self) -> NormalizedCommand {
        self.duty
    }
}

impl DriveHw for SimDriveHw {
    fn read(&self) -> HwReadings {
        HwReadings {
            snapshot: SensorSnapshot {
                left_dist_m: self.left_dist_m,
                right_dist_m: self.right_dist_m,
                heading_rad: self.heading_rad,
            },
            wheel_rates: self.wheel_rates,
        }
    }

    fn reset_encoders(&mut self) {
        self.left_dist_m = 0.0;
        self.right_dist_m = 0.0;
    }

    fn reset_heading(&mut self) {
        self.heading_rad = 0.0;
    }

    fn write_command(&mut self, cmd: &NormalizedCommand) {
        self.duty = *cmd;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_travel() {
        let mut sim = SimDriveHw::new(0.141, 0.5498);

        sim.write_command(&NormalizedCommand {
            left: 0.5,
            right: 0.5,
        });
        for _ in 0..100 {
            sim.step(0.02);
        }

        let readings = sim.read();
        let expected = 0.5 * 0.5498 * 2.0;
        assert!((readings.snapshot.left_dist_m - expected).abs() < 1e-9);
        assert!((readings.snapshot.right_dist_m - expected).abs() < 1e-9);
        assert!(readings.snapshot.heading_rad.abs() < 1e-9);
        assert!((sim.true_pose().position_m.x - expected).abs() < 1e-9);
    }

    #[test]
    fn test_point_turn() {
        let mut sim = SimDriveHw::new(0.141, 0.5498);

        sim.write_command(&NormalizedCommand {
            left: -0.1,
            right: 0.1,
        });
        sim.step(0.02);

        let readings = sim.read();
        assert!(readings.snapshot.heading_rad > 0.0);
        // No net forward travel during a point turn
        assert!(
            (readings.snapshot.left_dist_m + readings.snapshot.right_dist_m).abs() < 1e-12
        );
    }

    #[test]
    fn test_resets() {
        let mut sim = SimDriveHw::new(0.141, 0.5498);

        sim.write_command(&NormalizedCommand {
            left: 0.2,
            right: 0.4,
        });
        for _ in 0..10 {
            sim.step(0.02);
        }

        sim.reset_encoders();
        sim.reset_heading();

        let readings = sim.read();
        assert_eq!(readings.snapshot.left_dist_m, 0.0);
        assert_eq!(readings.snapshot.right_dist_m, 0.0);
        assert_eq!(readings.snapshot.heading_rad, 0.0);

        // The true pose is unaffected by sensor resets
        assert!(sim.true_pose().position_m.x > 0.0);
    }
}
