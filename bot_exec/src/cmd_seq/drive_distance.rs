//! Distance drive maneuver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CmdCtx, Command, ResourceSet};
use crate::drive_ctrl::BodySpeeds;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drive straight at a constant speed until the target distance is covered.
///
/// The sign of the speed sets the direction of travel; the target distance is
/// always a magnitude. Progress is measured as the mean wheel travel since
/// the maneuver's own start, not since session start.
#[derive(Debug)]
pub struct DriveDistance {
    /// Commanded forward speed, signed.
    ///
    /// Units: meters/second
    speed_ms: f64,

    /// Target distance magnitude.
    ///
    /// Units: meters
    distance_m: f64,

    /// Encoder distances latched at initialize, the maneuver's progress
    /// reference.
    start_dists_m: Option<(f64, f64)>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDistance {
    pub fn new(speed_ms: f64, distance_m: f64) -> Self {
        Self {
            speed_ms,
            distance_m: distance_m.abs(),
            start_dists_m: None,
        }
    }
}

impl Command for DriveDistance {
    fn requirements(&self) -> ResourceSet {
        ResourceSet::MOTORS.union(ResourceSet::ENCODERS)
    }

    fn initialize(&mut self, ctx: &CmdCtx) -> BodySpeeds {
        self.start_dists_m = Some((ctx.snapshot.left_dist_m, ctx.snapshot.right_dist_m));

        BodySpeeds::ZERO
    }

    fn execute(&mut self, _ctx: &CmdCtx) -> BodySpeeds {
        BodySpeeds {
            forward_ms: self.speed_ms,
            angular_rads: 0.0,
        }
    }

    fn is_finished(&self, ctx: &CmdCtx) -> bool {
        let (start_left_m, start_right_m) = match self.start_dists_m {
            Some(s) => s,
            None => return false,
        };

        let travelled_m = 0.5
            * ((ctx.snapshot.left_dist_m - start_left_m)
                + (ctx.snapshot.right_dist_m - start_right_m));

        travelled_m.abs() >= self.distance_m
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::hw::SensorSnapshot;
    use crate::odom::Pose;

    fn ctx_at<'a>(pose: &'a Pose, snapshot: &'a SensorSnapshot) -> CmdCtx<'a> {
        CmdCtx { pose, snapshot }
    }

    #[test]
    fn test_finish_boundary() {
        let pose = Pose::default();
        let mut cmd = DriveDistance::new(-0.5, 0.25);

        // Initialize against a non-zero session reference: progress must be
        // measured from the maneuver's own start
        let start = SensorSnapshot {
            left_dist_m: 3.0,
            right_dist_m: 3.0,
            heading_rad: 0.0,
        };
        cmd.initialize(&ctx_at(&pose, &start));

        // Travel accumulates 0.05 m per cycle (backwards)
        for i in 1..=5 {
            let snapshot = SensorSnapshot {
                left_dist_m: 3.0 - 0.05 * i as f64,
                right_dist_m: 3.0 - 0.05 * i as f64,
                heading_rad: 0.0,
            };
            let ctx = ctx_at(&pose, &snapshot);

            cmd.execute(&ctx);
            if i < 5 {
                // Not finished at cumulative 0.20
                assert!(!cmd.is_finished(&ctx), "finished early at {} cycles", i);
            } else {
                // Finished at cumulative 0.25
                assert!(cmd.is_finished(&ctx));
            }
        }
    }

    #[test]
    fn test_execute_demand_and_end_zero() {
        let pose = Pose::default();
        let snapshot = SensorSnapshot::default();
        let ctx = ctx_at(&pose, &snapshot);

        let mut cmd = DriveDistance::new(-0.5, 0.25);
        assert_eq!(cmd.initialize(&ctx), BodySpeeds::ZERO);

        let demand = cmd.execute(&ctx);
        assert_eq!(demand.forward_ms, -0.5);
        assert_eq!(demand.angular_rads, 0.0);

        assert_eq!(cmd.end(false), BodySpeeds::ZERO);
        assert_eq!(cmd.end(true), BodySpeeds::ZERO);
    }
}
