//! Autonomous routine builders

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CommandGroup, DriveDistance, Params, TurnAngle};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PI: f64 = std::f64::consts::PI;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the out-and-back patrol routine.
///
/// Drives backward a fixed distance, rotates 180 degrees, drives backward
/// the same distance again, then rotates 180 degrees the opposite way,
/// returning the bot to its start with its original orientation. When
/// `mirror_routine` is set the turn directions are negated.
pub fn patrol(params: &Params) -> CommandGroup {
    let turn_dir = if params.mirror_routine { 1.0 } else { -1.0 };

    CommandGroup::new()
        .add(Box::new(DriveDistance::new(
            params.drive_speed_ms,
            params.leg_distance_m,
        )))
        .add(Box::new(TurnAngle::new(turn_dir * params.turn_rate_rads, PI)))
        .add(Box::new(DriveDistance::new(
            params.drive_speed_ms,
            params.leg_distance_m,
        )))
        .add(Box::new(TurnAngle::new(
            -turn_dir * params.turn_rate_rads,
            PI,
        )))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd_seq::{CmdCtx, Command};
    use crate::hw::SensorSnapshot;
    use crate::odom::Pose;

    fn test_params(mirror: bool) -> Params {
        Params {
            drive_speed_ms: -0.5,
            leg_distance_m: 0.25,
            turn_rate_rads: 2.0,
            mirror_routine: mirror,
        }
    }

    /// Drive the group up to its first turn and return the turn's angular
    /// demand.
    fn first_turn_rate(mut group: CommandGroup) -> f64 {
        let pose = Pose::default();

        let start = SensorSnapshot::default();
        group.initialize(&CmdCtx {
            pose: &pose,
            snapshot: &start,
        });

        // Enough backward travel to finish the first drive leg; its
        // successor (the first turn) initialises in the same cycle
        let done = SensorSnapshot {
            left_dist_m: -0.25,
            right_dist_m: -0.25,
            heading_rad: 0.0,
        };
        group.execute(&CmdCtx {
            pose: &pose,
            snapshot: &done,
        });

        let demand = group.execute(&CmdCtx {
            pose: &pose,
            snapshot: &done,
        });
        demand.angular_rads
    }

    #[test]
    fn test_patrol_shape() {
        let group = patrol(&test_params(false));
        assert_eq!(group.len(), 4);
    }

    #[test]
    fn test_mirror_negates_turns() {
        let rate = first_turn_rate(patrol(&test_params(false)));
        let mirrored_rate = first_turn_rate(patrol(&test_params(true)));

        assert!(rate < 0.0);
        assert!((mirrored_rate + rate).abs() < 1e-12);
    }
}
