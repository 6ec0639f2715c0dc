//! Rotate-by-angle maneuver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CmdCtx, Command, ResourceSet};
use crate::drive_ctrl::BodySpeeds;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turn in place at a constant angular rate until the target angle is
/// covered.
///
/// The sign of the rate sets the turn direction; the target angle is always a
/// magnitude. Progress is the accumulated heading change since the maneuver's
/// own start.
#[derive(Debug)]
pub struct TurnAngle {
    /// Commanded angular rate, signed, counter-clockwise positive.
    ///
    /// Units: radians/second
    rate_rads: f64,

    /// Target angle magnitude.
    ///
    /// Units: radians
    angle_rad: f64,

    /// Heading latched at initialize, the maneuver's progress reference.
    start_heading_rad: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TurnAngle {
    pub fn new(rate_rads: f64, angle_rad: f64) -> Self {
        Self {
            rate_rads,
            angle_rad: angle_rad.abs(),
            start_heading_rad: None,
        }
    }
}

impl Command for TurnAngle {
    fn requirements(&self) -> ResourceSet {
        ResourceSet::MOTORS.union(ResourceSet::HEADING_SENSOR)
    }

    fn initialize(&mut self, ctx: &CmdCtx) -> BodySpeeds {
        self.start_heading_rad = Some(ctx.pose.heading_rad);

        BodySpeeds::ZERO
    }

    fn execute(&mut self, _ctx: &CmdCtx) -> BodySpeeds {
        BodySpeeds {
            forward_ms: 0.0,
            angular_rads: self.rate_rads,
        }
    }

    fn is_finished(&self, ctx: &CmdCtx) -> bool {
        let start_rad = match self.start_heading_rad {
            Some(s) => s,
            None => return false,
        };

        // Heading is continuous so no wrap handling is needed here
        (ctx.pose.heading_rad - start_rad).abs() >= self.angle_rad
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
