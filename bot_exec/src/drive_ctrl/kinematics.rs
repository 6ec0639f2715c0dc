//! Differential drive kinematics
//!
//! Bidirectional conversion between body-frame speeds and per-wheel linear
//! speeds. The two conversions are exact algebraic inverses of each other, no
//! clamping is performed here - saturation is the command mapper's job.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Body-frame velocity of the bot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySpeeds {
    /// Forward speed along the bot's own X axis.
    ///
    /// Units: meters/second
    pub forward_ms: f64,

    /// Counter-clockwise angular rate about the bot's centre.
    ///
    /// Units: radians/second
    pub angular_rads: f64,
}

/// Linear speed of each wheel's contact point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelSpeeds {
    /// Units: meters/second
    pub left_ms: f64,

    /// Units: meters/second
    pub right_ms: f64,
}

/// Differential drive kinematic model.
#[derive(Clone, Copy, Debug, Default)]
pub struct Kinematics {
    track_width_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BodySpeeds {
    /// The zero (stopped) demand.
    pub const ZERO: BodySpeeds = BodySpeeds {
        forward_ms: 0.0,
        angular_rads: 0.0,
    };
}

impl Kinematics {
    /// Create a new kinematic model.
    ///
    /// The track width must have been validated as positive by the params
    /// check before this is called.
    pub fn new(track_width_m: f64) -> Self {
        Self { track_width_m }
    }

    /// Convert a body-frame speed demand into per-wheel linear speeds.
    pub fn to_wheel_speeds(&self, body: &BodySpeeds) -> WheelSpeeds {
        let half_track = 0.5 * self.track_width_m;

        WheelSpeeds {
            left_ms: body.forward_ms - body.angular_rads * half_track,
            right_ms: body.forward_ms + body.angular_rads * half_track,
        }
    }

    /// Convert measured per-wheel linear speeds into body-frame speeds.
    pub fn to_body_speeds(&self, wheels: &WheelSpeeds) -> BodySpeeds {
        BodySpeeds {
            forward_ms: 0.5 * (wheels.left_ms + wheels.right_ms),
            angular_rads: (wheels.right_ms - wheels.left_ms) / self.track_width_m,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TRACK_WIDTH_M: f64 = 0.141;

    #[test]
    fn test_round_trip() {
        let kin = Kinematics::new(TRACK_WIDTH_M);

        let cases = [
            BodySpeeds {
                forward_ms: 0.0,
                angular_rads: 0.0,
            },
            BodySpeeds {
                forward_ms: 0.5,
                angular_rads: 0.0,
            },
            BodySpeeds {
                forward_ms: 0.0,
                angular_rads: 3.0,
            },
            BodySpeeds {
                forward_ms: -0.25,
                angular_rads: -1.5,
            },
        ];

        for body in cases.iter() {
            let back = kin.to_body_speeds(&kin.to_wheel_speeds(body));
            assert!((back.forward_ms - body.forward_ms).abs() < 1e-12);
            assert!((back.angular_rads - body.angular_rads).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let kin = Kinematics::new(TRACK_WIDTH_M);

        let wheels = kin.to_wheel_speeds(&BodySpeeds {
            forward_ms: 0.0,
            angular_rads: 2.0,
        });

        // A positive (CCW) rate drives the right wheel forward and the left
        // wheel backward by the same amount
        assert!((wheels.right_ms + wheels.left_ms).abs() < 1e-12);
        assert!(wheels.right_ms > 0.0);
    }
}
