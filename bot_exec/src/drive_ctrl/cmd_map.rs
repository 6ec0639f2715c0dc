//! Wheel command mapping
//!
//! Maps wheel speed demands into normalised motor commands. The theoretical
//! maximum wheel speed is a no-load figure, not an achievable continuous
//! speed, so the raw factor is attenuated by the motor gain parameter before
//! being clamped into the normalised range.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::WheelSpeeds;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Magnitude limit of a normalised motor command.
const CMD_FACTOR_MAX: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Normalised motor command pair, each side in [-1, +1].
///
/// This is the only value ever written towards the motor hardware.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct NormalizedCommand {
    pub left: f64,
    pub right: f64,
}

/// Maps wheel speed demands into [`NormalizedCommand`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct CmdMap {
    wheel_max_speed_ms: f64,
    motor_gain: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl NormalizedCommand {
    /// The zero (stopped) command.
    pub const ZERO: NormalizedCommand = NormalizedCommand {
        left: 0.0,
        right: 0.0,
    };
}

impl CmdMap {
    /// Create a new command mapper.
    ///
    /// The maximum wheel speed must have been validated as positive by the
    /// params check before this is called.
    pub fn new(wheel_max_speed_ms: f64, motor_gain: f64) -> Self {
        Self {
            wheel_max_speed_ms,
            motor_gain,
        }
    }

    /// Map a wheel speed demand into a saturated normalised command.
    ///
    /// Returns the command and a pair of flags indicating whether the
    /// left/right sides were saturated.
    pub fn map(&self, wheels: &WheelSpeeds) -> (NormalizedCommand, [bool; 2]) {
        let left_factor = (wheels.left_ms / self.wheel_max_speed_ms) * self.motor_gain;
        let right_factor = (wheels.right_ms / self.wheel_max_speed_ms) * self.motor_gain;

        let cmd = NormalizedCommand {
            left: clamp(&left_factor, &-CMD_FACTOR_MAX, &CMD_FACTOR_MAX),
            right: clamp(&right_factor, &-CMD_FACTOR_MAX, &CMD_FACTOR_MAX),
        };

        let saturated = [
            left_factor.abs() > CMD_FACTOR_MAX,
            right_factor.abs() > CMD_FACTOR_MAX,
        ];

        (cmd, saturated)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_saturation() {
        let map = CmdMap::new(0.5498, 0.066);

        // Arbitrarily large demands must never exceed the normalised range
        for speed in [1e3, 1e6, 1e9].iter() {
            let (cmd, saturated) = map.map(&WheelSpeeds {
                left_ms: *speed,
                right_ms: -*speed,
            });

            assert_eq!(cmd.left, 1.0);
            assert_eq!(cmd.right, -1.0);
            assert!(saturated[0]);
            assert!(saturated[1]);
        }
    }

    #[test]
    fn test_gain_attenuation() {
        let map = CmdMap::new(0.5498, 0.066);

        let (cmd, saturated) = map.map(&WheelSpeeds {
            left_ms: 0.5,
            right_ms: 0.5,
        });

        let expected = (0.5 / 0.5498) * 0.066;
        assert!((cmd.left - expected).abs() < 1e-12);
        assert!((cmd.right - expected).abs() < 1e-12);
        assert!(!saturated[0]);
        assert!(!saturated[1]);
    }
}
