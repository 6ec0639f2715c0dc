//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::DriveCtrlError;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Drive control.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The lateral distance between the two drive wheels' contact points.
    ///
    /// Units: meters
    pub track_width_m: f64,

    /// The circumference of the drive wheels.
    ///
    /// Units: meters
    pub wheel_circumference_m: f64,

    /// The number of encoder counts per wheel revolution.
    ///
    /// Units: counts
    pub encoder_counts_per_rev: f64,

    // ---- CAPABILITIES ----
    /// Theoretical maximum wheel speed. This is a no-load figure, not an
    /// achievable continuous speed.
    ///
    /// Units: meters/second
    pub wheel_max_speed_ms: f64,

    // ---- CONTROL ----
    /// Open-loop attenuation applied to the normalised command factor. An
    /// empirical tuning value (reference: 0.066).
    pub motor_gain: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Validate the geometry invariants.
    ///
    /// Non-positive geometry would produce silent garbage output, so a
    /// violation is fatal at initialisation.
    pub fn validate(&self) -> Result<(), DriveCtrlError> {
        if self.track_width_m <= 0.0 {
            return Err(DriveCtrlError::InvalidParam(
                "track_width_m",
                self.track_width_m,
            ));
        }
        if self.wheel_max_speed_ms <= 0.0 {
            return Err(DriveCtrlError::InvalidParam(
                "wheel_max_speed_ms",
                self.wheel_max_speed_ms,
            ));
        }
        if self.wheel_circumference_m <= 0.0 {
            return Err(DriveCtrlError::InvalidParam(
                "wheel_circumference_m",
                self.wheel_circumference_m,
            ));
        }
        if self.encoder_counts_per_rev <= 0.0 {
            return Err(DriveCtrlError::InvalidParam(
                "encoder_counts_per_rev",
                self.encoder_counts_per_rev,
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn valid_params() -> Params {
        Params {
            track_width_m: 0.141,
            wheel_circumference_m: 0.2199,
            encoder_counts_per_rev: 1440.0,
            wheel_max_speed_ms: 0.5498,
            motor_gain: 0.066,
        }
    }

    #[test]
    fn test_valid_params_accepted() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn test_bad_geometry_rejected() {
        let mut params = valid_params();
        params.track_width_m = 0.0;
        assert!(params.validate().is_err());

        let mut params = valid_params();
        params.wheel_max_speed_ms = -1.0;
        assert!(params.validate().is_err());
    }
}
