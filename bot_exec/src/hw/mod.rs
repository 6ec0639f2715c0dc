//! Hardware boundary
//!
//! The [`DriveHw`] trait is the drivetrain's hardware surface: cumulative
//! encoder distances, instantaneous wheel rates, the absolute heading angle,
//! the matching reset operations, and the single normalised motor command
//! write. The core assumes reads always return a value and performs no
//! validation beyond using it as given.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sim;

pub use sim::SimDriveHw;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::drive_ctrl::{NormalizedCommand, WheelSpeeds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One cycle's raw drivetrain sensor readings.
///
/// Distances and heading are cumulative since their last reset and monotonic
/// within a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Cumulative left wheel travel.
    ///
    /// Units: meters
    pub left_dist_m: f64,

    /// Cumulative right wheel travel.
    ///
    /// Units: meters
    pub right_dist_m: f64,

    /// Absolute heading angle, counter-clockwise positive. Continuous, not
    /// wrapped.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Everything read from the drivetrain hardware in one cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct HwReadings {
    /// Cumulative distance/heading snapshot, consumed by odometry.
    pub snapshot: SensorSnapshot,

    /// Instantaneous wheel rates, consumed for actual body speed derivation.
    pub wheel_rates: WheelSpeeds,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Drivetrain hardware access.
pub trait DriveHw {
    /// Read all drivetrain sensors for this cycle.
    fn read(&self) -> HwReadings;

    /// Zero the cumulative encoder distances.
    fn reset_encoders(&mut self);

    /// Zero the heading sensor reference.
    fn reset_heading(&mut self);

    /// Write the normalised motor command pair.
    fn write_command(&mut self, cmd: &NormalizedCommand);
}
