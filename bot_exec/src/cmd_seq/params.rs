//! Parameters structure for CmdSeq

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for command sequencing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Params {
    // ---- PATROL ROUTINE ----
    /// Forward speed commanded during patrol drive legs, signed. The
    /// reference routine drives backwards.
    ///
    /// Units: meters/second
    pub drive_speed_ms: f64,

    /// Length of each patrol drive leg.
    ///
    /// Units: meters
    pub leg_distance_m: f64,

    /// Angular rate magnitude for patrol turns.
    ///
    /// Units: radians/second
    pub turn_rate_rads: f64,

    /// Mirror the routine's turn directions, e.g. for an opposing starting
    /// position.
    pub mirror_routine: bool,
}
