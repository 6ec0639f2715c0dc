//! Drive control module
//!
//! Converts body-frame speed demands into saturated, normalised per-wheel
//! motor commands. The mapping is deliberately open loop: demands are scaled
//! against the theoretical no-load wheel speed, attenuated by a fixed motor
//! gain, and clamped, with no feedback correction.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd_map;
mod kinematics;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd_map::*;
pub use kinematics::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Failed to load DriveCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid geometry parameter {0}: {1} (must be greater than zero)")]
    InvalidParam(&'static str, f64),
}
