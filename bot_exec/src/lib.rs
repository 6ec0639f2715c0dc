//! # Bot library.
//!
//! This library allows other crates in the workspace (and the executable's
//! tests) to access items defined inside the bot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command sequencing module - executes primitive maneuvers and ordered groups of them
pub mod cmd_seq;

/// Global per-cycle data store for the executable
pub mod data_store;

/// Drive control module - converts body speed demands into individual wheel commands
pub mod drive_ctrl;

/// Per-cycle execution - the fixed-tick control cycle shared by the binary and the tests
pub mod exec;

/// Hardware boundary - drivetrain sensor/actuator access and the kinematic simulator
pub mod hw;

/// Odometry module - provides the bot with an idea of where it is in the field
pub mod odom;
