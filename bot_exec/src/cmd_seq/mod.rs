//! # Command sequencing module
//!
//! This module implements the [`CmdSeq`] state machine, which executes
//! primitive autonomous maneuvers and ordered groups of them against the
//! drivetrain. Every command steps through the same lifecycle:
//!
//! `Idle -> Running -> {Finished, Interrupted}`
//!
//! Commands are cooperative: a command that needs to wait simply reports
//! not-finished and is stepped again on the next control cycle. Suspension
//! only ever happens at cycle boundaries, never mid-cycle.
//!
//! On both normal completion and interruption a command's `end` always
//! demands zero body speed, so the drivetrain never keeps moving after a
//! command exits by any path.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod drive_distance;
mod group;
mod params;
mod routine;
mod turn_angle;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
pub use drive_distance::DriveDistance;
pub use group::CommandGroup;
pub use params::Params;
pub use routine::patrol;
pub use turn_angle::TurnAngle;

use crate::drive_ctrl::BodySpeeds;
use crate::hw::SensorSnapshot;
use crate::odom::Pose;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur in the command sequencer.
#[derive(Debug, thiserror::Error)]
pub enum CmdSeqError {
    #[error("Failed to load CmdSeq parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error(
        "Command requiring {0:?} conflicts with the running command's {1:?} - \
         interrupt the running command first"
    )]
    ResourceConflict(ResourceSet, ResourceSet),

    #[error("A command is already scheduled")]
    AlreadyScheduled,
}

/// Lifecycle state of a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CmdState {
    /// Scheduled but not yet initialised.
    Idle,
    /// Initialised and being stepped each cycle.
    Running,
    /// Reached its finish predicate; `end(false)` has run.
    Finished,
    /// Stopped externally; `end(true)` has run.
    Interrupted,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Set of drivetrain hardware resources a command requires exclusively.
///
/// The sequencer refuses to admit a command whose set intersects the running
/// command's set, a simple set-intersection test.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ResourceSet(u8);

/// Read-only drivetrain state available to commands each cycle.
///
/// Commands never mutate odometry state directly - they read the pose and
/// snapshot here and return demanded speeds from their step functions.
pub struct CmdCtx<'a> {
    /// Pose estimate, updated by odometry earlier in this same cycle.
    pub pose: &'a Pose,

    /// This cycle's cumulative sensor snapshot.
    pub snapshot: &'a SensorSnapshot,
}

/// Command sequencer state.
#[derive(Default)]
pub struct CmdSeq {
    params: Params,

    /// The scheduled command, if any. Terminal commands are dequeued on the
    /// cycle they terminate.
    active: Option<ActiveCmd>,

    /// Set by [`CmdSeq::cancel`]; the active command is interrupted at the
    /// start of the next step, before its `execute` runs.
    cancel_pending: bool,
}

struct ActiveCmd {
    cmd: Box<dyn Command>,
    state: CmdState,
    requirements: ResourceSet,
}

/// Output of one sequencer step.
pub struct StepOutput {
    /// Body speed demand for this cycle, or `None` if no command is active.
    pub speeds: Option<BodySpeeds>,

    /// State of the stepped command after this cycle, or `None` if no command
    /// is active.
    pub state: Option<CmdState>,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A primitive maneuver executed by the sequencer.
///
/// Step functions return the body speed demand for the cycle they run in.
pub trait Command {
    /// The set of hardware resources this command requires exclusively.
    fn requirements(&self) -> ResourceSet;

    /// Called once on the Idle -> Running transition. Rebases the command's
    /// progress reference on the current drivetrain state and demands zero
    /// speed.
    fn initialize(&mut self, ctx: &CmdCtx) -> BodySpeeds;

    /// Called on every Running cycle before the finish check.
    fn execute(&mut self, ctx: &CmdCtx) -> BodySpeeds;

    /// Finish predicate, checked after `execute` each Running cycle. A total
    /// function over the drivetrain state - commands wait by returning false.
    fn is_finished(&self, ctx: &CmdCtx) -> bool;

    /// Called exactly once when the command stops, for any reason. Always
    /// demands zero body speed.
    fn end(&mut self, interrupted: bool) -> BodySpeeds {
        let _ = interrupted;
        BodySpeeds::ZERO
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ResourceSet {
    /// The empty set.
    pub const NONE: ResourceSet = ResourceSet(0);

    /// The drive motors.
    pub const MOTORS: ResourceSet = ResourceSet(0b001);

    /// The wheel encoders.
    pub const ENCODERS: ResourceSet = ResourceSet(0b010);

    /// The heading sensor.
    pub const HEADING_SENSOR: ResourceSet = ResourceSet(0b100);

    /// The full drivetrain: motors, encoders and heading sensor.
    pub const DRIVETRAIN: ResourceSet =
        ResourceSet(Self::MOTORS.0 | Self::ENCODERS.0 | Self::HEADING_SENSOR.0);

    /// Union of two sets.
    pub const fn union(self, other: ResourceSet) -> ResourceSet {
        ResourceSet(self.0 | other.0)
    }

    /// True if the two sets share any resource.
    pub fn intersects(&self, other: &ResourceSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl CmdSeq {
    /// Initialise the sequencer.
    ///
    /// Expected init data is the path to the parameter file.
    pub fn init(&mut self, params_path: &'static str) -> Result<(), CmdSeqError> {
        self.params = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(CmdSeqError::ParamLoadError(e)),
        };

        Ok(())
    }

    /// Build a sequencer directly from a parameter struct.
    ///
    /// Used by tests which have no parameter file.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Get the sequencer parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// True if the active autonomous routine should be mirrored, e.g. for an
    /// opposing starting position.
    pub fn is_routine_mirrored(&self) -> bool {
        self.params.mirror_routine
    }

    /// Build the patrol routine from the sequencer parameters.
    pub fn build_patrol(&self) -> CommandGroup {
        patrol(&self.params)
    }

    /// Schedule a command for execution.
    ///
    /// Admission is refused if the command's resource set intersects the
    /// running command's set - the caller must interrupt the running command
    /// first.
    pub fn schedule(&mut self, cmd: Box<dyn Command>) -> Result<(), CmdSeqError> {
        let requirements = cmd.requirements();

        if let Some(ref active) = self.active {
            if requirements.intersects(&active.requirements) {
                return Err(CmdSeqError::ResourceConflict(
                    requirements,
                    active.requirements,
                ));
            }

            // A single execution slot: even a disjoint command cannot co-run
            return Err(CmdSeqError::AlreadyScheduled);
        }

        info!("Command scheduled, requirements: {:?}", requirements);

        self.active = Some(ActiveCmd {
            cmd,
            state: CmdState::Idle,
            requirements,
        });

        Ok(())
    }

    /// Request interruption of the active command.
    ///
    /// Takes effect at the start of the next step, before the command's
    /// `execute` runs. The command's `end(true)` always runs before it is
    /// discarded.
    pub fn cancel(&mut self) {
        if self.active.is_some() {
            self.cancel_pending = true;
        } else {
            warn!("Cancel requested but no command is scheduled");
        }
    }

    /// True if a command is scheduled.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Advance the active command by exactly one step.
    pub fn step(&mut self, ctx: &CmdCtx) -> StepOutput {
        let mut active = match self.active.take() {
            Some(a) => a,
            None => {
                self.cancel_pending = false;
                return StepOutput::none();
            }
        };

        // Interruption applies before this cycle's execute
        if self.cancel_pending {
            self.cancel_pending = false;

            let speeds = active.cmd.end(true);
            info!("Command interrupted");

            // Terminal - the command is dropped here
            return StepOutput {
                speeds: Some(speeds),
                state: Some(CmdState::Interrupted),
            };
        }

        match active.state {
            CmdState::Idle => {
                let speeds = active.cmd.initialize(ctx);
                active.state = CmdState::Running;
                self.active = Some(active);

                StepOutput {
                    speeds: Some(speeds),
                    state: Some(CmdState::Running),
                }
            }
            CmdState::Running => {
                let mut speeds = active.cmd.execute(ctx);

                if active.cmd.is_finished(ctx) {
                    // end overrides this cycle's demand with zero
                    speeds = active.cmd.end(false);
                    info!("Command finished");

                    StepOutput {
                        speeds: Some(speeds),
                        state: Some(CmdState::Finished),
                    }
                } else {
                    self.active = Some(active);

                    StepOutput {
                        speeds: Some(speeds),
                        state: Some(CmdState::Running),
                    }
                }
            }
            // Terminal commands are dequeued on the cycle they terminate and
            // are never stepped again
            CmdState::Finished | CmdState::Interrupted => StepOutput::none(),
        }
    }
}

impl StepOutput {
    pub fn none() -> Self {
        Self {
            speeds: None,
            state: None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    struct NeverFinish;

    impl Command for NeverFinish {
        fn requirements(&self) -> ResourceSet {
            ResourceSet::DRIVETRAIN
        }

        fn initialize(&mut self, _ctx: &CmdCtx) -> BodySpeeds {
            BodySpeeds::ZERO
        }

        fn execute(&mut self, _ctx: &CmdCtx) -> BodySpeeds {
            BodySpeeds {
                forward_ms: 0.1,
                angular_rads: 0.0,
            }
        }

        fn is_finished(&self, _ctx: &CmdCtx) -> bool {
            false
        }
    }

    fn ctx_fixture() -> (Pose, SensorSnapshot) {
        (Pose::default(), SensorSnapshot::default())
    }

    #[test]
    fn test_resource_conflict_refused() {
        let mut seq = CmdSeq::with_params(Params::default());

        seq.schedule(Box::new(NeverFinish)).unwrap();

        match seq.schedule(Box::new(NeverFinish)) {
            Err(CmdSeqError::ResourceConflict(_, _)) => (),
            other => panic!("Expected ResourceConflict, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_cancel_runs_end_before_execute() {
        let mut seq = CmdSeq::with_params(Params::default());
        let (pose, snapshot) = ctx_fixture();
        let ctx = CmdCtx {
            pose: &pose,
            snapshot: &snapshot,
        };

        seq.schedule(Box::new(NeverFinish)).unwrap();
        seq.step(&ctx);
        assert_eq!(seq.step(&ctx).state, Some(CmdState::Running));

        seq.cancel();
        let out = seq.step(&ctx);

        assert_eq!(out.state, Some(CmdState::Interrupted));
        // The interruption demand is the zero-speed end demand, not execute's
        assert_eq!(out.speeds, Some(BodySpeeds::ZERO));
        assert!(!seq.is_active());
    }

    #[test]
    fn test_resource_set_ops() {
        assert!(ResourceSet::DRIVETRAIN.intersects(&ResourceSet::MOTORS));
        assert!(!ResourceSet::MOTORS.intersects(&ResourceSet::ENCODERS));
        assert!(ResourceSet::NONE.is_empty());
        assert_eq!(
            ResourceSet::MOTORS
                .union(ResourceSet::ENCODERS)
                .union(ResourceSet::HEADING_SENSOR),
            ResourceSet::DRIVETRAIN
        );
    }
}
