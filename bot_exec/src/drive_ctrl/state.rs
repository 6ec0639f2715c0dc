//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{BodySpeeds, CmdMap, Kinematics, NormalizedCommand, Params, WheelSpeeds};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
///
/// Composes the kinematic model and the wheel command mapper behind the
/// per-cycle module interface.
#[derive(Default)]
pub struct DriveCtrl {
    params: Params,

    kin: Kinematics,
    cmd_map: CmdMap,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Input data to Drive Control.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// The body speed demand to be executed, or `None` if there is no demand
    /// on this cycle. No demand commands a stop.
    pub desired_speeds: Option<BodySpeeds>,

    /// Wheel linear speeds measured by the encoders this cycle.
    pub wheel_rates: WheelSpeeds,
}

/// Output from DriveCtrl for this cycle.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct OutputData {
    /// Normalised motor command to be written to the hardware layer.
    pub cmd: NormalizedCommand,

    /// Actual body speeds, derived from the measured wheel rates. Not
    /// necessarily the demanded speeds - the command mapping is open loop.
    pub actual_speeds: BodySpeeds,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// True for a side whose command factor was clamped this cycle.
    pub cmd_saturated: [bool; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = super::DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file. Invalid geometry
    /// parameters are fatal here.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let loaded: Params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(super::DriveCtrlError::ParamLoadError(e)),
        };

        *self = Self::with_params(loaded)?;

        // Create the arch folder for drive_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("drive_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "drive_ctrl/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "drive_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Actual speeds come from the measured wheel rates, not the demand
        let actual_speeds = self.kin.to_body_speeds(&input_data.wheel_rates);

        // If there's a demand map it through kinematics and the command
        // mapper, otherwise command a stop.
        let cmd = match input_data.desired_speeds {
            Some(ref body) => {
                let wheels = self.kin.to_wheel_speeds(body);
                let (cmd, saturated) = self.cmd_map.map(&wheels);
                self.report.cmd_saturated = saturated;
                cmd
            }
            None => NormalizedCommand::ZERO,
        };

        let output = OutputData { cmd, actual_speeds };

        trace!(
            "DriveCtrl output:\n    cmd: ({:.3}, {:.3})\n    actual: {:?}",
            output.cmd.left,
            output.cmd.right,
            output.actual_speeds
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

impl DriveCtrl {
    /// Build a DriveCtrl directly from a parameter struct.
    ///
    /// Used by the init function and by tests which have no parameter file.
    pub fn with_params(params: Params) -> Result<Self, super::DriveCtrlError> {
        params.validate()?;

        Ok(Self {
            kin: Kinematics::new(params.track_width_m),
            cmd_map: CmdMap::new(params.wheel_max_speed_ms, params.motor_gain),
            params,
            ..Default::default()
        })
    }

    /// Get the module parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the kinematic model.
    pub fn kinematics(&self) -> &Kinematics {
        &self.kin
    }

    /// The hardware resources this subsystem requires exclusively.
    pub fn requirements(&self) -> crate::cmd_seq::ResourceSet {
        crate::cmd_seq::ResourceSet::DRIVETRAIN
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            track_width_m: 0.141,
            wheel_circumference_m: 0.2199,
            encoder_counts_per_rev: 1440.0,
            wheel_max_speed_ms: 0.5498,
            motor_gain: 0.066,
        }
    }

    #[test]
    fn test_no_demand_commands_stop() {
        let mut dc = DriveCtrl::with_params(test_params()).unwrap();

        let (output, _) = dc
            .proc(&InputData {
                desired_speeds: None,
                wheel_rates: WheelSpeeds {
                    left_ms: 0.1,
                    right_ms: 0.1,
                },
            })
            .unwrap();

        assert_eq!(output.cmd, NormalizedCommand::ZERO);
        // Actual speeds still reflect the measured rates
        assert!((output.actual_speeds.forward_ms - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_demand_maps_to_command() {
        let mut dc = DriveCtrl::with_params(test_params()).unwrap();

        let (output, report) = dc
            .proc(&InputData {
                desired_speeds: Some(BodySpeeds {
                    forward_ms: 0.5,
                    angular_rads: 0.0,
                }),
                wheel_rates: WheelSpeeds::default(),
            })
            .unwrap();

        let expected = (0.5 / 0.5498) * 0.066;
        assert!((output.cmd.left - expected).abs() < 1e-12);
        assert!((output.cmd.right - expected).abs() < 1e-12);
        assert!(!report.cmd_saturated[0]);
        assert!(!report.cmd_saturated[1]);
    }

    #[test]
    fn test_invalid_geometry_fatal() {
        let mut params = test_params();
        params.track_width_m = -0.1;
        assert!(DriveCtrl::with_params(params).is_err());
    }
}
