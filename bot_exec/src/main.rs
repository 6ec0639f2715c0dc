//! Main bot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop (fixed 20 ms period):
//!         - Drivetrain sensing
//!         - Odometry update
//!         - Command sequencing
//!         - Drive control processing
//!         - Motor command write
//!
//! The loop is single threaded and cooperative: every module performs one
//! step of processing per cycle and nothing blocks inside a cycle.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use bot_lib::{
    cmd_seq::CmdState,
    data_store::DataStore,
    exec,
    hw::SimDriveHw,
    odom::Pose,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("bot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Diffbot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.drive_ctrl
        .init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    ds.cmd_seq
        .init("cmd_seq.toml")
        .wrap_err("Failed to initialise CmdSeq")?;
    info!("CmdSeq init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATED HARDWARE ----

    let mut hw = SimDriveHw::new(
        ds.drive_ctrl.params().track_width_m,
        ds.drive_ctrl.params().wheel_max_speed_ms,
    );

    exec::reset_pose(&mut ds, &mut hw, Pose::default());
    info!("Simulated drivetrain initialised");

    // ---- SCHEDULE THE AUTONOMOUS ROUTINE ----

    info!("Routine mirrored: {}", ds.cmd_seq.is_routine_mirrored());

    let routine = ds.cmd_seq.build_patrol();
    ds.cmd_seq
        .schedule(Box::new(routine))
        .wrap_err("Failed to schedule the patrol routine")?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        exec::cycle(&mut ds, &mut hw).wrap_err("Cycle processing failed")?;

        // Advance the simulated drivetrain by one period
        hw.step(CYCLE_PERIOD_S);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.drive_ctrl.write() {
            warn!("Could not write DriveCtrl archives: {}", e);
        }

        // ---- ROUTINE MONITORING ----

        match ds.last_cmd_state {
            Some(CmdState::Finished) => {
                let pose = ds.pose();
                info!(
                    "Routine complete at ({:.3}, {:.3}, {:.3} rad) after {} cycles",
                    pose.position_m.x, pose.position_m.y, pose.heading_rad, ds.num_cycles
                );
                break;
            }
            Some(CmdState::Interrupted) => {
                warn!("Routine interrupted, stopping");
                break;
            }
            _ => (),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
