//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Input acquisition from the operator script
//!         - Operator mapping
//!         - Automatic alignment
//!         - Drive control processing
//!         - Lift and wrist position control
//!         - Intake and climber demands
//!         - Archiving
//!
//! # Modules
//!
//! All modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, trace, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use mars_lib::{data_store::DataStore, operator::InputFrame, params::MarsExecParams};
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingFrame, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Mars robot control executable
#[derive(Debug, StructOpt)]
#[structopt(name = "mars_exec")]
struct Opt {
    /// Operator input script to run
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Stop after this many cycles, even if the script has not ended
    #[structopt(short, long)]
    cycles: Option<u128>,

    /// Minimum level of messages written to the session log file
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,

    /// Minimum level of messages printed to the console
    #[structopt(long, default_value = "info")]
    console_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("mars_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, opt.console_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Mars Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: MarsExecParams =
        util::params::load("exec.toml").wrap_err("Could not load exec params")?;

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "The cycle period must be positive, found {} s",
            exec_params.cycle_period_s
        ));
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    info!("Loading script from {:?}", opt.script);

    let mut si: ScriptInterpreter<InputFrame> =
        ScriptInterpreter::new(&opt.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} frames\n",
        si.get_duration(),
        si.get_num_frames()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::init(&session).wrap_err("Failed to initialise the modules")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    // The frame in force after its first cycle, i.e. without button edges
    let mut held_frame = InputFrame::default();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        if let Some(max) = opt.cycles {
            if ds.num_cycles >= max {
                info!("Cycle limit of {} reached, stopping", max);
                break;
            }
        }

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_frequency_hz());

        // ---- DATA INPUT ----

        // Script time advances by exactly one period each cycle so runs are
        // repeatable regardless of overruns
        let script_time_s = ds.num_cycles as f64 * exec_params.cycle_period_s;

        let frame = match si.get_pending_frame(script_time_s) {
            PendingFrame::New(f) => {
                trace!("New input frame at {:.03} s: {:?}", script_time_s, f);
                held_frame = f.held();
                f
            }
            PendingFrame::None => held_frame,
            PendingFrame::EndOfScript => {
                info!("End of input script reached, stopping");
                break;
            }
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.proc_cycle(&frame) {
            Ok(out) => trace!("Cycle output: {:?}", out),
            Err(e) => warn!("Error during cycle processing: {}", e),
        }

        // ---- WRITE ARCHIVES ----

        if exec_params.write_archives {
            if let Err(e) = ds.write_archives() {
                warn!("Could not write archives: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                if exec_params.max_consec_cycle_overruns > 0
                    && ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns
                {
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!("End of execution after {} cycles", ds.num_cycles);

    Ok(())
}
