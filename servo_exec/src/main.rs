//! Main visual servo executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Start the track feed, which publishes tracking measurements read from a file or stdin
//!     - Main loop:
//!         - Read the latest tracking measurement
//!         - Visual servo control processing
//!         - Write the velocity command as a JSON line on stdout
//!     - On interrupt send a final zero command and exit
//!
//! Logs go to stderr and the session log file, stdout carries only velocity commands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};
use structopt::StructOpt;

// Internal
use servo_lib::{
    cancel::{install_interrupt_handler, CancelToken},
    control_loop::ControlLoop,
    servo_ctrl::{InitData, ServoCtrl, ServoParams},
    track_feed::TrackFeed,
    track_slot::track_slot,
    vel_sink::JsonLineSink,
};
use util::{
    logger::{logger_init, parse_level},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Drive a mobile robot towards a tracked object.
#[derive(Debug, StructOpt)]
#[structopt(name = "servo_exec")]
struct Opt {
    /// Parameter file, relative to the params directory under the software root
    #[structopt(long, default_value = "servo_exec.toml")]
    params: String,

    /// File to read tracking measurements from, one JSON object per line. Stdin is used if not
    /// given.
    #[structopt(long, parse(from_os_str))]
    tracks: Option<PathBuf>,

    /// Archive the controller status report every cycle
    #[structopt(long)]
    archive: bool,

    /// Minimum log level, one of info, debug or trace
    #[structopt(long, default_value = "debug")]
    log_level: String,
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
    let session = Session::new("servo_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let min_level = parse_level(&opt.log_level)
        .ok_or_else(|| eyre!("Invalid log level \"{}\"", opt.log_level))?;
    logger_init(min_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Visual Servo Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let table = util::params::load_table(&opt.params).wrap_err("Could not load servo params")?;
    let params = ServoParams::from_table(&table);

    info!("Exec parameters loaded");

    let period = params.cycle_period();

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut servo_ctrl = ServoCtrl::default();
    servo_ctrl
        .init(
            InitData {
                params,
                archive: opt.archive,
            },
            &session,
        )
        .wrap_err("Failed to initialise ServoCtrl")?;
    info!("ServoCtrl init complete");

    let cancel = CancelToken::new();
    install_interrupt_handler(cancel.clone())
        .wrap_err("Failed to install the interrupt handler")?;

    let (track_writer, track_reader) = track_slot();
    let feed = match opt.tracks {
        Some(ref path) => {
            info!("Reading tracks from {:?}", path);
            let file = File::open(path).wrap_err("Could not open the tracks file")?;
            TrackFeed::spawn(BufReader::new(file), track_writer)
        }
        None => {
            info!("Reading tracks from stdin");
            TrackFeed::spawn(BufReader::new(io::stdin()), track_writer)
        }
    };

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let ctrl_loop = ControlLoop::new(
        servo_ctrl,
        track_reader,
        JsonLineSink::new(io::stdout()),
        cancel,
        period,
    );

    let (summary, _) = ctrl_loop.run();

    info!(
        "Ran {} cycles with {} overruns, terminated at {:.02} s",
        summary.num_cycles, summary.num_overruns, summary.terminated_at_s
    );

    // The feed thread may be blocked on stdin, only collect its stats if it has stopped
    if feed.is_finished() {
        let stats = feed.join();
        info!(
            "Track feed published {} measurements and rejected {}",
            stats.num_published, stats.num_rejected
        );
    }

    // ---- SHUTDOWN ----

    session.save("run_summary.json", summary);
    session.exit();

    Ok(())
}
