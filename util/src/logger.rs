//! Logger initialisation
//!
//! Everything at or above the file level goes to the session's log file. The
//! console gets its own, usually quieter, level since per-cycle trace output
//! at 50 Hz is unreadable in a terminal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error(
        "The console log level ({console}) must not be more verbose than the file log level \
         ({file})"
    )]
    InvalidLevels {
        file: LevelFilter,
        console: LevelFilter,
    },

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    file_level: LevelFilter,
    console_level: LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if console_level > file_level {
        return Err(LoggerInitError::InvalidLevels {
            file: file_level,
            console: console_level,
        });
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:9.3} {}] {}",
                session::get_elapsed_seconds(),
                level_to_str(record.level()),
                message
            ))
        })
        .level(console_level)
        .chain(std::io::stdout());

    // The file always carries the target so per-module output can be
    // filtered afterwards
    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:9.3} {}] {}: {}",
                session::get_elapsed_seconds(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(file_level)
        .chain(log_file);

    fern::Dispatch::new()
        .chain(console)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log levels: file {}, console {}", file_level, console_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the coloured console tag of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}
