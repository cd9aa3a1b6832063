//! # Input script interpreter module
//!
//! This module provides an interpreter for timed input scripts, which replay
//! recorded or hand written input frames into the cycle loop in place of live
//! hardware.
//!
//! A script is made of entries in the form
//!
//! ```text
//! <time_s>: <frame as JSON>;
//! ```
//!
//! Anything which doesn't match this form (for example `#` comments) is
//! ignored. Entries must be in ascending time order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A frame which is scripted to become active at a specific time.
struct Entry<T> {
    /// The time the frame becomes active at
    exec_time_s: f64,

    /// The frame itself
    frame: T,
}

/// A script interpreter.
///
/// After initialising with the path to the script use `get_pending_frame` to
/// acquire the frame which has become active since the last call.
pub struct ScriptInterpreter<T> {
    _script_path: PathBuf,
    entries: VecDeque<Entry<T>>,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script entry at {0} s is earlier than the entry before it")]
    OutOfOrder(f64),

    #[error("Script contains an invalid frame at {0} s: {1}")]
    InvalidFrame(f64, serde_json::Error),
}

/// The result of polling the interpreter.
#[derive(Debug, PartialEq)]
pub enum PendingFrame<T> {
    /// No new frame has become active, keep using the previous one.
    None,

    /// A new frame is active from now on.
    New(T),

    /// All frames have been delivered.
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned,
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_str(&script)?;
        si._script_path = path;

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        // Empty queue of entries
        let mut queue: VecDeque<Entry<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        let mut last_time_s = 0f64;

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if exec_time_s < last_time_s {
                return Err(ScriptError::OutOfOrder(exec_time_s));
            }
            last_time_s = exec_time_s;

            // The payload is JSON only
            let frame = serde_json::from_str(&cap[3])
                .map_err(|e| ScriptError::InvalidFrame(exec_time_s, e))?;

            queue.push_back(Entry { exec_time_s, frame });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            entries: queue,
            duration_s: last_time_s,
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Return the frame which has become active at `current_time_s`.
    ///
    /// If more than one frame became active since the last call only the
    /// latest one is returned.
    pub fn get_pending_frame(&mut self, current_time_s: f64) -> PendingFrame<T> {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.entries.is_empty() {
            return PendingFrame::EndOfScript;
        }

        let mut latest: Option<T> = None;

        // Pop entries while the head's exec time has been reached
        while let Some(e) = self.entries.front() {
            if e.exec_time_s > current_time_s {
                break;
            }

            if latest.is_some() {
                log::warn!(
                    "Script frame at {:.03} s superseded before it was used",
                    e.exec_time_s
                );
            }

            latest = self.entries.pop_front().map(|e| e.frame);
        }

        match latest {
            Some(f) => PendingFrame::New(f),
            None => PendingFrame::None,
        }
    }

    /// Get the number of frames remaining in the script
    pub fn get_num_frames(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.duration_s
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Frame {
        x: f64,
    }

    const SCRIPT: &str = "
        # warm up
        0.0: {\"x\": 0.0};
        0.5: {\"x\": 1.0};
        0.6: {\"x\": 2.0};
        2.0: {\"x\": 0.0};
    ";

    #[test]
    fn test_parse() {
        let si: ScriptInterpreter<Frame> = ScriptInterpreter::from_str(SCRIPT).unwrap();
        assert_eq!(si.get_num_frames(), 4);
        assert_eq!(si.get_duration(), 2.0);
    }

    #[test]
    fn test_pending_frames() {
        let mut si: ScriptInterpreter<Frame> = ScriptInterpreter::from_str(SCRIPT).unwrap();

        assert_eq!(si.get_pending_frame(0.0), PendingFrame::New(Frame { x: 0.0 }));
        assert_eq!(si.get_pending_frame(0.02), PendingFrame::None);

        // Both 0.5 and 0.6 are due, the later one wins
        assert_eq!(si.get_pending_frame(0.7), PendingFrame::New(Frame { x: 2.0 }));

        assert_eq!(si.get_pending_frame(2.0), PendingFrame::New(Frame { x: 0.0 }));
        assert_eq!(si.get_pending_frame(2.02), PendingFrame::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::<Frame>::from_str("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<Frame>::from_str("1.0: {\"x\": 0.0};\n0.5: {\"x\": 0.0};"),
            Err(ScriptError::OutOfOrder(_))
        ));
        assert!(matches!(
            ScriptInterpreter::<Frame>::from_str("1.0: {\"y\": 0.0};"),
            Err(ScriptError::InvalidFrame(_, _))
        ));
    }
}
