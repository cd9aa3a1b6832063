//! # Mars Executable Parameters
//!
//! This module provide parameters for the executable itself, as opposed to
//! those of the individual control modules.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarsExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Write the csv archives every cycle.
    #[serde(default = "default_write_archives")]
    pub write_archives: bool,

    /// Number of consecutive overruns after which the run is aborted, zero
    /// never aborts.
    #[serde(default)]
    pub max_consec_cycle_overruns: u64,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_write_archives() -> bool {
    true
}

impl Default for MarsExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            write_archives: true,
            max_consec_cycle_overruns: 0,
        }
    }
}

impl MarsExecParams {
    /// Number of cycles per second
    pub fn cycle_frequency_hz(&self) -> f64 {
        1.0 / self.cycle_period_s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p: MarsExecParams = util::params::from_str("cycle_period_s = 0.05").unwrap();

        assert!(p.write_archives);
        assert_eq!(p.max_consec_cycle_overruns, 0);
        assert!((p.cycle_frequency_hz() - 20.0).abs() < 1e-9);
    }
}
