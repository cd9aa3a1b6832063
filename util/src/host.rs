//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "MARS_SW_ROOT";

/// Get the software root directory from the environment.
///
/// Parameter files are resolved from `<root>/params` and sessions are created
/// under `<root>/sessions`.
pub fn get_mars_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
