//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "VIS_SERVO_ROOT";

/// Retrieve the software root directory from the environment.
///
/// Parameter files are found in `<root>/params` and sessions are created
/// underneath the root.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
