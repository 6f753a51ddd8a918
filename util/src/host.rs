//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Environment variable giving the root directory of the software installation.
pub const SW_ROOT_ENV_VAR: &str = "DOMED_SW_ROOT";

/// Get the software root directory, which contains the `params` and `sessions` directories.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
