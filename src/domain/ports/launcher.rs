//! Launcher port - hands the foreground over to the listener process

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::error::StagerResult;

/// Fully resolved listener invocation.
///
/// Built from an activation; carries its own search and import paths so no
/// process-wide environment is mutated before launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Exported as `PATH`
    pub search_path: OsString,
    /// Exported as `PYTHONPATH`
    pub import_path: OsString,
    /// Exported as `VIRTUAL_ENV`
    pub env_dir: PathBuf,
    pub working_dir: PathBuf,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs a launch command as a single blocking foreground call.
pub trait Launcher {
    /// Returns the listener's exit code once it stops.
    fn launch(&self, command: &LaunchCommand) -> StagerResult<i32>;
}
