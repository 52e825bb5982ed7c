//! Process launcher
//!
//! Starts the listener with the activated search path, import path and
//! working directory.
//! In exec mode (unix) the current process image is replaced, so the process
//! lives exactly as long as the listener.

use std::process::Command;

use crate::domain::ports::{LaunchCommand, Launcher};
use crate::error::{StagerError, StagerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessLauncher {
    exec: bool,
}

impl ProcessLauncher {
    /// `exec` is honored on unix only; elsewhere the listener is spawned and awaited.
    pub fn new(exec: bool) -> Self {
        Self { exec }
    }

    pub fn spawning() -> Self {
        Self::new(false)
    }

    fn command(launch: &LaunchCommand) -> Command {
        let mut cmd = Command::new(&launch.program);
        // PYTHONHOME would point the interpreter away from the environment
        cmd.args(&launch.args)
            .env("PATH", &launch.search_path)
            .env("PYTHONPATH", &launch.import_path)
            .env("VIRTUAL_ENV", &launch.env_dir)
            .env_remove("PYTHONHOME")
            .current_dir(&launch.working_dir);
        cmd
    }

    fn launch_error(launch: &LaunchCommand, err: impl ToString) -> StagerError {
        StagerError::Launch {
            program: launch.program.clone(),
            message: err.to_string(),
        }
    }

    #[cfg(unix)]
    fn exec(launch: &LaunchCommand) -> StagerResult<i32> {
        use std::os::unix::process::CommandExt;

        // Only returns on failure
        let err = Self::command(launch).exec();
        Err(Self::launch_error(launch, err))
    }

    fn spawn_and_wait(launch: &LaunchCommand) -> StagerResult<i32> {
        let status = Self::command(launch)
            .status()
            .map_err(|e| Self::launch_error(launch, e))?;
        Ok(exit_code(status))
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &LaunchCommand) -> StagerResult<i32> {
        #[cfg(unix)]
        if self.exec {
            return Self::exec(command);
        }
        Self::spawn_and_wait(command)
    }
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
