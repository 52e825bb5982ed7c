//! Service Launcher
//!
//! Hands the foreground to the listener, bound to `0.0.0.0:<port>` and
//! pointed at the application object.

use crate::config::ServiceConfig;
use crate::domain::ports::{LaunchCommand, Launcher};
use crate::error::StagerResult;

use super::activate::Activation;

/// Every interface, so the service is reachable from outside the container.
pub const BIND_HOST: &str = "0.0.0.0";

/// What the listener serves and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub module: String,
    pub object: String,
    pub port: u16,
}

impl ServiceSpec {
    pub fn new(module: impl Into<String>, object: impl Into<String>, port: u16) -> Self {
        Self {
            module: module.into(),
            object: object.into(),
            port,
        }
    }

    /// `<module>:<object>` as the listener expects it.
    pub fn target(&self) -> String {
        format!("{}:{}", self.module, self.object)
    }
}

impl From<&ServiceConfig> for ServiceSpec {
    fn from(config: &ServiceConfig) -> Self {
        Self::new(&config.module, &config.object, config.port)
    }
}

pub struct ServiceLauncher<L: Launcher> {
    launcher: L,
}

impl<L: Launcher> ServiceLauncher<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    pub fn command(activation: &Activation, service: &ServiceSpec) -> LaunchCommand {
        LaunchCommand {
            program: activation.listener.clone(),
            args: vec![
                service.target(),
                "--host".to_string(),
                BIND_HOST.to_string(),
                "--port".to_string(),
                service.port.to_string(),
            ],
            search_path: activation.search_path.clone(),
            import_path: activation.import_path.clone(),
            env_dir: activation.env_dir.clone(),
            working_dir: activation.working_dir.clone(),
        }
    }

    /// Blocks until the listener exits and returns its exit code.
    pub fn launch(&self, activation: &Activation, service: &ServiceSpec) -> StagerResult<i32> {
        let command = Self::command(activation, service);
        tracing::debug!(%command, cwd = %command.working_dir.display(), "starting listener");
        self.launcher.launch(&command)
    }
}
