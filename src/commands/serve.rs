use anyhow::Result;

use stager::infrastructure::process::ProcessLauncher;
use stager::Config;

use super::{open_pipeline, GlobalOptions};
use crate::cli::{ContextArgs, ServeArgs};

/// Activate an already built workspace and start the listener.
pub fn cmd_serve(global: &GlobalOptions, args: &ContextArgs, serve: &ServeArgs) -> Result<i32> {
    let events = global.event_sink("serve");
    let (context, config) = global.prepare(args, events.as_ref())?;
    let config = apply_overrides(config, serve);
    let launcher = ProcessLauncher::new(config.service.exec);

    let code = open_pipeline(config, &context, args, events).serve(launcher)?;
    Ok(code)
}

/// Build, then serve. Nothing is launched when the build fails.
pub fn cmd_run(global: &GlobalOptions, args: &ContextArgs, serve: &ServeArgs) -> Result<i32> {
    let events = global.event_sink("run");
    let (context, config) = global.prepare(args, events.as_ref())?;
    let config = apply_overrides(config, serve);
    let launcher = ProcessLauncher::new(config.service.exec);

    let code = open_pipeline(config, &context, args, events).run(launcher)?;
    Ok(code)
}

fn apply_overrides(mut config: Config, serve: &ServeArgs) -> Config {
    if let Some(port) = serve.port {
        config.service.port = port;
    }
    if serve.no_exec {
        config.service.exec = false;
    }
    config
}
