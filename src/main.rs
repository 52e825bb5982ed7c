//! stager CLI - reproducible build-and-launch for containerized web services
//!
//! Usage: stager <COMMAND>
//!
//! Commands:
//!   build  Snapshot, sync dependencies and install the application
//!   serve  Activate a built workspace and start the listener
//!   run    Build, then serve
//!   keys   Print the dependency and payload cache keys

mod cli;
mod commands;

use clap::Parser;
use is_terminal::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stager::StagerError;

use cli::{Cli, Commands};
use commands::GlobalOptions;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "STAGER_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = GlobalOptions {
        json: cli.json,
        verbose: cli.verbose,
        config: cli.config.clone(),
    };

    let result = match &cli.command {
        Commands::Build { context } => commands::build::cmd_build(&global, context),
        Commands::Serve { context, serve } => commands::serve::cmd_serve(&global, context, serve),
        Commands::Run { context, serve } => commands::serve::cmd_run(&global, context, serve),
        Commands::Keys { context } => commands::keys::cmd_keys(&global, context),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            // JSON mode already reported the failure as an `error` event.
            if !global.json {
                eprintln!("Error: {:#}", err);
            }
            err.downcast_ref::<StagerError>()
                .map_or(1, StagerError::exit_code)
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "stager=warn",
        1 => "stager=info",
        2 => "stager=debug",
        _ => "stager=trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}
