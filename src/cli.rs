use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// stager - reproducible build-and-launch for containerized web services
#[derive(Parser, Debug)]
#[command(name = "stager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: <context>/stager.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the build context and workspace live.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Build context (application source tree with manifest and lock)
    #[arg(short, long, default_value = ".")]
    pub context: PathBuf,

    /// Build workspace (default: <context>/.stager/workspace)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,
}

/// Listener overrides.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to bind (overrides [service].port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Spawn the listener and wait instead of replacing this process
    #[arg(long)]
    pub no_exec: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Snapshot, sync dependencies and install the application
    Build {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Activate a built workspace and start the listener
    Serve {
        #[command(flatten)]
        context: ContextArgs,

        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Build, then serve
    Run {
        #[command(flatten)]
        context: ContextArgs,

        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Print the dependency and payload cache keys
    Keys {
        #[command(flatten)]
        context: ContextArgs,
    },
}
