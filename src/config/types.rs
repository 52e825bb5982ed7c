//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::LinkMode;
use crate::error::StagerResult;
use crate::infrastructure::process::DEFAULT_COMPILER;

use super::loader::{self, ConfigWarning};

/// Name of the optional config file at the build-context root.
pub const CONFIG_FILE: &str = "stager.toml";

/// Build stage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_lock")]
    pub lock: PathBuf,

    /// Offline package store; defaults to `<cache>/store`
    #[serde(default)]
    pub store: Option<PathBuf>,

    /// Cache root; defaults to the user cache directory
    #[serde(default)]
    pub cache: Option<PathBuf>,

    /// Build workspace; defaults to `<context>/.stager/workspace`
    #[serde(default)]
    pub workspace: Option<PathBuf>,

    #[serde(default)]
    pub link_mode: LinkMode,

    #[serde(default)]
    pub compile_bytecode: bool,

    #[serde(default = "default_compiler")]
    pub compiler: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            lock: default_lock(),
            store: None,
            cache: None,
            workspace: None,
            link_mode: LinkMode::default(),
            compile_bytecode: false,
            compiler: default_compiler(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("pyproject.toml")
}

fn default_lock() -> PathBuf {
    PathBuf::from("stager.lock")
}

fn default_compiler() -> Vec<String> {
    DEFAULT_COMPILER.iter().map(|s| s.to_string()).collect()
}

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_listener")]
    pub listener: String,

    #[serde(default = "default_module")]
    pub module: String,

    #[serde(default = "default_object")]
    pub object: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Replace the stager process with the listener (unix only)
    #[serde(default = "default_true")]
    pub exec: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listener: default_listener(),
            module: default_module(),
            object: default_object(),
            port: default_port(),
            exec: true,
        }
    }
}

fn default_listener() -> String {
    "uvicorn".to_string()
}

fn default_module() -> String {
    "main".to_string()
}

fn default_object() -> String {
    "app".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

/// Absolute locations derived from a config and a build context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub context: PathBuf,
    pub manifest: PathBuf,
    pub lock: PathBuf,
    pub store: PathBuf,
    pub cache: PathBuf,
    pub workspace: PathBuf,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> StagerResult<Self> {
        Ok(loader::load_with_warnings(path)?.0)
    }

    /// Load configuration and report unknown keys
    pub fn load_with_warnings(path: &Path) -> StagerResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Resolve every configured path against `context`.
    ///
    /// `workspace` overrides the configured workspace (CLI flag).
    pub fn resolve(&self, context: &Path, workspace: Option<&Path>) -> BuildPaths {
        let at_context = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                context.join(p)
            }
        };

        let cache = match &self.build.cache {
            Some(cache) => at_context(cache),
            None => default_cache_dir(context),
        };
        let store = match &self.build.store {
            Some(store) => at_context(store),
            None => cache.join("store"),
        };
        let workspace = match workspace.or(self.build.workspace.as_deref()) {
            Some(ws) => at_context(ws),
            None => context.join(".stager").join("workspace"),
        };

        BuildPaths {
            context: context.to_path_buf(),
            manifest: at_context(&self.build.manifest),
            lock: at_context(&self.build.lock),
            store,
            cache,
            workspace,
        }
    }
}

fn default_cache_dir(context: &Path) -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("stager"))
        .unwrap_or_else(|| context.join(".stager").join("cache"))
}
