//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::LinkMode;
use crate::error::{StagerError, StagerResult};

use super::env_validator::EnvVarValidator;
use super::types::{Config, CONFIG_FILE};

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (unknown keys).
pub fn load_with_warnings(path: &Path) -> StagerResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StagerError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the config for a build context.
///
/// An explicit path must exist. Otherwise `<context>/stager.toml` is used when
/// present, and defaults when not. Environment overrides apply last.
pub fn load_for_context(context: &Path, explicit: Option<&Path>) -> StagerResult<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(context.join(CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let config = match path {
        Some(path) => {
            let (config, warnings) = load_with_warnings(&path)?;
            for warning in &warnings {
                tracing::warn!("{}", warning);
            }
            tracing::debug!(path = %path.display(), "loaded configuration");
            config
        }
        None => Config::default(),
    };

    Ok(with_env_overrides(config))
}

/// Apply environment variable overrides (STAGER_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_overrides_from(config, |name| std::env::var(name).ok(), &mut std::io::stderr())
}

/// Apply overrides from an arbitrary variable source, warning into `writer`.
pub fn with_overrides_from<F, W>(mut config: Config, lookup: F, writer: &mut W) -> Config
where
    F: Fn(&str) -> Option<String>,
    W: std::io::Write,
{
    if let Some(value) = lookup("STAGER_COMPILE_BYTECODE") {
        config.build.compile_bytecode = EnvVarValidator::new(
            "STAGER_COMPILE_BYTECODE",
            &["true", "false", "1", "0", "yes", "no"],
        )
        .parse_with_writer(
            &value,
            parse_bool,
            config.build.compile_bytecode,
            writer,
        );
    }

    if let Some(value) = lookup("STAGER_LINK_MODE") {
        config.build.link_mode = EnvVarValidator::new("STAGER_LINK_MODE", LinkMode::VALID_VALUES)
            .parse_with_writer(
                &value,
                |s| s.parse::<LinkMode>().ok(),
                config.build.link_mode,
                writer,
            );
    }

    if let Some(value) = lookup("STAGER_CACHE_DIR").filter(|v| !v.is_empty()) {
        config.build.cache = Some(PathBuf::from(value));
    }

    if let Some(value) = lookup("STAGER_STORE").filter(|v| !v.is_empty()) {
        config.build.store = Some(PathBuf::from(value));
    }

    config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "build",
        "manifest",
        "lock",
        "store",
        "cache",
        "workspace",
        "link_mode",
        "compile_bytecode",
        "compiler",
        "service",
        "listener",
        "module",
        "object",
        "port",
        "exec",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (candidate, super::env_validator::levenshtein(unknown, candidate)))
        .min_by_key(|&(_, dist)| dist)
        .filter(|&(_, dist)| dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}
