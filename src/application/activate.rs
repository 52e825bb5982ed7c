//! Runtime Activator
//!
//! Pure configuration: binds the executable search path, the import path
//! and the working directory to the synchronized environment. Nothing
//! process-wide is mutated; the returned `Activation` is handed to the
//! launcher.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::Stage;
use crate::error::{StagerError, StagerResult};
use crate::infrastructure::repositories::{Workspace, WorkspaceState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub env_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub listener: PathBuf,
    /// `bin_dir` followed by the previous search path
    pub search_path: OsString,
    /// `site-packages` followed by the directories its `.pth` files name
    pub import_path: OsString,
    pub working_dir: PathBuf,
}

/// Activate `workspace` for `listener`.
///
/// `state` must show a completed payload install.
pub fn activate(
    workspace: &Workspace,
    state: Option<&WorkspaceState>,
    listener: &str,
    current_path: Option<&OsStr>,
) -> StagerResult<Activation> {
    match state.map(|s| s.stage) {
        Some(Stage::PayloadInstalled) => {}
        Some(stage) => {
            return Err(StagerError::activation(format!(
                "workspace {} is at stage '{}', expected '{}'; run `stager build` first",
                workspace.root().display(),
                stage,
                Stage::PayloadInstalled
            )));
        }
        None => {
            return Err(StagerError::activation(format!(
                "workspace {} has not been built; run `stager build` first",
                workspace.root().display()
            )));
        }
    }

    if listener.is_empty() || Path::new(listener).components().count() != 1 {
        return Err(StagerError::activation(format!(
            "listener '{}' must be a bare executable name",
            listener
        )));
    }

    let bin_dir = workspace.bin_dir();
    if !bin_dir.is_dir() {
        return Err(StagerError::activation(format!(
            "environment has no executable directory at {}",
            bin_dir.display()
        )));
    }

    let listener_path = bin_dir.join(listener);
    if !is_executable(&listener_path) {
        return Err(StagerError::activation(format!(
            "listener '{}' is not installed in {}",
            listener,
            bin_dir.display()
        )));
    }

    let mut entries = vec![bin_dir.clone()];
    if let Some(path) = current_path {
        entries.extend(std::env::split_paths(path));
    }
    let search_path = std::env::join_paths(entries)
        .map_err(|e| StagerError::activation(format!("cannot build search path: {}", e)))?;

    let site = workspace.site_packages();
    if !site.is_dir() {
        return Err(StagerError::activation(format!(
            "environment has no site-packages directory at {}",
            site.display()
        )));
    }
    let import_path = std::env::join_paths(import_entries(&site)?)
        .map_err(|e| StagerError::activation(format!("cannot build import path: {}", e)))?;

    Ok(Activation {
        env_dir: workspace.env_dir(),
        bin_dir,
        listener: listener_path,
        search_path,
        import_path,
        working_dir: workspace.app_dir(),
    })
}

/// `site` plus every existing directory named by its `.pth` files, in file
/// name order. Comment lines and `import` lines are skipped; relative entries
/// resolve against `site`.
fn import_entries(site: &Path) -> StagerResult<Vec<PathBuf>> {
    let mut pth_files: Vec<PathBuf> = fs::read_dir(site)?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    pth_files.retain(|p| p.extension().is_some_and(|ext| ext == "pth") && p.is_file());
    pth_files.sort();

    let mut entries = vec![site.to_path_buf()];
    for pth in pth_files {
        let content = fs::read_to_string(&pth).map_err(|e| {
            StagerError::activation(format!("cannot read path file {}: {}", pth.display(), e))
        })?;
        for line in content.lines().map(str::trim_end) {
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("import ")
                || line.starts_with("import\t")
            {
                continue;
            }
            let dir = site.join(line);
            if dir.is_dir() && !entries.contains(&dir) {
                entries.push(dir);
            }
        }
    }
    Ok(entries)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
