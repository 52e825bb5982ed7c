//! Install record repository
//!
//! One TOML file per installed package under `<env>/installed/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::entities::{InstallRecord, InstalledSet};
use crate::domain::value_objects::PackageName;
use crate::error::{StagerError, StagerResult};

/// Directory (relative to the environment root) holding install records.
pub const RECORDS_DIR: &str = "installed";

#[derive(Debug, Clone)]
pub struct InstallRecordStore {
    dir: PathBuf,
}

impl InstallRecordStore {
    pub fn new(env_root: &Path) -> Self {
        Self {
            dir: env_root.join(RECORDS_DIR),
        }
    }

    fn record_path(&self, name: &PackageName) -> PathBuf {
        self.dir.join(format!("{}.toml", name))
    }

    /// Location of `name`'s record relative to the environment root.
    pub fn record_rel(name: &PackageName) -> PathBuf {
        Path::new(RECORDS_DIR).join(format!("{}.toml", name))
    }

    pub fn write(&self, record: &InstallRecord) -> StagerResult<()> {
        let name = PackageName::new(&record.name).map_err(|e| invalid(&self.dir, e))?;
        fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(record).map_err(|e| invalid(&self.dir, e))?;
        fs::write(self.record_path(&name), content)?;
        Ok(())
    }

    pub fn remove(&self, name: &PackageName) -> StagerResult<()> {
        match fs::remove_file(self.record_path(name)) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }

    /// Read every record. A missing directory is an empty environment.
    pub fn read_all(&self) -> StagerResult<InstalledSet> {
        let mut set = InstalledSet::new();
        if !self.dir.is_dir() {
            return Ok(set);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .map(|e| e.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();

        for path in paths {
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let record: InstallRecord = toml::from_str(&content).map_err(|e| invalid(&path, e))?;
            let name = PackageName::new(&record.name).map_err(|e| invalid(&path, e))?;
            set.insert(name, record);
        }
        Ok(set)
    }
}

fn invalid(path: &Path, err: impl std::fmt::Display) -> StagerError {
    StagerError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("install record {}: {}", path.display(), err),
    ))
}
