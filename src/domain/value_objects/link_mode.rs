//! Link mode value object - how installed files are materialized on disk

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Materialization strategy for environment files.
///
/// Changes only the on-disk representation; the logical content of the
/// environment is the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Independent copies of every file
    #[default]
    Copy,
    /// Hard links into the dependency cache (falls back to copy across devices)
    Hardlink,
}

impl LinkMode {
    pub const VALID_VALUES: &'static [&'static str] = &["copy", "hardlink"];

    pub fn as_str(self) -> &'static str {
        match self {
            LinkMode::Copy => "copy",
            LinkMode::Hardlink => "hardlink",
        }
    }
}

impl FromStr for LinkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy" => Ok(LinkMode::Copy),
            "hardlink" | "link" => Ok(LinkMode::Hardlink),
            other => Err(format!("unknown link mode '{}'", other)),
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
