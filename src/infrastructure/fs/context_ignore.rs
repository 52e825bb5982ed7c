//! Build context ignore patterns
//!
//! Loads `.stagerignore` from the build context root using gitignore
//! semantics. The `.stager/` directory at the root is always excluded.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StagerError;

/// File name of the ignore file at the build context root.
pub const IGNORE_FILE: &str = ".stagerignore";

/// Directory at the context root reserved for stager's own state.
pub const RESERVED_DIR: &str = ".stager";

/// Maximum file size for `.stagerignore` (64KB)
const MAX_FILE_SIZE: u64 = 65536;

/// Maximum number of patterns allowed
const MAX_PATTERNS: usize = 1000;

/// Patterns loaded from a `.stagerignore` file.
#[derive(Debug)]
pub struct ContextIgnore {
    matcher: Gitignore,
    pattern_count: usize,
}

impl Default for ContextIgnore {
    fn default() -> Self {
        Self::empty()
    }
}

impl ContextIgnore {
    /// Pattern set that only excludes the reserved directory.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            pattern_count: 0,
        }
    }

    /// Load patterns from `<context>/.stagerignore`.
    ///
    /// Returns `Ok(empty)` if the file doesn't exist.
    pub fn load(context: &Path) -> Result<Self, IgnoreError> {
        let ignore_path = context.join(IGNORE_FILE);

        if !ignore_path.exists() {
            return Ok(Self::empty());
        }

        let metadata = fs::metadata(&ignore_path).map_err(IgnoreError::Io)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(IgnoreError::FileTooLarge {
                path: ignore_path,
                size: metadata.len(),
                limit: MAX_FILE_SIZE,
            });
        }

        let content = fs::read_to_string(&ignore_path).map_err(IgnoreError::Io)?;
        Self::from_content(context, &ignore_path, &content)
    }

    /// Parse patterns from string content.
    pub fn from_content(
        root: &Path,
        source_path: &Path,
        content: &str,
    ) -> Result<Self, IgnoreError> {
        let mut builder = GitignoreBuilder::new(root);
        let mut pattern_count = 0;

        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            pattern_count += 1;
            if pattern_count > MAX_PATTERNS {
                return Err(IgnoreError::TooManyPatterns {
                    path: source_path.to_path_buf(),
                    count: pattern_count,
                    limit: MAX_PATTERNS,
                });
            }

            if let Err(e) = builder.add_line(Some(source_path.to_path_buf()), line) {
                return Err(IgnoreError::InvalidPattern {
                    path: source_path.to_path_buf(),
                    line: line_num + 1,
                    pattern: line.to_string(),
                    message: e.to_string(),
                });
            }
        }

        let matcher = builder
            .build()
            .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;

        Ok(Self {
            matcher,
            pattern_count,
        })
    }

    /// Check if a context-relative path should be left out of the payload.
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        if rel_path
            .components()
            .next()
            .is_some_and(|c| c.as_os_str() == RESERVED_DIR)
        {
            return true;
        }
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }
}

/// Errors that can occur when loading ignore patterns.
#[derive(Debug)]
pub enum IgnoreError {
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
    TooManyPatterns {
        path: PathBuf,
        count: usize,
        limit: usize,
    },
    InvalidPattern {
        path: PathBuf,
        line: usize,
        pattern: String,
        message: String,
    },
    BuildFailed(String),
    Io(std::io::Error),
}

impl fmt::Display for IgnoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { size, limit, .. } => write!(
                f,
                "{} exceeds {}KB limit ({} bytes)",
                IGNORE_FILE,
                limit / 1024,
                size
            ),
            Self::TooManyPatterns { count, limit, .. } => write!(
                f,
                "{} has {} patterns, exceeds {} limit",
                IGNORE_FILE, count, limit
            ),
            Self::InvalidPattern {
                line,
                pattern,
                message,
                ..
            } => write!(f, "invalid pattern at line {}: '{}' - {}", line, pattern, message),
            Self::BuildFailed(msg) => write!(f, "failed to build ignore matcher: {}", msg),
            Self::Io(e) => write!(f, "IO error reading {}: {}", IGNORE_FILE, e),
        }
    }
}

impl std::error::Error for IgnoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IgnoreError> for StagerError {
    fn from(err: IgnoreError) -> Self {
        let file = match &err {
            IgnoreError::FileTooLarge { path, .. }
            | IgnoreError::TooManyPatterns { path, .. }
            | IgnoreError::InvalidPattern { path, .. } => path.clone(),
            IgnoreError::BuildFailed(_) | IgnoreError::Io(_) => PathBuf::from(IGNORE_FILE),
        };
        StagerError::Config {
            file,
            message: err.to_string(),
        }
    }
}
