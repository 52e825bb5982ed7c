//! External bytecode compiler
//!
//! Runs a configured command (default `python3 -m compileall -q`) with the
//! tree root appended as the last argument.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::domain::ports::BytecodeCompiler;
use crate::error::{StagerError, StagerResult};

pub const DEFAULT_COMPILER: &[&str] = &["python3", "-m", "compileall", "-q"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCompiler {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list; `None` when the list is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program, args.to_vec()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ExternalCompiler {
    fn default() -> Self {
        let argv: Vec<String> = DEFAULT_COMPILER.iter().map(|s| s.to_string()).collect();
        Self::new(&argv[0], argv[1..].to_vec())
    }
}

impl BytecodeCompiler for ExternalCompiler {
    fn compile(&self, root: &Path) -> StagerResult<()> {
        tracing::debug!(program = %self.program.display(), root = %root.display(), "compiling bytecode");

        // stdout stays free for the NDJSON event stream
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| StagerError::Launch {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(StagerError::Launch {
                program: self.program.clone(),
                message: format!("bytecode compilation failed with exit code: {:?}", status.code()),
            });
        }
        Ok(())
    }
}
