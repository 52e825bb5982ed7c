//! BytecodeCompiler port - ahead-of-time compilation of installed files
//!
//! Compilation is a startup optimization only. Implementations may add
//! `__pycache__/` directories and `*.pyc` files; fingerprints ignore both.

use std::path::Path;

use crate::error::StagerResult;

pub trait BytecodeCompiler: Send + Sync {
    /// Compile every source file under `root` in place.
    fn compile(&self, root: &Path) -> StagerResult<()>;
}

/// Compiler used when compilation is disabled.
pub struct NoopCompiler;

impl BytecodeCompiler for NoopCompiler {
    fn compile(&self, _root: &Path) -> StagerResult<()> {
        Ok(())
    }
}
