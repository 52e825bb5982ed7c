//! External processes: bytecode compiler and listener launcher

mod compiler;
mod launcher;

pub use compiler::{ExternalCompiler, DEFAULT_COMPILER};
pub use launcher::ProcessLauncher;
