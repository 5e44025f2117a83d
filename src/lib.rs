//! # shell-exec
//!
//! Run a shell command line and get its standard output back, or a typed
//! error carrying both captured streams when it fails.
//!
//! ## Features
//!
//! - **Deadlock-free capture**: stdout and stderr are drained while the child runs
//! - **Directory scoping**: commands run inside a quoted directory without leaking `cd`
//! - **Typed failures**: exit status, stdout, stderr and the original command line
//! - **Configurable**: shell, success codes, timeout and invocation mode
//!
//! ## Quick Start
//!
//! ```no_run
//! use shell_exec::{Command, CommandExecutor, Directory, ShellExecError};
//!
//! fn main() -> shell_exec::Result<()> {
//!     shell_exec::logging::try_init().ok();
//!
//!     let executor = CommandExecutor::new();
//!     let listing = executor.execute_sync(&Command::new("ls").within(Directory::path("/tmp")))?;
//!     print!("{listing}");
//!
//!     match executor.execute_sync(&Command::new("cat missing-file")) {
//!         Err(ShellExecError::Execution(err)) => eprint!("{}", err.stderr),
//!         other => println!("{other:?}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod shell;

// Re-export commonly used types
pub use error::{ExecutionError, Result, ShellExecError};
pub use execution::{
    execute, execute_simple, Command, CommandExecutor, Directory, InvocationMode, SuccessCodes,
};
pub use shell::Shell;
