//! Command execution engine.
//!
//! This module runs a command line through a shell and captures its output:
//! - Directory scoping via a quoted subshell wrapper
//! - Concurrent draining of stdout and stderr
//! - Success decided by a configurable set of exit codes
//! - Optional timeout and script-file invocation
//!
//! # Example
//!
//! ```no_run
//! use shell_exec::execution::{execute_simple, Command, CommandExecutor, Directory};
//!
//! // Simple one-shot execution
//! let output = execute_simple("echo hello").unwrap();
//! assert_eq!(output, "hello\n");
//!
//! // Command with options
//! let cmd = Command::new("ls")
//!     .within(Directory::path("/tmp"))
//!     .success_codes([0, 1]);
//! let listing = CommandExecutor::new().execute_sync(&cmd).unwrap();
//! ```

mod capture;
mod command;
mod executor;
mod script_file;

pub use command::{build_script, Command, Directory, InvocationMode, SuccessCodes};
pub use executor::{execute, execute_simple, execute_with_timeout, CommandExecutor};
