//! Error types for shell-exec.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A command ran to completion but its exit status was not accepted.
///
/// Both streams are captured in full, and `command` is the command line as
/// the caller wrote it, never the directory-wrapped script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("command `{command}` exited with status {termination_status}")]
pub struct ExecutionError {
    /// The exit code returned by the command.
    pub termination_status: i32,
    /// Text written to standard output during execution of the command.
    pub stdout: String,
    /// Text written to standard error during execution of the command.
    pub stderr: String,
    /// The command that was being executed.
    pub command: String,
}

/// Main error type for shell-exec operations.
#[derive(Error, Debug)]
pub enum ShellExecError {
    /// The shell process could not be started.
    #[error("failed to spawn {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a status outside the success set.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The command was killed after running past its deadline.
    #[error("command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An output reader thread panicked.
    #[error("{0} reader panicked")]
    Drain(&'static str),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// The blocking execution task did not complete.
    #[error("execution task failed: {0}")]
    TaskFailed(String),
}

impl ShellExecError {
    /// Returns the captured failure if the command ran and exited unsuccessfully.
    pub fn as_execution_error(&self) -> Option<&ExecutionError> {
        match self {
            Self::Execution(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience Result type for shell-exec operations.
pub type Result<T> = std::result::Result<T, ShellExecError>;
