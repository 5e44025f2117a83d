//! Command execution engine.

use std::path::Path;
use std::process::{Child, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::capture::CapturedStream;
use super::command::{Command, Directory, InvocationMode, SuccessCodes};
use super::script_file::ScriptFile;
use crate::error::{ExecutionError, ShellExecError};
use crate::shell::Shell;
use crate::Result;

/// Runs commands through a shell and captures their output.
///
/// Holds the defaults used when a [`Command`] does not override them.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    shell: Shell,
    success_codes: SuccessCodes,
    timeout: Option<Duration>,
    mode: InvocationMode,
}

impl CommandExecutor {
    /// Create an executor using `/bin/sh`, success code 0 and no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default shell.
    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    /// Set the default success codes.
    pub fn with_success_codes(mut self, codes: impl Into<SuccessCodes>) -> Self {
        self.success_codes = codes.into();
        self
    }

    /// Set the default timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default invocation mode.
    pub fn with_mode(mut self, mode: InvocationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Default shell.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Default success codes.
    pub fn success_codes(&self) -> &SuccessCodes {
        &self.success_codes
    }

    /// Default timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Default invocation mode.
    pub fn mode(&self) -> InvocationMode {
        self.mode
    }

    /// Execute a command, blocking until it exits and its output is drained.
    ///
    /// Returns the captured standard output when the exit status is in the
    /// success set, and [`ShellExecError::Execution`] otherwise.
    pub fn execute_sync(&self, command: &Command) -> Result<String> {
        let shell = command.shell.as_ref().unwrap_or(&self.shell);
        let success_codes = command.success_codes.as_ref().unwrap_or(&self.success_codes);
        let timeout = command.timeout.or(self.timeout);
        let mode = command.mode.unwrap_or(self.mode);
        let script = command.script();

        let script_file = match mode {
            InvocationMode::Inline => None,
            InvocationMode::ScriptFile => Some(ScriptFile::create(shell, &script)?),
        };

        let mut process = std::process::Command::new(shell.program());
        match &script_file {
            Some(file) => process.args(shell.file_arguments()).arg(file.path()),
            None => process.args(shell.arguments()).arg(&script),
        };
        process
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so a timeout can kill whatever the shell started.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }

        let result = run(process, &command.command_line, shell.program(), timeout)
            .and_then(|(status, stdout, stderr)| {
                if success_codes.contains(status) {
                    Ok(stdout)
                } else {
                    Err(ExecutionError {
                        termination_status: status,
                        stdout,
                        stderr,
                        command: command.command_line.clone(),
                    }
                    .into())
                }
            });

        if let Some(file) = script_file {
            file.close();
        }
        result
    }

    /// Execute a command on the blocking thread pool.
    pub async fn execute_async(&self, command: Command) -> Result<String> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.execute_sync(&command))
            .await
            .map_err(|e| ShellExecError::TaskFailed(e.to_string()))?
    }
}

/// Spawn, drain and wait. Returns the exit status and both decoded streams.
fn run(
    mut process: std::process::Command,
    command_line: &str,
    program: &Path,
    timeout: Option<Duration>,
) -> Result<(i32, String, String)> {
    let start = Instant::now();
    let mut child = process.spawn().map_err(|source| ShellExecError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;
    debug!(command = command_line, pid = child.id(), "spawned shell");

    // Both pipes are drained while the child runs; a full pipe nobody reads
    // would block the child and this wait forever.
    let stdout = match CapturedStream::drain("stdout", child.stdout.take()) {
        Ok(stream) => stream,
        Err(e) => {
            terminate(&mut child);
            return Err(e);
        }
    };
    let stderr = match CapturedStream::drain("stderr", child.stderr.take()) {
        Ok(stream) => stream,
        Err(e) => {
            terminate(&mut child);
            stdout.detach();
            return Err(e);
        }
    };

    let waited = match timeout {
        Some(limit) => child.wait_timeout(limit).map(|status| status.ok_or(limit)),
        None => child.wait().map(Ok),
    };
    let status = match waited {
        Ok(Ok(status)) => status,
        Ok(Err(limit)) => {
            terminate(&mut child);
            stdout.detach();
            stderr.detach();
            debug!(command = command_line, ?limit, "command timed out");
            return Err(ShellExecError::Timeout {
                command: command_line.to_string(),
                timeout: limit,
            });
        }
        Err(e) => {
            terminate(&mut child);
            stdout.detach();
            stderr.detach();
            return Err(e.into());
        }
    };

    let stdout = stdout.finish()?;
    let stderr = stderr.finish()?;
    let status = termination_status(status);
    debug!(
        command = command_line,
        status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        elapsed = ?start.elapsed(),
        "command finished"
    );
    Ok((status, stdout, stderr))
}

/// Kill and reap a child that will not be waited on normally.
///
/// On unix the whole process group goes, including background jobs and
/// non-`exec` children of the shell.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let group = Pid::from_raw(child.id() as i32);
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            warn!(pid = child.id(), error = %e, "failed to kill process group");
        }
    }
    if let Err(e) = child.kill() {
        warn!(pid = child.id(), error = %e, "failed to kill child");
    }
    if let Err(e) = child.wait() {
        warn!(pid = child.id(), error = %e, "failed to reap child");
    }
}

/// Numeric exit status, using the shell's `128 + signal` for signal deaths.
fn termination_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Execute `command_line` with an explicit shell, directory and success set.
pub fn execute(
    command_line: &str,
    shell: &Shell,
    directory: &Directory,
    success_codes: &SuccessCodes,
) -> Result<String> {
    let cmd = Command::new(command_line)
        .shell(shell.clone())
        .within(directory.clone())
        .success_codes(success_codes.clone());
    CommandExecutor::new().execute_sync(&cmd)
}

/// Simple one-shot command execution with all defaults.
pub fn execute_simple(command_line: &str) -> Result<String> {
    CommandExecutor::new().execute_sync(&Command::new(command_line))
}

/// Execute a command with timeout.
pub fn execute_with_timeout(command_line: &str, timeout: Duration) -> Result<String> {
    let cmd = Command::new(command_line).timeout(timeout);
    CommandExecutor::new().execute_sync(&cmd)
}
