//! Command representation and script building.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::shell::Shell;

/// Directory a command runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Directory {
    /// The caller's working directory; the command is not wrapped.
    #[default]
    Current,
    /// A directory given as a plain path string.
    Path(String),
    /// A directory given as a filesystem location.
    Location(PathBuf),
}

impl Directory {
    /// Scope to a path string.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Scope to a filesystem location.
    pub fn location(location: impl Into<PathBuf>) -> Self {
        Self::Location(location.into())
    }
}

/// Exit statuses treated as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessCodes(BTreeSet<i32>);

impl SuccessCodes {
    /// Whether `status` is an accepted exit status.
    pub fn contains(&self, status: i32) -> bool {
        self.0.contains(&status)
    }

    /// Whether no exit status would count as success.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Accepted statuses in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

impl Default for SuccessCodes {
    fn default() -> Self {
        Self(BTreeSet::from([0]))
    }
}

impl FromIterator<i32> for SuccessCodes {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[i32; N]> for SuccessCodes {
    fn from(codes: [i32; N]) -> Self {
        codes.into_iter().collect()
    }
}

/// How the built script is handed to the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationMode {
    /// Pass the script as the final shell argument.
    #[default]
    Inline,
    /// Write the script to a temporary file and run that file.
    ScriptFile,
}

/// A command to be executed.
///
/// Options left unset fall back to the executor's defaults.
#[derive(Debug, Clone)]
pub struct Command {
    /// The command line to execute.
    pub command_line: String,
    /// Directory to run in.
    pub directory: Directory,
    /// Shell override.
    pub shell: Option<Shell>,
    /// Success code override.
    pub success_codes: Option<SuccessCodes>,
    /// Maximum execution time.
    pub timeout: Option<Duration>,
    /// Invocation mode override.
    pub mode: Option<InvocationMode>,
}

impl Command {
    /// Create a new command with the given command line.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            directory: Directory::Current,
            shell: None,
            success_codes: None,
            timeout: None,
            mode: None,
        }
    }

    /// Run within the given directory.
    pub fn within(mut self, directory: Directory) -> Self {
        self.directory = directory;
        self
    }

    /// Run with a specific shell.
    pub fn shell(mut self, shell: Shell) -> Self {
        self.shell = Some(shell);
        self
    }

    /// Accept these exit statuses as success.
    pub fn success_codes(mut self, codes: impl Into<SuccessCodes>) -> Self {
        self.success_codes = Some(codes.into());
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the invocation mode.
    pub fn mode(mut self, mode: InvocationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// The script the shell will run.
    pub fn script(&self) -> String {
        build_script(&self.command_line, &self.directory)
    }
}

/// Build the script that runs `command` within `directory`.
///
/// Scoped commands run in a subshell that first changes into the quoted
/// directory. The subshell restores the original directory on exit, and the
/// command's own exit status is the status of the script.
pub fn build_script(command: &str, directory: &Directory) -> String {
    let dir = match directory {
        Directory::Current => return command.to_string(),
        Directory::Path(path) => Cow::Borrowed(path.as_str()),
        Directory::Location(location) => location.to_string_lossy(),
    };
    // CDPATH would make cd echo the resolved directory to stdout.
    format!(
        "(\nCDPATH= cd -- {} || exit\n{}\n)",
        shell_escape::unix::escape(dir),
        command
    )
}
