//! Shell selection.

use std::path::{Path, PathBuf};

/// A shell program plus the arguments that make it run an inline script.
///
/// The script is always appended after `arguments`, so for the built-in
/// shells the final argument vector is `["-c", <script>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: PathBuf,
    arguments: Vec<String>,
}

impl Shell {
    /// Create a shell from a program path and its inline-script arguments.
    pub fn new<I, S>(program: impl Into<PathBuf>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// POSIX `sh`, available on every Unix host.
    pub fn sh() -> Self {
        Self::new("/bin/sh", ["-c"])
    }

    /// GNU bash.
    pub fn bash() -> Self {
        Self::new("/bin/bash", ["-c"])
    }

    /// Z shell.
    pub fn zsh() -> Self {
        Self::new("/bin/zsh", ["-c"])
    }

    /// Path of the shell executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments placed before the script.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Arguments placed before a script file path.
    ///
    /// Same as [`Shell::arguments`] minus a trailing `-c`, which would make
    /// the shell treat the path as inline script text.
    pub fn file_arguments(&self) -> &[String] {
        match self.arguments.split_last() {
            Some((last, rest)) if last == "-c" => rest,
            _ => &self.arguments,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::sh()
    }
}
