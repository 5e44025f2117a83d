//! Configuration management for shell-exec.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::{CommandExecutor, InvocationMode, SuccessCodes};
use crate::shell::Shell;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell configuration.
    pub shell: ShellSection,
    /// Execution defaults.
    pub execution: ExecutionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Shell configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Path to the shell program.
    pub program: PathBuf,
    /// Arguments that make the shell run its final argument as a script.
    pub arguments: Vec<String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        let shell = Shell::default();
        Self {
            program: shell.program().to_path_buf(),
            arguments: shell.arguments().to_vec(),
        }
    }
}

/// Execution defaults section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Exit statuses treated as success.
    pub success_codes: Vec<i32>,
    /// Timeout in seconds; unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
    /// Run scripts from a temporary file instead of inline.
    pub script_file: bool,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            success_codes: vec![0],
            timeout_secs: None,
            script_file: false,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(program) = std::env::var("SHELL_EXEC_SHELL") {
            if !program.is_empty() {
                self.shell.program = PathBuf::from(program);
            }
        }

        if let Ok(secs) = std::env::var("SHELL_EXEC_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                self.execution.timeout_secs = Some(secs);
            }
        }

        if let Ok(level) = std::env::var("SHELL_EXEC_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref program) = args.shell {
            self.shell.program = program.clone();
        }

        if !args.shell_args.is_empty() {
            self.shell.arguments = args.shell_args.clone();
        }

        if !args.success_codes.is_empty() {
            self.execution.success_codes = args.success_codes.clone();
        }

        if args.timeout_secs.is_some() {
            self.execution.timeout_secs = args.timeout_secs;
        }

        if args.script_file {
            self.execution.script_file = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Build the executor these settings describe.
    pub fn to_executor(&self) -> Result<CommandExecutor, ConfigError> {
        if self.shell.program.as_os_str().is_empty() {
            return Err(ConfigError::InvalidShell);
        }
        let success_codes: SuccessCodes = self.execution.success_codes.iter().copied().collect();
        if success_codes.is_empty() {
            return Err(ConfigError::EmptySuccessCodes);
        }
        if self.execution.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidTimeout);
        }

        let mode = if self.execution.script_file {
            InvocationMode::ScriptFile
        } else {
            InvocationMode::Inline
        };

        Ok(CommandExecutor::new()
            .with_shell(Shell::new(
                self.shell.program.clone(),
                self.shell.arguments.iter().cloned(),
            ))
            .with_success_codes(success_codes)
            .with_timeout(self.execution.timeout_secs.map(Duration::from_secs))
            .with_mode(mode))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Shell program path is empty.
    InvalidShell,
    /// No exit status would count as success.
    EmptySuccessCodes,
    /// A zero-second timeout would kill every command.
    InvalidTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidShell => write!(f, "shell program must not be empty"),
            Self::EmptySuccessCodes => write!(f, "at least one success code is required"),
            Self::InvalidTimeout => write!(f, "timeout must be at least one second"),
        }
    }
}

impl std::error::Error for ConfigError {}
