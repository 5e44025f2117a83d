//! Command-line interface for shell-exec.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// The command line to run.
    pub command: Option<String>,
    /// Shell program (overrides config file).
    pub shell: Option<PathBuf>,
    /// Arguments placed before the script; replaces the configured ones.
    pub shell_args: Vec<String>,
    /// Directory to run the command in.
    pub directory: Option<PathBuf>,
    /// Accepted exit statuses; replaces the configured ones.
    pub success_codes: Vec<i32>,
    /// Timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Run the script from a temporary file.
    pub script_file: bool,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('a') | Long("shell-arg") => {
                result.shell_args.push(parser.value()?.parse()?);
            }
            Short('C') | Long("directory") => {
                result.directory = Some(parser.value()?.parse()?);
            }
            Short('e') | Long("success-code") => {
                let value: String = parser.value()?.parse()?;
                let code = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("success-code", value))?;
                result.success_codes.push(code);
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                result.timeout_secs = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("timeout", value))?,
                );
            }
            Long("script-file") => {
                result.script_file = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) if result.command.is_none() => {
                result.command = Some(val.string()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-exec {version}
Run a shell command line and capture its output

USAGE:
    shell-exec [OPTIONS] <COMMAND>

OPTIONS:
    -s, --shell <PATH>          Shell program [default: /bin/sh]
    -a, --shell-arg <ARG>       Argument before the script (repeatable) [default: -c]
    -C, --directory <DIR>       Run the command inside DIR
    -e, --success-code <CODE>   Accepted exit status (repeatable) [default: 0]
    -t, --timeout <SECS>        Kill the command after SECS seconds
        --script-file           Run the script from a temporary file
    -c, --config <FILE>         Path to configuration file (JSON)
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
    -h, --help                  Print help
    -V, --version               Print version

ENVIRONMENT VARIABLES:
    SHELL_EXEC_SHELL            Shell program (overrides config)
    SHELL_EXEC_TIMEOUT          Timeout in seconds (overrides config)
    SHELL_EXEC_LOG_LEVEL        Log level (overrides config)
    RUST_LOG                    Alternative log level setting

EXAMPLES:
    # List a directory whose name contains spaces
    shell-exec -C "/tmp/my dir" ls

    # grep exits 1 when nothing matches; accept that
    shell-exec -e 0 -e 1 "grep TODO src/*.rs"

    # Use bash with a deadline
    shell-exec -s /bin/bash -t 30 "make test"
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shell-exec {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}' (quote the whole command)", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
