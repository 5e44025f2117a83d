//! shell-exec binary entry point.

use std::process::ExitCode;

use shell_exec::cli::{self, Args};
use shell_exec::config::Config;
use shell_exec::{logging, Command, Directory, ShellExecError};
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let Some(command_line) = args.command.clone() else {
        cli::print_help();
        return ExitCode::from(2);
    };

    match run(&args, command_line).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, command_line: String) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load(args)?;
    let _ = logging::try_init_with_filter(config.log_filter());
    debug!(?config, "configuration loaded");

    let executor = config.to_executor()?;
    let mut command = Command::new(command_line);
    if let Some(ref dir) = args.directory {
        command = command.within(Directory::location(dir));
    }

    match executor.execute_async(command).await {
        Ok(stdout) => {
            print!("{stdout}");
            Ok(ExitCode::SUCCESS)
        }
        Err(ShellExecError::Execution(failure)) => {
            print!("{}", failure.stdout);
            eprint!("{}", failure.stderr);
            debug!(status = failure.termination_status, "{failure}");
            Ok(ExitCode::from(exit_byte(failure.termination_status)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Map a termination status onto a process exit byte, never reporting success.
fn exit_byte(status: i32) -> u8 {
    u8::try_from(status).ok().filter(|b| *b != 0).unwrap_or(1)
}
