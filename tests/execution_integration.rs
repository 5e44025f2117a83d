//! Execution integration tests.
//!
//! These run real commands through `/bin/sh` and check captured output,
//! failure reporting and directory scoping.

use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use shell_exec::{
    execute, execute_simple, Command, CommandExecutor, Directory, ExecutionError,
    InvocationMode, Shell, ShellExecError, SuccessCodes,
};

fn execution_error(result: shell_exec::Result<String>) -> ExecutionError {
    match result {
        Err(ShellExecError::Execution(err)) => err,
        other => panic!("expected execution error, got {other:?}"),
    }
}

fn dir_with_files(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), "").unwrap();
    }
}

// ============================================================================
// Output Capture Tests
// ============================================================================

#[test]
fn test_captures_standard_output() {
    assert_eq!(
        execute_simple(r#"echo "hello, world""#).unwrap(),
        "hello, world\n"
    );
}

#[test]
fn test_output_without_trailing_newline() {
    assert_eq!(execute_simple("printf 'no newline'").unwrap(), "no newline");
}

#[test]
fn test_executes_multiline_commands() {
    let output = execute_simple("echo \"Hello, world!\"\necho \"Goodbye, moon\"").unwrap();
    assert_eq!(output, "Hello, world!\nGoodbye, moon\n");
}

#[test]
fn test_stderr_not_mixed_into_success_output() {
    assert_eq!(execute_simple("echo out; echo err >&2").unwrap(), "out\n");
}

#[test]
fn test_stdin_is_closed() {
    assert_eq!(execute_simple("cat").unwrap(), "");
}

#[test]
fn test_invalid_utf8_output_is_replaced() {
    assert_eq!(execute_simple(r"printf 'a\377b'").unwrap(), "a\u{fffd}b");
}

// ============================================================================
// Failure Reporting Tests
// ============================================================================

#[test]
fn test_propagates_error_code() {
    let err = execution_error(execute_simple("exit 3"));
    assert_eq!(err.termination_status, 3);
}

#[test]
fn test_propagates_standard_error() {
    let err = execution_error(execute_simple("echo 'went wrong' >&2; exit 1"));
    assert_eq!(err.stderr, "went wrong\n");
    assert_eq!(err.stdout, "");
}

#[test]
fn test_propagates_standard_output() {
    let err = execution_error(execute_simple("echo 'hi'; exit 1"));
    assert_eq!(err.stdout, "hi\n");
    assert_eq!(err.stderr, "");
}

#[test]
fn test_missing_file_reports_both_streams() {
    let err = execution_error(execute_simple("echo before; cat non-existent-file"));
    assert_eq!(err.termination_status, 1);
    assert_eq!(err.stdout, "before\n");
    assert!(err.stderr.contains("non-existent-file"));
}

#[test]
fn test_propagates_command_in_error() {
    let err = execution_error(execute_simple("cat non-existent-file"));
    assert_eq!(err.command, "cat non-existent-file");
}

#[test]
fn test_error_command_is_not_the_wrapped_script() {
    let tmp = TempDir::new().unwrap();
    let cmd = Command::new("exit 9").within(Directory::location(tmp.path()));
    let err = execution_error(CommandExecutor::new().execute_sync(&cmd));
    assert_eq!(err.termination_status, 9);
    assert_eq!(err.command, "exit 9");
}

#[test]
fn test_success_codes_decide_outcome() {
    let accepts_two: SuccessCodes = [2].into();
    let output = execute("echo two; exit 2", &Shell::sh(), &Directory::Current, &accepts_two);
    assert_eq!(output.unwrap(), "two\n");

    let err = execution_error(execute(
        "echo two; exit 2",
        &Shell::sh(),
        &Directory::Current,
        &SuccessCodes::default(),
    ));
    assert_eq!(err.termination_status, 2);
    assert_eq!(err.stdout, "two\n");
}

#[test]
fn test_zero_can_be_a_failure() {
    let err = execution_error(
        CommandExecutor::new().execute_sync(&Command::new("true").success_codes([1])),
    );
    assert_eq!(err.termination_status, 0);
}

#[test]
fn test_spawn_failure_is_distinct() {
    let cmd = Command::new("echo unreachable").shell(Shell::new("/no/such/shell", ["-c"]));
    let result = CommandExecutor::new().execute_sync(&cmd);
    assert!(matches!(result, Err(ShellExecError::Spawn { .. })));
}

// ============================================================================
// Directory Scoping Tests
// ============================================================================

#[test]
fn test_runs_from_directory_when_path_provided() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("scoped");
    dir_with_files(&dir, &["Hello", "world"]);

    let cmd = Command::new("ls").within(Directory::path(dir.to_string_lossy()));
    let output = CommandExecutor::new().execute_sync(&cmd).unwrap();
    assert_eq!(output, "Hello\nworld\n");
}

#[test]
fn test_runs_from_directory_when_location_provided() {
    let tmp = TempDir::new().unwrap();
    dir_with_files(tmp.path(), &["Hello", "world"]);

    let cmd = Command::new("ls").within(Directory::location(tmp.path()));
    let output = CommandExecutor::new().execute_sync(&cmd).unwrap();
    assert_eq!(output, "Hello\nworld\n");
}

#[test]
fn test_runs_from_directory_with_space() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("with space");
    dir_with_files(&dir, &["Hello", "world"]);

    for scope in [
        Directory::location(&dir),
        Directory::path(dir.to_string_lossy()),
    ] {
        let output = CommandExecutor::new()
            .execute_sync(&Command::new("ls").within(scope))
            .unwrap();
        assert_eq!(output, "Hello\nworld\n");
    }
}

#[test]
fn test_runs_from_directory_with_metacharacters() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("it's $HOME; (odd)");
    dir_with_files(&dir, &["only"]);

    let cmd = Command::new("ls").within(Directory::location(&dir));
    assert_eq!(CommandExecutor::new().execute_sync(&cmd).unwrap(), "only\n");
}

#[test]
fn test_directory_change_does_not_leak() {
    let tmp = TempDir::new().unwrap();
    let inner = tmp.path().join("inner");
    dir_with_files(&inner, &["deep"]);

    let script = "cd inner\nls";
    let cmd = Command::new(format!("{script}\ncd ..\nls")).within(Directory::location(tmp.path()));
    assert_eq!(
        CommandExecutor::new().execute_sync(&cmd).unwrap(),
        "deep\ninner\n"
    );
}

#[test]
fn test_missing_directory_fails() {
    let cmd = Command::new("echo never").within(Directory::path("/no/such/dir"));
    let err = execution_error(CommandExecutor::new().execute_sync(&cmd));
    assert_ne!(err.termination_status, 0);
    assert_eq!(err.stdout, "");
    assert!(!err.stderr.is_empty());
}

// ============================================================================
// Large Output Tests
// ============================================================================

#[test]
fn test_large_output_on_both_streams_does_not_deadlock() {
    // 400 KB per stream, far beyond any pipe buffer.
    let command = "yes out | head -n 100000; yes err | head -n 100000 >&2; exit 1";
    let err = execution_error(execute_simple(command));
    assert_eq!(err.stdout.len(), 400_000);
    assert_eq!(err.stderr.len(), 400_000);
    assert!(err.stdout.lines().all(|line| line == "out"));
    assert!(err.stderr.lines().all(|line| line == "err"));
}

#[test]
fn test_large_stderr_before_stdout() {
    let command = "yes err | head -n 100000 >&2; echo done";
    assert_eq!(execute_simple(command).unwrap(), "done\n");
}

// ============================================================================
// Timeout and Invocation Mode Tests
// ============================================================================

#[test]
fn test_timeout_kills_command() {
    let start = Instant::now();
    let cmd = Command::new("exec sleep 10").timeout(Duration::from_millis(200));
    let result = CommandExecutor::new().execute_sync(&cmd);

    assert!(matches!(
        result,
        Err(ShellExecError::Timeout { ref command, .. }) if command == "exec sleep 10"
    ));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[cfg(target_os = "linux")]
#[test]
fn test_timeout_kills_background_jobs() {
    let tmp = TempDir::new().unwrap();
    let pid_file = tmp.path().join("pid");
    let command = format!(
        "sleep 30 &\necho $! > '{}'\nsleep 30\necho never",
        pid_file.display()
    );
    let cmd = Command::new(command).timeout(Duration::from_millis(500));
    let start = Instant::now();
    let result = CommandExecutor::new().execute_sync(&cmd);
    assert!(matches!(result, Err(ShellExecError::Timeout { .. })));
    assert!(start.elapsed() < Duration::from_secs(5));

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let stat = Path::new("/proc").join(pid.trim()).join("stat");
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        // Gone, or a zombie waiting for init to reap it.
        let alive = std::fs::read_to_string(&stat)
            .map(|s| !s.rsplit(')').next().unwrap_or("").trim_start().starts_with('Z'))
            .unwrap_or(false);
        if !alive {
            break;
        }
        assert!(Instant::now() < deadline, "background job {} survived", pid.trim());
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_script_file_mode_matches_inline() {
    let tmp = TempDir::new().unwrap();
    dir_with_files(tmp.path(), &["Hello", "world"]);

    let cmd = Command::new("ls\necho end")
        .within(Directory::location(tmp.path()))
        .mode(InvocationMode::ScriptFile);
    assert_eq!(
        CommandExecutor::new().execute_sync(&cmd).unwrap(),
        "Hello\nworld\nend\n"
    );
}

#[test]
fn test_modes_agree_with_custom_shell_arguments() {
    let shell = Shell::new("/bin/sh", ["-e", "-c"]);
    let script = "echo first\nfalse\necho after";
    let run = |mode| {
        let cmd = Command::new(script).shell(shell.clone()).mode(mode);
        execution_error(CommandExecutor::new().execute_sync(&cmd))
    };

    let inline = run(InvocationMode::Inline);
    let file = run(InvocationMode::ScriptFile);
    assert_eq!(inline.termination_status, 1);
    assert_eq!(inline.stdout, "first\n");
    assert_eq!(file.termination_status, inline.termination_status);
    assert_eq!(file.stdout, inline.stdout);
}

#[test]
fn test_script_file_mode_reports_failure() {
    let cmd = Command::new("echo partial; exit 4").mode(InvocationMode::ScriptFile);
    let err = execution_error(CommandExecutor::new().execute_sync(&cmd));
    assert_eq!(err.termination_status, 4);
    assert_eq!(err.stdout, "partial\n");
    assert_eq!(err.command, "echo partial; exit 4");
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_concurrent_calls_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                execute_simple(&format!("yes {i} | head -n 20000; echo end{i}"))
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let output = handle.join().unwrap().unwrap();
        assert!(output.ends_with(&format!("end{i}\n")));
        assert_eq!(output.lines().count(), 20001);
    }
}

#[test]
fn test_execute_async() {
    let executor = CommandExecutor::new();
    let output = tokio_test::block_on(executor.execute_async(Command::new("echo async"))).unwrap();
    assert_eq!(output, "async\n");
}
