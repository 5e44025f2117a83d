//! Script-file invocation mode.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::shell::Shell;
use crate::Result;

/// A built script written to a uniquely named temporary file.
///
/// The file is removed when the value is dropped or closed.
#[derive(Debug)]
pub(crate) struct ScriptFile {
    path: TempPath,
}

impl ScriptFile {
    /// Write `script` to a new owner-executable file interpreted by `shell`.
    pub(crate) fn create(shell: &Shell, script: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("shell-exec-")
            .suffix(".sh")
            .tempfile()?;
        write!(file, "#!{}", shell.program().display())?;
        // The kernel passes everything after the interpreter as one argument.
        if !shell.file_arguments().is_empty() {
            write!(file, " {}", shell.file_arguments().join(" "))?;
        }
        writeln!(file)?;
        file.write_all(script.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;

        // Close the write handle before anything runs the file.
        let path = file.into_temp_path();
        make_executable(&path)?;
        debug!(path = %path.display(), "wrote script file");
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file, logging rather than failing if that goes wrong.
    pub(crate) fn close(self) {
        let shown = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            warn!(path = %shown, error = %e, "failed to remove script file");
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
