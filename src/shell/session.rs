use crate::error::{Result, ShellError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-shell working directory.
///
/// The shell never touches the process-wide current directory; every
/// command resolves paths against the session instead.
#[derive(Debug, Clone)]
pub struct Session {
    cwd: PathBuf,
}

impl Session {
    pub fn new<P: AsRef<Path>>(start: P) -> Result<Self> {
        let cwd = fs::canonicalize(start.as_ref())?;
        if !cwd.is_dir() {
            return Err(ShellError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a directory", cwd.display()),
            )));
        }
        Ok(Self { cwd })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn prompt(&self) -> String {
        format!("{} $ ", self.cwd.display())
    }

    /// Move to `target`, absolute or relative to the current directory.
    /// On failure the session stays where it was.
    pub fn change_dir(&mut self, target: &str) -> Result<()> {
        let candidate = self.cwd.join(target);
        let resolved = fs::canonicalize(&candidate).map_err(|e| ShellError::DirectoryChange {
            dir: target.to_string(),
            reason: describe_io_error(&e),
        })?;

        if !resolved.is_dir() {
            return Err(ShellError::DirectoryChange {
                dir: target.to_string(),
                reason: "Not a directory".to_string(),
            });
        }

        tracing::debug!(from = %self.cwd.display(), to = %resolved.display(), "changing directory");
        self.cwd = resolved;
        Ok(())
    }

    /// Entry names of the current directory, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = fs::read_dir(&self.cwd)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}

fn describe_io_error(error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => error.to_string(),
    }
}
