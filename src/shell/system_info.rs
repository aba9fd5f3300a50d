use crate::error::{Result, ShellError};
use std::process::{Command, Stdio};

/// External utility run by `uptime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    program: String,
    args: Vec<String>,
}

impl SystemInfo {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// `systeminfo` on Windows, `uptime` everywhere else.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::new("systeminfo")
        } else {
            Self::new("uptime")
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the utility to completion and return its standard output.
    pub fn run(&self) -> Result<String> {
        tracing::debug!(program = %self.program, "running system info utility");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| ShellError::SystemInfo {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            tracing::warn!(program = %self.program, status = %output.status, "utility exited unsuccessfully");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::platform_default()
    }
}
