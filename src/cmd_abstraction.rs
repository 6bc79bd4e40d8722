//! Seam between the reload step and the processes it starts.

use anyhow::{Context, Result};
use std::process::{Command, Output, Stdio};

#[cfg(test)]
use mockall::automock;

/// What a finished process left behind.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status was zero
    pub success: bool,
    /// `None` when killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Most useful text for an error message: stderr, else stdout.
    ///
    /// `birdc` reports parse errors on stdout and socket errors on stderr.
    pub fn detail(&self) -> &str {
        match self.stderr.trim() {
            "" => self.stdout.trim(),
            err => err,
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs.
///
/// `Err` means the program never ran (missing binary, permissions); a
/// non-zero exit comes back as an `Ok` output with `success == false`.
#[cfg_attr(test, automock)]
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput>;
}

/// [`CommandExecutor`] backed by `std::process::Command`, stdin closed.
#[derive(Debug, Clone, Default)]
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput> {
        Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map(CommandOutput::from)
            .with_context(|| format!("Cannot run {}", cmd))
    }
}
