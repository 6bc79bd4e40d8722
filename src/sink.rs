//! Destinations for the rendered route file.
//!
//! The route computation never sees a path; it hands a finished text blob
//! to a [`RouteSink`].

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[cfg(test)]
use mockall::automock;

/// Mode of the written route file (BIRD usually runs as its own user)
const ROUTE_FILE_MODE: u32 = 0o644;

/// Trait for route file destinations, allowing dependency injection for testing.
#[cfg_attr(test, automock)]
pub trait RouteSink: Send + Sync {
    /// Replace the destination contents with `contents`.
    fn write(&self, contents: &str) -> Result<()>;

    /// Human-readable destination, for logs and alerts.
    fn describe(&self) -> String;
}

/// Writes the route file atomically (temp file in the same directory + rename).
///
/// Readers such as `birdc configure` see either the old file or the new one,
/// never a truncated mix.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteSink for FileSink {
    fn write(&self, contents: &str) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;

        let mut temp_file = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(ROUTE_FILE_MODE))?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(&self.path)
            .with_context(|| format!("Failed to persist route file: {:?}", self.path))?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Prints the route file to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl RouteSink for StdoutSink {
    fn write(&self, contents: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(contents.as_bytes())
            .context("Failed to write routes to stdout")?;
        lock.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}
