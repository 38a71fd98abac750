//! Resolution of the directory that receives per-function fact records.

use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;

use crate::error::ConfigError;

/// Where the workspace directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceSource {
    /// The `--workspace` flag or the workspace environment variable.
    Configured,
    /// The process's working directory, used when the setting is unset or
    /// empty.
    CurrentDirectory,
}

/// The resolved workspace directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: Utf8PathBuf,
    source: WorkspaceSource,
}

impl Workspace {
    /// Creates a workspace rooted at `path`.
    #[must_use]
    pub const fn new(path: Utf8PathBuf, source: WorkspaceSource) -> Self {
        Self { path, source }
    }

    /// Resolves the workspace from the configured directory, falling back to
    /// `current_dir` when it is unset or empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CurrentDirectory`] when the working directory
    /// cannot be determined and [`ConfigError::NonUtf8Workspace`] when it is
    /// not valid UTF-8.
    pub fn resolve(
        configured: Option<Utf8PathBuf>,
        current_dir: impl FnOnce() -> io::Result<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = configured.filter(|path| !path.as_str().is_empty()) {
            return Ok(Self::new(path, WorkspaceSource::Configured));
        }
        let cwd = current_dir().map_err(ConfigError::CurrentDirectory)?;
        let path = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|path| ConfigError::NonUtf8Workspace { path })?;
        Ok(Self::new(path, WorkspaceSource::CurrentDirectory))
    }

    /// The workspace directory.
    #[must_use]
    pub const fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    /// Where the directory came from.
    #[must_use]
    pub const fn source(&self) -> WorkspaceSource {
        self.source
    }

    /// Whether the working directory was substituted for a missing
    /// setting.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, WorkspaceSource::CurrentDirectory)
    }
}
