use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving settings that `ortho_config` does not load.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The fallback workspace directory is not valid UTF-8.
    #[error("workspace directory '{}' is not valid UTF-8", path.display())]
    NonUtf8Workspace {
        /// The offending path.
        path: PathBuf,
    },

    /// The working directory could not be determined.
    #[error("failed to determine the current directory: {0}")]
    CurrentDirectory(#[source] std::io::Error),
}
