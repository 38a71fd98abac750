//! Runtime configuration shared by the tprof instrumentation tools.
//!
//! [`Config`] is layered by `ortho_config`: command-line flags override
//! `TPROF_`-prefixed environment variables, which override the built-in
//! defaults.
//!
//! | Setting    | Flag           | Environment        | Default               |
//! |------------|----------------|--------------------|-----------------------|
//! | log filter | `--log-filter` | `TPROF_LOG_FILTER` | `warn`                |
//! | log format | `--log-format` | `TPROF_LOG_FORMAT` | `compact`             |
//! | workspace  | `--workspace`  | `TPROF_WORKSPACE`  | the working directory |
//!
//! The workspace fallback is applied after loading by [`Config::workspace`].

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use clap::Args;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod error;
mod logging;
mod workspace;

pub use defaults::{
    DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LOG_FORMAT_ENV, WORKSPACE_ENV, default_log_filter,
    default_log_format,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
pub use workspace::{Workspace, WorkspaceSource};

/// Runtime configuration for both tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TPROF")]
pub struct Config {
    /// Tracing filter directive.
    #[ortho_config(default = default_log_filter().to_owned())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Directory receiving per-function fact records.
    pub workspace: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            workspace: None,
        }
    }
}

impl Config {
    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Resolves the record workspace, falling back to the process's working
    /// directory.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve_workspace`].
    pub fn workspace(&self) -> Result<Workspace, ConfigError> {
        self.resolve_workspace(std::env::current_dir)
    }

    /// Resolves the record workspace with `current_dir` as the fallback for
    /// an unset or empty setting.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the fallback directory cannot be
    /// determined or is not valid UTF-8.
    pub fn resolve_workspace<C>(&self, current_dir: C) -> Result<Workspace, ConfigError>
    where
        C: FnOnce() -> io::Result<PathBuf>,
    {
        Workspace::resolve(self.workspace.clone(), current_dir)
    }
}

/// Configuration flags accepted by the tools' command line.
///
/// Values are forwarded verbatim to the `ortho_config` loader, which owns
/// their validation and precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ConfigOverrides {
    /// Tracing filter directive, for example `info` or `tprof_analysis=debug`.
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
    /// Log output format: `compact` or `json`.
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,
    /// Directory receiving per-function fact records.
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<Utf8PathBuf>,
}

impl ConfigOverrides {
    /// Renders the overrides as the argument vector [`Config::load_from_iter`]
    /// expects, with `program` in the first position.
    #[must_use]
    pub fn to_arguments(&self, program: &str) -> Vec<OsString> {
        let mut arguments = vec![OsString::from(program)];
        if let Some(filter) = &self.log_filter {
            arguments.extend([OsString::from("--log-filter"), OsString::from(filter)]);
        }
        if let Some(format) = &self.log_format {
            arguments.extend([OsString::from("--log-format"), OsString::from(format)]);
        }
        if let Some(workspace) = &self.workspace {
            arguments.extend([
                OsString::from("--workspace"),
                OsString::from(workspace.as_str()),
            ]);
        }
        arguments
    }
}
