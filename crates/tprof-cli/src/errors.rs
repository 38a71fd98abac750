//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use tprof_analysis::{AnalysisError, EditError};
use tprof_config::ConfigError;
use tprof_syntax::SyntaxError;

use crate::compile_db::CompileDbError;
use crate::output::SinkError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to resolve the record workspace: {0}")]
    Workspace(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    CompileDb(#[from] CompileDbError),
    #[error("failed to make '{}' absolute: {source}", path.display())]
    Absolute { path: PathBuf, source: io::Error },
    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("failed to apply edits: {0}")]
    Edit(#[from] EditError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("{identifier}: {source}")]
    Function {
        identifier: String,
        source: AnalysisError,
    },
}
