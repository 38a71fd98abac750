//! Command-line runtime for the `brace-guard` and `struct-locator` tools.
//!
//! Both binaries share one argument surface and one processing loop: each
//! positional source is parsed with the language its compile command asks
//! for, then handed to the tool's per-function pass. A failing file or
//! function is reported and skipped; the exit code is non-zero when anything
//! failed. The runtime takes its IO streams and configuration loader as
//! parameters so tests can drive it in-process.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{CommandFactory, FromArgMatches};
use tracing::{debug, info, warn};

use tprof_analysis::{
    BraceGuardEngine, DiscardSink, DriverReport, FunctionUnitDriver, StructuralExtractor,
};
use tprof_config::Config;
use tprof_syntax::{SupportedLanguage, TranslationUnit};

mod cli;
mod compile_db;
mod config;
mod errors;
pub mod output;
mod telemetry;

pub use cli::Tool;
pub use compile_db::{
    CompilationDatabase, CompileCommand, CompileCommands, CompileDbError, DATABASE_FILE_NAME,
    FIXED_DRIVER, language_from_arguments,
};
pub use telemetry::TelemetryError;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader};
use errors::AppError;
use output::{CstDirectorySink, write_patched};

const RUN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");

/// Diagnostic written to stderr after each brace-guarded file.
pub const END_SOURCE_MARKER: &str = "** EndSourceFileAction for:";

/// Bundles the IO streams provided to the runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }

    fn error_line(&mut self, message: impl fmt::Display) {
        let _ = writeln!(self.stderr, "{message}");
    }
}

/// A file or function that could not be processed.
#[derive(Debug)]
struct Failure {
    source: Utf8PathBuf,
    error: AppError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Per-run output state shared across all sources.
enum ToolState {
    BraceGuard,
    StructLocator(CstDirectorySink),
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    tool: Tool,
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(tool: Tool, io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { tool, io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let cli = match self.parse(args) {
            Ok(cli) => cli,
            Err(exit_code) => return exit_code,
        };

        match self.execute(&cli) {
            Ok(failures) if failures.is_empty() => ExitCode::SUCCESS,
            Ok(failures) => {
                self.io
                    .error_line(format_args!("{} failure(s):", failures.len()));
                for failure in &failures {
                    self.io.error_line(format_args!("  {failure}"));
                }
                ExitCode::FAILURE
            }
            Err(error) => {
                self.io.error_line(error);
                ExitCode::FAILURE
            }
        }
    }

    /// Parses `args`, writing help and usage errors to the right stream.
    fn parse<I>(&mut self, args: I) -> Result<Cli, ExitCode>
    where
        I: IntoIterator<Item = OsString>,
    {
        let command = Cli::command()
            .name(self.tool.name())
            .bin_name(self.tool.name())
            .about(self.tool.about())
            .version(env!("CARGO_PKG_VERSION"));
        let parsed = command
            .try_get_matches_from(args)
            .and_then(|matches| Cli::from_arg_matches(&matches));
        match parsed {
            Ok(cli) => Ok(cli),
            Err(error) if error.use_stderr() => {
                self.io.error_line(AppError::CliUsage(error));
                Err(ExitCode::FAILURE)
            }
            Err(error) => {
                let _ = write!(self.io.stdout, "{}", error.render());
                Err(ExitCode::SUCCESS)
            }
        }
    }

    fn execute(&mut self, cli: &Cli) -> Result<Vec<Failure>, AppError> {
        let config = self
            .loader
            .load(&cli.config.to_arguments(self.tool.name()))?;
        telemetry::initialise(&config)?;

        let commands = resolve_compile_commands(cli)?;
        let mut state = self.tool_state(&config)?;
        let mut failures = Vec::new();
        for source in &cli.sources {
            if let Err(error) = self.process(cli, &commands, &mut state, source, &mut failures) {
                warn!(target: RUN_TARGET, source = %source, error = %error, "source failed");
                failures.push(Failure {
                    source: source.clone(),
                    error,
                });
            }
        }
        Ok(failures)
    }

    fn tool_state(&self, config: &Config) -> Result<ToolState, AppError> {
        match self.tool {
            Tool::BraceGuard => Ok(ToolState::BraceGuard),
            Tool::StructLocator => {
                let workspace = config.workspace()?;
                if workspace.is_fallback() {
                    warn!(
                        target: RUN_TARGET,
                        path = %workspace.path(),
                        "TPROF_WORKSPACE is not set; writing records to the current directory"
                    );
                }
                Ok(ToolState::StructLocator(CstDirectorySink::new(
                    workspace.path().clone(),
                )))
            }
        }
    }

    fn process(
        &mut self,
        cli: &Cli,
        commands: &CompileCommands,
        state: &mut ToolState,
        source: &Utf8Path,
        failures: &mut Vec<Failure>,
    ) -> Result<(), AppError> {
        let language = source_language(cli, commands, source)?;
        let unit = TranslationUnit::read(source.as_std_path(), language)?;
        debug!(
            target: RUN_TARGET,
            source = %source,
            language = %unit.language(),
            functions = unit.functions().len(),
            "source parsed"
        );
        let driver = FunctionUnitDriver::new(&unit);

        let report = match state {
            ToolState::BraceGuard => {
                let mut engine = BraceGuardEngine::new();
                let guarded = driver.run(&mut engine, &mut DiscardSink);
                let outcome = engine.finish(unit.sources().main_file().text())?;
                let patched = write_patched(source, &outcome.patched)?;
                info!(
                    target: RUN_TARGET,
                    source = %source,
                    output = %patched,
                    edits = outcome.edits,
                    unprocessable = outcome.unprocessable.len(),
                    "source guarded"
                );
                self.io
                    .error_line(format_args!("{END_SOURCE_MARKER} {source}"));
                guarded
            }
            ToolState::StructLocator(sink) => driver.run(&mut StructuralExtractor, sink),
        };

        record_function_failures(source, report, failures);
        Ok(())
    }
}

fn record_function_failures(source: &Utf8Path, report: DriverReport, failures: &mut Vec<Failure>) {
    failures.extend(report.failures.into_iter().map(|failure| Failure {
        source: source.to_path_buf(),
        error: AppError::Function {
            identifier: failure.identifier,
            source: failure.error,
        },
    }));
}

/// Chooses where compile commands come from for this run.
fn resolve_compile_commands(cli: &Cli) -> Result<CompileCommands, AppError> {
    if !cli.compiler_args.is_empty() {
        return Ok(CompileCommands::fixed(&cli.compiler_args));
    }

    if let Some(build_path) = &cli.build_path {
        if !build_path.join(DATABASE_FILE_NAME).is_file() {
            warn!(
                target: RUN_TARGET,
                build_path = %build_path,
                "no compilation database found; using file extension defaults"
            );
            return Ok(CompileCommands::None);
        }
        return Ok(CompileCommands::Database(CompilationDatabase::load(
            build_path,
        )?));
    }

    let Some(first) = cli.sources.first() else {
        return Ok(CompileCommands::None);
    };
    let start = absolute(first)?;
    let Some(directory) = start.parent() else {
        return Ok(CompileCommands::None);
    };
    let Some(database) = CompilationDatabase::discover(directory)? else {
        debug!(target: RUN_TARGET, "no compilation database discovered");
        return Ok(CompileCommands::None);
    };
    Ok(CompileCommands::Database(database))
}

/// The language `source` should be parsed as, or `None` for the extension
/// default.
fn source_language(
    cli: &Cli,
    commands: &CompileCommands,
    source: &Utf8Path,
) -> Result<Option<SupportedLanguage>, AppError> {
    let path = absolute(source)?;
    let command = commands.arguments_for(&path);
    if command.is_none() && matches!(commands, CompileCommands::Database(_)) {
        warn!(
            target: RUN_TARGET,
            source = %source,
            "no compile command for source; using file extension default"
        );
    }

    let (driver, rest) = command
        .and_then(<[String]>::split_first)
        .map_or(("", &[][..]), |(driver, rest)| (driver.as_str(), rest));
    let arguments: Vec<String> = std::iter::once(driver.to_owned())
        .chain(cli.extra_args_before.iter().cloned())
        .chain(rest.iter().cloned())
        .chain(cli.extra_args.iter().cloned())
        .collect();
    Ok(language_from_arguments(&arguments))
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf, AppError> {
    let resolved = std::path::absolute(path).map_err(|source| AppError::Absolute {
        path: path.as_std_path().to_path_buf(),
        source,
    })?;
    Utf8PathBuf::from_path_buf(resolved).map_err(|other| AppError::NonUtf8Path { path: other })
}

/// Runs `tool` using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(tool: Tool, args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(tool, args, &mut io, &OrthoConfigLoader)
}

/// Runs `tool` with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    tool: Tool,
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(tool, io, loader).run(args)
}

#[cfg(test)]
mod tests;
