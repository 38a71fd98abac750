//! Per-function pass driver.
//!
//! The driver selects the function definitions worth analysing in a
//! translation unit, names each one with its stable identifier, runs a
//! [`FunctionPass`] over it and hands the result to a [`RecordSink`].
//! Failures are collected per function so that one bad function does not
//! stop the rest of the file.

use std::convert::Infallible;
use std::fmt;

use tracing::{debug, warn};

use tprof_syntax::{
    FunctionDecl, NameMangler, SourceFile, SourceLocation, SourceManager, Stmt, TranslationUnit,
};

use crate::error::AnalysisError;

const DRIVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::driver");

/// One function definition prepared for a pass.
#[derive(Debug, Clone)]
pub struct FunctionUnit<'u> {
    function: &'u FunctionDecl,
    body: &'u Stmt,
    identifier: String,
    sources: &'u SourceManager,
    file: &'u SourceFile,
}

impl<'u> FunctionUnit<'u> {
    /// Prepares `function` for analysis under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingBody`] for declarations without a
    /// body and [`AnalysisError::UnknownFile`] when the function's file is
    /// not registered with `sources`.
    pub fn new(
        function: &'u FunctionDecl,
        identifier: impl Into<String>,
        sources: &'u SourceManager,
    ) -> Result<Self, AnalysisError> {
        let name = identifier.into();
        let Some(body) = function.body() else {
            return Err(AnalysisError::MissingBody { function: name });
        };
        let Some(file) = sources.file(function.location().file()) else {
            return Err(AnalysisError::UnknownFile { function: name });
        };
        Ok(Self {
            function,
            body,
            identifier: name,
            sources,
            file,
        })
    }

    /// The function declaration.
    #[must_use]
    pub const fn function(&self) -> &'u FunctionDecl {
        self.function
    }

    /// The function body.
    #[must_use]
    pub const fn body(&self) -> &'u Stmt {
        self.body
    }

    /// The stable identifier of the function.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The source manager of the translation unit.
    #[must_use]
    pub const fn sources(&self) -> &'u SourceManager {
        self.sources
    }

    /// The file containing the function.
    #[must_use]
    pub const fn file(&self) -> &'u SourceFile {
        self.file
    }

    /// One-based line of `location` within the function's file.
    #[must_use]
    pub fn line_of(&self, location: SourceLocation) -> u32 {
        self.file.line_column(location.offset()).line
    }
}

/// A per-function analysis.
pub trait FunctionPass {
    /// What the pass produces for one function.
    type Output;

    /// Runs the pass over one function.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalysisError`] when the function cannot be processed.
    fn run(&mut self, unit: &FunctionUnit<'_>) -> Result<Self::Output, AnalysisError>;
}

/// Receives pass results as soon as each function is done.
pub trait RecordSink<T> {
    /// Failure raised while recording.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Records the output of one function.
    ///
    /// # Errors
    ///
    /// Returns the sink's error when the record cannot be stored.
    fn accept(&mut self, record: T) -> Result<(), Self::Error>;
}

impl<T> RecordSink<T> for Vec<T> {
    type Error = Infallible;

    fn accept(&mut self, record: T) -> Result<(), Self::Error> {
        self.push(record);
        Ok(())
    }
}

/// Sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl<T> RecordSink<T> for DiscardSink {
    type Error = Infallible;

    fn accept(&mut self, _record: T) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A function the driver could not process.
#[derive(Debug)]
pub struct FunctionFailure {
    /// Stable identifier of the function.
    pub identifier: String,
    /// What went wrong.
    pub error: AnalysisError,
}

impl fmt::Display for FunctionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.error)
    }
}

/// Summary of one driver run.
#[derive(Debug, Default)]
pub struct DriverReport {
    /// Functions handed to the pass.
    pub visited: usize,
    /// Declarations filtered out before the pass.
    pub skipped: usize,
    /// Functions whose pass or sink failed.
    pub failures: Vec<FunctionFailure>,
}

impl DriverReport {
    /// Whether every visited function was processed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs function passes over the definitions of one translation unit.
#[derive(Debug)]
pub struct FunctionUnitDriver<'u> {
    unit: &'u TranslationUnit,
    mangler: NameMangler,
}

impl<'u> FunctionUnitDriver<'u> {
    /// Creates a driver over `unit`.
    #[must_use]
    pub const fn new(unit: &'u TranslationUnit) -> Self {
        Self {
            unit,
            mangler: NameMangler::new(unit.language()),
        }
    }

    /// Returns whether `function` should be analysed: it must be a
    /// definition with a body located in the unit's main file.
    #[must_use]
    pub fn is_candidate(&self, function: &FunctionDecl) -> bool {
        function.body().is_some()
            && function.is_definition()
            && self.unit.sources().is_in_main_file(function.location())
    }

    /// Functions that pass [`FunctionUnitDriver::is_candidate`], in source
    /// order.
    pub fn candidates(&self) -> impl Iterator<Item = &'u FunctionDecl> {
        self.unit
            .functions()
            .iter()
            .filter(|function| self.is_candidate(function))
    }

    /// Stable identifier used to key output for `function`.
    #[must_use]
    pub fn identifier(&self, function: &FunctionDecl) -> String {
        self.mangler.stable_name(function)
    }

    /// Runs `pass` over every candidate and records each output in `sink`.
    pub fn run<P, S>(&self, pass: &mut P, sink: &mut S) -> DriverReport
    where
        P: FunctionPass,
        S: RecordSink<P::Output>,
    {
        let mut report = DriverReport::default();
        for function in self.unit.functions() {
            if !self.is_candidate(function) {
                debug!(
                    target: DRIVER_TARGET,
                    function = %function.qualified_name(),
                    "skipping declaration"
                );
                report.skipped += 1;
                continue;
            }

            let identifier = self.identifier(function);
            report.visited += 1;
            match self.run_one(pass, sink, function, &identifier) {
                Ok(()) => debug!(
                    target: DRIVER_TARGET,
                    function = %identifier,
                    "function processed"
                ),
                Err(error) => {
                    warn!(
                        target: DRIVER_TARGET,
                        function = %identifier,
                        error = %error,
                        "function failed"
                    );
                    report.failures.push(FunctionFailure { identifier, error });
                }
            }
        }
        report
    }

    fn run_one<P, S>(
        &self,
        pass: &mut P,
        sink: &mut S,
        function: &FunctionDecl,
        identifier: &str,
    ) -> Result<(), AnalysisError>
    where
        P: FunctionPass,
        S: RecordSink<P::Output>,
    {
        let unit = FunctionUnit::new(function, identifier, self.unit.sources())?;
        let output = pass.run(&unit)?;
        sink.accept(output)
            .map_err(|error| AnalysisError::sink(identifier, error))
    }
}
