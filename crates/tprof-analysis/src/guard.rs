//! Brace guarding of single-statement loop and branch bodies.
//!
//! Every loop body and `if`/`else` branch that is not already a compound
//! block receives an opening `{` after its header and a closing `\n}` after
//! its terminating `;`. Compound bodies are left alone, so running the
//! engine over its own output produces no edits.
//!
//! An `else` whose branch is another `if` is not guarded itself; the nested
//! conditional's branches are guarded when the walk reaches them.

use std::fmt;

use tracing::{debug, warn};

use tprof_syntax::{LineColumn, SourceManager, Stmt};

use crate::classify::{Classified, classify, is_conditional};
use crate::driver::{FunctionPass, FunctionUnit};
use crate::edit::EditBuffer;
use crate::error::{AnalysisError, EditError, SpanError};
use crate::span::{Direction, SpanResolver};
use crate::walk::walk;

const GUARD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::guard");

/// Text inserted before a guarded body.
pub const OPEN_GUARD: &str = "{";
/// Text inserted after a guarded body.
pub const CLOSE_GUARD: &str = "\n}";

/// A body the engine could not guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unprocessable {
    /// Stable identifier of the enclosing function.
    pub function: String,
    /// Position of the body's first token.
    pub location: LineColumn,
    /// Why the insertion points could not be found.
    pub error: SpanError,
}

impl fmt::Display for Unprocessable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.function, self.location, self.error)
    }
}

/// Result of guarding one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// The patched file text.
    pub patched: String,
    /// Number of insertions applied.
    pub edits: usize,
    /// Bodies left unguarded.
    pub unprocessable: Vec<Unprocessable>,
}

/// Collects guard insertions for every function of one file.
///
/// Run the engine over each function through the driver, then call
/// [`BraceGuardEngine::finish`] with the file's original text.
#[derive(Debug, Default)]
pub struct BraceGuardEngine {
    buffer: EditBuffer,
    unprocessable: Vec<Unprocessable>,
}

impl BraceGuardEngine {
    /// Creates an engine with no pending edits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: EditBuffer::new(),
            unprocessable: Vec::new(),
        }
    }

    /// The edits recorded so far.
    #[must_use]
    pub const fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// Bodies that could not be guarded so far.
    #[must_use]
    pub fn unprocessable(&self) -> &[Unprocessable] {
        &self.unprocessable
    }

    /// Applies the recorded edits to `original`.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] when the edits do not fit `original`.
    pub fn finish(self, original: &str) -> Result<GuardOutcome, EditError> {
        let edits = self.buffer.len();
        let patched = self.buffer.apply(original)?;
        Ok(GuardOutcome {
            patched,
            edits,
            unprocessable: self.unprocessable,
        })
    }

    fn guard(
        &mut self,
        unit: &FunctionUnit<'_>,
        resolver: &SpanResolver<'_>,
        body: &Stmt,
        header_terminator: char,
    ) {
        if body.is_compound() {
            return;
        }
        match guard_offsets(unit.sources(), resolver, body, header_terminator) {
            Ok((open, close)) => {
                debug!(
                    target: GUARD_TARGET,
                    function = unit.identifier(),
                    open,
                    close,
                    "guarding body"
                );
                self.buffer.insert(open, OPEN_GUARD);
                self.buffer.insert(close, CLOSE_GUARD);
            }
            Err(error) => {
                let location = unit.file().line_column(body.span().start().offset());
                warn!(
                    target: GUARD_TARGET,
                    function = unit.identifier(),
                    %location,
                    %error,
                    "cannot guard body"
                );
                self.unprocessable.push(Unprocessable {
                    function: unit.identifier().to_owned(),
                    location,
                    error,
                });
            }
        }
    }
}

/// Finds the opening and closing insertion offsets for `body`.
///
/// Both offsets are resolved before either is used, so a failure never
/// produces half a guard.
fn guard_offsets(
    sources: &SourceManager,
    resolver: &SpanResolver<'_>,
    body: &Stmt,
    header_terminator: char,
) -> Result<(usize, usize), SpanError> {
    let open = resolver.resolve(
        body.span().start().offset(),
        header_terminator,
        Direction::Backward,
    )?;

    let last_token = body.span().end();
    let after_last = sources.token_end(last_token).offset();
    let close = if resolver.text().as_bytes().get(last_token.offset()) == Some(&b'}') {
        after_last
    } else {
        resolver.resolve(after_last, ';', Direction::Forward)?
    };
    Ok((open, close))
}

impl FunctionPass for BraceGuardEngine {
    /// Number of insertions recorded for the function.
    type Output = usize;

    fn run(&mut self, unit: &FunctionUnit<'_>) -> Result<Self::Output, AnalysisError> {
        let file = unit.file();
        let resolver =
            SpanResolver::new(file.text(), unit.function().extent()).with_comments(file.comments());
        let before = self.buffer.len();

        walk(unit.body(), &mut |node, _depth| match classify(node) {
            Classified::Loop {
                kind,
                body: Some(body),
            } => self.guard(unit, &resolver, body, kind.header_terminator()),
            Classified::Conditional {
                then_branch,
                else_branch,
            } => {
                if let Some(branch) = then_branch {
                    self.guard(unit, &resolver, branch, ')');
                }
                if let Some(branch) = else_branch
                    && !is_conditional(branch)
                {
                    self.guard(unit, &resolver, branch, 'e');
                }
            }
            Classified::Loop { body: None, .. } | Classified::Call { .. } | Classified::Other => {}
        });

        Ok(self.buffer.len().saturating_sub(before))
    }
}
