//! Structural fact extraction: loop ranges and direct call sites.

use std::fmt;

use tprof_syntax::Stmt;

use crate::classify::{Classified, classify};
use crate::driver::{FunctionPass, FunctionUnit};
use crate::error::AnalysisError;
use crate::walk::walk;

/// One structural observation within a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    /// A loop statement spanning the given lines.
    Loop {
        /// Line of the loop's first token.
        start_line: u32,
        /// Line of the loop's last token.
        end_line: u32,
    },
    /// A call to a statically named function.
    Call {
        /// Unqualified name of the callee.
        callee: String,
        /// Line of the call's first token.
        start_line: u32,
        /// Line of the call's last token.
        end_line: u32,
    },
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loop {
                start_line,
                end_line,
            } => write!(f, "LOOP LOOP {start_line} {end_line}"),
            Self::Call {
                callee,
                start_line,
                end_line,
            } => write!(f, "CALL {callee} {start_line} {end_line}"),
        }
    }
}

/// The facts gathered for one function.
///
/// The [`Display`](fmt::Display) rendering is the record file format: the
/// identifier, the source file name, one line per fact and a closing blank
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    identifier: String,
    source_file: String,
    facts: Vec<Fact>,
}

impl FunctionRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(identifier: String, source_file: String, facts: Vec<Fact>) -> Self {
        Self {
            identifier,
            source_file,
            facts,
        }
    }

    /// Stable identifier of the function.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Name of the file the function was found in.
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Facts in source pre-order.
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }
}

impl fmt::Display for FunctionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.identifier)?;
        writeln!(f, "{}", self.source_file)?;
        for fact in &self.facts {
            writeln!(f, "{fact}")?;
        }
        writeln!(f)
    }
}

/// Emits a [`FunctionRecord`] per function.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralExtractor;

impl StructuralExtractor {
    /// Collects the facts below `body` in pre-order.
    #[must_use]
    pub fn facts(unit: &FunctionUnit<'_>, body: &Stmt) -> Vec<Fact> {
        let mut facts = Vec::new();
        walk(body, &mut |node, _depth| {
            let span = node.span();
            let start_line = unit.line_of(span.start());
            let end_line = unit.line_of(span.end());
            match classify(node) {
                Classified::Loop { .. } => facts.push(Fact::Loop {
                    start_line,
                    end_line,
                }),
                Classified::Call {
                    callee: Some(callee),
                } => facts.push(Fact::Call {
                    callee: callee.to_owned(),
                    start_line,
                    end_line,
                }),
                Classified::Call { callee: None }
                | Classified::Conditional { .. }
                | Classified::Other => {}
            }
        });
        facts
    }
}

impl FunctionPass for StructuralExtractor {
    type Output = FunctionRecord;

    fn run(&mut self, unit: &FunctionUnit<'_>) -> Result<Self::Output, AnalysisError> {
        Ok(FunctionRecord::new(
            unit.identifier().to_owned(),
            unit.file().name().to_owned(),
            Self::facts(unit, unit.body()),
        ))
    }
}
