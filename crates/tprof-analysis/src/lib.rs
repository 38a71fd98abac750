//! Analysis core shared by the tprof instrumentation tools.
//!
//! The core consumes the [`tprof_syntax::TranslationUnit`] produced by the
//! front end and never touches grammar-specific node names. Its components,
//! leaves first:
//!
//! - [`SpanResolver`] recovers insertion offsets by a bounded byte scan of
//!   the raw text.
//! - [`classify`] views a statement as a loop, conditional, call or other.
//! - [`walk`] visits a body's descendants depth-first in source order.
//! - [`EditBuffer`] holds insertions and applies them once to the original
//!   text.
//! - [`BraceGuardEngine`] and [`StructuralExtractor`] are the two
//!   [`FunctionPass`] implementations.
//! - [`FunctionUnitDriver`] selects the definitions in the main file and
//!   runs a pass over each, handing results to a [`RecordSink`].
//!
//! ```ignore
//! let unit = TranslationUnit::parse("loop.c", source, SupportedLanguage::C)?;
//! let mut engine = BraceGuardEngine::new();
//! let report = FunctionUnitDriver::new(&unit).run(&mut engine, &mut DiscardSink);
//! let outcome = engine.finish(unit.sources().main_file().text())?;
//! ```

mod classify;
mod driver;
mod edit;
mod error;
mod extract;
mod guard;
mod span;
mod walk;

pub use classify::{Classified, LoopKind, classify, is_conditional};
pub use driver::{
    DiscardSink, DriverReport, FunctionFailure, FunctionPass, FunctionUnit, FunctionUnitDriver,
    RecordSink,
};
pub use edit::{Edit, EditBuffer};
pub use error::{AnalysisError, EditError, SpanError};
pub use extract::{Fact, FunctionRecord, StructuralExtractor};
pub use guard::{BraceGuardEngine, CLOSE_GUARD, GuardOutcome, OPEN_GUARD, Unprocessable};
pub use span::{Direction, SpanResolver};
pub use walk::walk;

#[cfg(test)]
mod tests;
