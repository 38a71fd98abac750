//! Tree-sitter powered front end for the tprof instrumentation tools.
//!
//! This crate turns a C or C++ source file into a [`TranslationUnit`]: a
//! [`SourceManager`] owning the file text, and the list of
//! [`FunctionDecl`]s found in it with their bodies lowered into [`Stmt`]
//! trees. It also provides the services the analysis passes consume:
//!
//! - **Line mapping** via [`SourceManager::line`]
//! - **End-of-token resolution** via [`SourceManager::token_end`], which
//!   re-lexes the raw text since spans end at the *start* of a node's last
//!   token
//! - **Stable naming** via [`NameMangler`], which keys per-function output
//!
//! # Supported Languages
//!
//! - C (`.c`, `.h`, `.i`)
//! - C++ (`.cc`, `.cpp`, `.cxx`, `.c++`, `.hh`, `.hpp`, `.hxx`, …)
//!
//! # Example
//!
//! ```
//! use tprof_syntax::{StmtKind, SupportedLanguage, TranslationUnit};
//!
//! let unit = TranslationUnit::parse(
//!     "loop.c",
//!     "void run(int n) { for (int i = 0; i < n; i++) work(i); }",
//!     SupportedLanguage::C,
//! )?;
//!
//! let run = &unit.functions()[0];
//! let body = run.body().expect("definition");
//! let first = body.child(0).expect("statement");
//! assert!(matches!(first.kind(), StmtKind::For { .. }));
//! # Ok::<(), tprof_syntax::SyntaxError>(())
//! ```
//!
//! Files containing syntax errors are rejected with
//! [`SyntaxError::InvalidSource`]: error recovery would leave spans that do
//! not correspond to the written text.

mod error;
mod language;
mod lexer;
mod lower;
mod mangle;
mod parser;
mod position;
mod source;
mod tree;
mod types;
mod unit;

pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use mangle::NameMangler;
pub use position::LineColumn;
pub use source::{FileId, SourceFile, SourceLocation, SourceManager, SourceSpan};
pub use tree::{Callee, Stmt, StmtKind};
pub use types::{BuiltinType, Qualifiers, TemplateArg, TypeRepr};
pub use unit::{
    FunctionDecl, FunctionRole, Linkage, ScopeKind, ScopeSegment, Signature, TranslationUnit,
};

#[cfg(test)]
mod tests;
