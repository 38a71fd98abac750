//! Error types for front-end operations.
//!
//! Every failure the front end can report while turning a source file into a
//! [`TranslationUnit`](crate::TranslationUnit) is represented here. The
//! analysis core never runs on a file that produced one of these errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from front-end operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInitError {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Failed to determine language from file path.
    #[error("could not determine language for path: {}", path.display())]
    UnknownLanguage {
        /// The path that could not be mapped to a language.
        path: PathBuf,
    },

    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadError {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The parser did not produce a tree at all.
    #[error("failed to parse {language}: {message}")]
    ParseError {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// The tree contains syntax errors, so spans cannot be trusted.
    #[error("{file}:{line}:{column}: {message} ({count} syntax error(s))")]
    InvalidSource {
        /// Name of the file containing the errors.
        file: String,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the first error.
        message: String,
        /// Total number of error nodes found.
        count: usize,
    },

    /// The source is larger than the addressable location space.
    #[error("{file} is too large to address ({len} bytes)")]
    SourceTooLarge {
        /// Name of the offending file.
        file: String,
        /// Length of the file in bytes.
        len: usize,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            language,
            message: message.into(),
        }
    }

    /// Creates an unknown language error.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }

    /// Creates a read error.
    #[must_use]
    pub const fn read(path: PathBuf, source: std::io::Error) -> Self {
        Self::ReadError { path, source }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParseError {
            language,
            message: message.into(),
        }
    }
}
