//! Error types for the analysis core.

use thiserror::Error;

use crate::span::Direction;

/// Failure to recover an insertion offset from raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    /// The scan reached the edge of the enclosing function without finding
    /// the target character.
    #[error("no '{target}' found scanning {direction} from offset {anchor}")]
    TargetNotFound {
        /// Character searched for.
        target: char,
        /// Offset the scan started from.
        anchor: usize,
        /// Scan direction.
        direction: Direction,
    },

    /// The anchor lies outside the bounds the scan is allowed to read.
    #[error("anchor offset {anchor} lies outside {start}..{end}")]
    AnchorOutOfBounds {
        /// Requested anchor.
        anchor: usize,
        /// Lower bound of the scan.
        start: usize,
        /// Upper bound of the scan.
        end: usize,
    },

    /// Only single-byte targets can be located by byte scanning.
    #[error("scan target '{target}' is not an ASCII character")]
    NonAsciiTarget {
        /// The rejected target.
        target: char,
    },
}

/// Failure to materialise an edit buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// An edit lies past the end of the original text.
    #[error("edit offset {offset} is past the end of the text ({len} bytes)")]
    OutOfBounds {
        /// Offending offset.
        offset: usize,
        /// Length of the original text.
        len: usize,
    },

    /// An edit would split a multi-byte character.
    #[error("edit offset {offset} is not on a character boundary")]
    NotCharBoundary {
        /// Offending offset.
        offset: usize,
    },

    /// Two different texts were inserted at the same offset.
    #[error("conflicting insertions at offset {offset}: {first:?} and {second:?}")]
    ConflictingInsertions {
        /// Shared offset.
        offset: usize,
        /// Text recorded first.
        first: String,
        /// Text recorded later.
        second: String,
    },
}

/// Errors surfaced by per-function passes and the driver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// The function has no body to analyse.
    #[error("function {function} has no body")]
    MissingBody {
        /// Identifier of the function.
        function: String,
    },

    /// A function's location refers to a file the source manager does not
    /// know.
    #[error("function {function} refers to an unregistered file")]
    UnknownFile {
        /// Identifier of the function.
        function: String,
    },

    /// The output sink rejected a function's result.
    #[error("failed to record {function}: {source}")]
    Sink {
        /// Identifier of the function.
        function: String,
        /// Underlying sink failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Materialising the patched text failed.
    #[error(transparent)]
    Edit(#[from] EditError),
}

impl AnalysisError {
    /// Creates a sink error for `function`.
    #[must_use]
    pub fn sink(
        function: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Sink {
            function: function.into(),
            source: Box::new(source),
        }
    }
}
