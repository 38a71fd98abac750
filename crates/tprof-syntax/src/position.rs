//! Shared position conversion helpers.
//!
//! Tree-sitter positions are zero-based. Diagnostics and fact records use
//! one-based line and column numbers.

use std::fmt;

/// A one-based line and column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColumn {
    /// Line number (one-based).
    pub line: u32,
    /// Column number (one-based, counted in bytes).
    pub column: u32,
}

impl LineColumn {
    /// Creates a new line/column pair.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> LineColumn {
    LineColumn::new(saturating_one_based(pos.row), saturating_one_based(pos.column))
}

/// Converts a zero-based index to a one-based `u32`, saturating on overflow.
pub(crate) fn saturating_one_based(index: usize) -> u32 {
    // Line/column numbers will realistically never exceed u32::MAX.
    u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX)
}
