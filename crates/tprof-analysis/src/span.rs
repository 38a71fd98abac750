//! Recovery of insertion offsets by scanning raw source text.
//!
//! Node spans do not always point at an insertion-worthy character: a loop
//! body's span starts after the header's closing parenthesis, and the
//! `else` keyword is not a node at all. The resolver scans the text from a
//! known anchor for a delimiter character and returns the offset just past
//! it. Bytes inside comments are never matched.

use std::fmt;
use std::ops::Range;

use crate::error::SpanError;

/// Scan direction from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the start of the text.
    Backward,
    /// Towards the end of the text.
    Forward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Backward => "backward",
            Self::Forward => "forward",
        })
    }
}

/// Scans one file's text within fixed bounds.
///
/// The bounds are the byte range of the enclosing function; no scan reads
/// outside them.
#[derive(Debug, Clone)]
pub struct SpanResolver<'t> {
    text: &'t str,
    bounds: Range<usize>,
    comments: &'t [Range<usize>],
}

impl<'t> SpanResolver<'t> {
    /// Creates a resolver over `text`, restricted to `bounds`.
    ///
    /// Bounds reaching past the end of the text are clamped to it.
    #[must_use]
    pub fn new(text: &'t str, bounds: Range<usize>) -> Self {
        let end = bounds.end.min(text.len());
        let start = bounds.start.min(end);
        Self {
            text,
            bounds: start..end,
            comments: &[],
        }
    }

    /// Excludes `comments`, sorted by start, from matching.
    #[must_use]
    pub const fn with_comments(mut self, comments: &'t [Range<usize>]) -> Self {
        self.comments = comments;
        self
    }

    /// Returns the text being scanned.
    #[must_use]
    pub const fn text(&self) -> &'t str {
        self.text
    }

    /// Finds `target` starting with the byte just before `anchor` and moving
    /// in `direction`, returning the offset immediately after the match.
    ///
    /// # Errors
    ///
    /// Returns [`SpanError::AnchorOutOfBounds`] when `anchor` lies outside
    /// the resolver's bounds, [`SpanError::NonAsciiTarget`] for multi-byte
    /// targets, and [`SpanError::TargetNotFound`] when the bounds are
    /// exhausted without a match.
    pub fn resolve(
        &self,
        anchor: usize,
        target: char,
        direction: Direction,
    ) -> Result<usize, SpanError> {
        let Range { start, end } = self.bounds;
        if anchor < start || anchor > end {
            return Err(SpanError::AnchorOutOfBounds { anchor, start, end });
        }
        if !target.is_ascii() {
            return Err(SpanError::NonAsciiTarget { target });
        }
        let needle = u8::try_from(target).map_err(|_| SpanError::NonAsciiTarget { target })?;
        let bytes = self.text.as_bytes();
        let first = anchor.saturating_sub(1).max(start);

        let matches =
            |index: &usize| bytes.get(*index) == Some(&needle) && !self.in_comment(*index);
        let found = match direction {
            Direction::Backward => (start..anchor).rev().find(matches),
            Direction::Forward => (first..end).find(matches),
        };

        found
            .map(|index| index.saturating_add(1))
            .ok_or(SpanError::TargetNotFound {
                target,
                anchor,
                direction,
            })
    }

    fn in_comment(&self, index: usize) -> bool {
        let candidate = self.comments.partition_point(|range| range.end <= index);
        self.comments
            .get(candidate)
            .is_some_and(|range| range.contains(&index))
    }
}
