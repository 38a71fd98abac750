//! Insertion-only edits over one file's original text.

use crate::error::EditError;

/// A single text insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    offset: usize,
    text: String,
    sequence: usize,
}

impl Edit {
    /// Byte offset in the original text.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Text inserted at the offset.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position of the edit in discovery order.
    #[must_use]
    pub const fn sequence(&self) -> usize {
        self.sequence
    }
}

/// Ordered set of insertions, materialised once against the original text.
///
/// Edits are recorded in discovery order and applied in offset order, so
/// offsets always refer to the unmodified text.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    edits: Vec<Edit>,
}

impl EditBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { edits: Vec::new() }
    }

    /// Records an insertion of `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        let sequence = self.edits.len();
        self.edits.push(Edit {
            offset,
            text: text.into(),
            sequence,
        });
    }

    /// Number of recorded edits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edits have been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Recorded edits in discovery order.
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Splices every edit into a copy of `original`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfBounds`] or [`EditError::NotCharBoundary`]
    /// for offsets that do not address a position in `original`, and
    /// [`EditError::ConflictingInsertions`] when two different texts are
    /// inserted at one offset.
    pub fn apply(self, original: &str) -> Result<String, EditError> {
        let mut ordered = self.edits;
        ordered.sort_by_key(|edit| edit.offset);

        let mut previous: Option<&Edit> = None;
        for edit in &ordered {
            if edit.offset > original.len() {
                return Err(EditError::OutOfBounds {
                    offset: edit.offset,
                    len: original.len(),
                });
            }
            if !original.is_char_boundary(edit.offset) {
                return Err(EditError::NotCharBoundary {
                    offset: edit.offset,
                });
            }
            if let Some(prior) = previous
                && prior.offset == edit.offset
                && prior.text != edit.text
            {
                return Err(EditError::ConflictingInsertions {
                    offset: edit.offset,
                    first: prior.text.clone(),
                    second: edit.text.clone(),
                });
            }
            previous = Some(edit);
        }

        let inserted: usize = ordered.iter().map(|edit| edit.text.len()).sum();
        let mut patched = String::with_capacity(original.len().saturating_add(inserted));
        let mut cursor = 0;
        for edit in &ordered {
            patched.push_str(original.get(cursor..edit.offset).unwrap_or_default());
            patched.push_str(&edit.text);
            cursor = edit.offset;
        }
        patched.push_str(original.get(cursor..).unwrap_or_default());
        Ok(patched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_in_offset_order_regardless_of_discovery() {
        let mut buffer = EditBuffer::new();
        buffer.insert(4, "]");
        buffer.insert(1, "[");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.apply("abcd").as_deref(), Ok("a[bcd]"));
    }

    #[test]
    fn identical_insertions_at_one_offset_are_kept() {
        let mut buffer = EditBuffer::new();
        buffer.insert(3, "\n}");
        buffer.insert(3, "\n}");
        assert_eq!(buffer.apply("a();").as_deref(), Ok("a()\n}\n};"));
    }

    #[test]
    fn conflicting_insertions_are_rejected() {
        let mut buffer = EditBuffer::new();
        buffer.insert(1, "{");
        buffer.insert(1, "}");
        assert_eq!(
            buffer.apply("ab"),
            Err(EditError::ConflictingInsertions {
                offset: 1,
                first: "{".to_owned(),
                second: "}".to_owned(),
            })
        );
    }

    #[test]
    fn out_of_bounds_offset_is_rejected() {
        let mut buffer = EditBuffer::new();
        buffer.insert(9, "x");
        assert_eq!(
            buffer.apply("abc"),
            Err(EditError::OutOfBounds { offset: 9, len: 3 })
        );
    }

    #[test]
    fn offset_inside_a_character_is_rejected() {
        let mut buffer = EditBuffer::new();
        buffer.insert(1, "x");
        assert_eq!(
            buffer.apply("é"),
            Err(EditError::NotCharBoundary { offset: 1 })
        );
    }

    #[test]
    fn empty_buffer_returns_original() {
        let buffer = EditBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.apply("int x;").as_deref(), Ok("int x;"));
    }

    #[test]
    fn sequence_tracks_discovery_order() {
        let mut buffer = EditBuffer::new();
        buffer.insert(5, "a");
        buffer.insert(0, "b");
        let sequences: Vec<(usize, usize)> = buffer
            .edits()
            .iter()
            .map(|edit| (edit.offset(), edit.sequence()))
            .collect();
        assert_eq!(sequences, vec![(5, 0), (0, 1)]);
    }
}
