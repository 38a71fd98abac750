//! Source manager: file registry, locations, spans and line mapping.
//!
//! Locations are byte offsets into a specific registered file. The manager
//! resolves them to one-based lines and columns and performs end-of-token
//! resolution by re-lexing the raw text at a location, so no token stream
//! needs to be retained after parsing.

use std::fmt;
use std::ops::Range;

use crate::lexer::token_len;
use crate::position::{LineColumn, saturating_one_based};

/// Identifies a file registered with a [`SourceManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    /// Returns the registration index of the file.
    #[must_use]
    pub fn index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// A byte offset into a specific file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    file: FileId,
    offset: usize,
}

impl SourceLocation {
    /// Creates a location at `offset` bytes into `file`.
    #[must_use]
    pub const fn new(file: FileId, offset: usize) -> Self {
        Self { file, offset }
    }

    /// Returns the file containing this location.
    #[must_use]
    pub const fn file(self) -> FileId {
        self.file
    }

    /// Returns the byte offset within the file.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns a location in the same file at a different offset.
    #[must_use]
    pub const fn with_offset(self, offset: usize) -> Self {
        Self {
            file: self.file,
            offset,
        }
    }
}

/// The extent of a node: its first token and the start of its last token.
///
/// `end` deliberately points at the *start* of the last token. Use
/// [`SourceManager::token_end`] to obtain the location just past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    start: SourceLocation,
    end: SourceLocation,
}

impl SourceSpan {
    /// Creates a span from its first and last token locations.
    #[must_use]
    pub const fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Location of the first token.
    #[must_use]
    pub const fn start(self) -> SourceLocation {
        self.start
    }

    /// Location of the start of the last token.
    #[must_use]
    pub const fn end(self) -> SourceLocation {
        self.end
    }
}

/// A registered file: its display name, text, line table and comment
/// ranges.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    text: String,
    line_starts: Vec<usize>,
    comments: Vec<Range<usize>>,
}

impl SourceFile {
    fn new(name: String, text: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                text.bytes()
                    .enumerate()
                    .filter(|(_, byte)| *byte == b'\n')
                    .map(|(index, _)| index.saturating_add(1)),
            )
            .collect();
        Self {
            name,
            text,
            line_starts,
            comments: Vec::new(),
        }
    }

    /// Returns the name the file was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw text of the file.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte ranges of the file's comments, sorted by start.
    #[must_use]
    pub fn comments(&self) -> &[Range<usize>] {
        &self.comments
    }

    /// Resolves a byte offset to a one-based line and column.
    ///
    /// Offsets past the end of the text resolve to the last line.
    #[must_use]
    pub fn line_column(&self, offset: usize) -> LineColumn {
        let clamped = offset.min(self.text.len());
        let row = self
            .line_starts
            .partition_point(|start| *start <= clamped)
            .saturating_sub(1);
        let line_start = self.line_starts.get(row).copied().unwrap_or(0);
        LineColumn::new(
            saturating_one_based(row),
            saturating_one_based(clamped.saturating_sub(line_start)),
        )
    }
}

/// Registry of the files making up one translation unit.
///
/// The first registered file is the *main* file: the file under direct
/// analysis. Any further files stand for included headers.
#[derive(Debug, Clone)]
pub struct SourceManager {
    main: SourceFile,
    includes: Vec<SourceFile>,
}

impl SourceManager {
    /// Creates a manager whose main file is `name` with contents `text`.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            main: SourceFile::new(name.into(), text.into()),
            includes: Vec::new(),
        }
    }

    /// Records the main file's comment byte ranges.
    #[must_use]
    pub fn with_comments(mut self, mut comments: Vec<Range<usize>>) -> Self {
        comments.sort_by_key(|range| range.start);
        self.main.comments = comments;
        self
    }

    /// Registers an additional (included) file and returns its identifier.
    pub fn add_file(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let next = self.includes.len().saturating_add(1);
        let id = FileId(u32::try_from(next).unwrap_or(u32::MAX));
        self.includes.push(SourceFile::new(name.into(), text.into()));
        id
    }

    /// Returns the identifier of the main file.
    #[must_use]
    pub const fn main_file_id(&self) -> FileId {
        FileId(0)
    }

    /// Returns the main file.
    #[must_use]
    pub const fn main_file(&self) -> &SourceFile {
        &self.main
    }

    /// Looks up a registered file.
    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        match id.index().checked_sub(1) {
            None => Some(&self.main),
            Some(index) => self.includes.get(index),
        }
    }

    /// Returns whether `location` lies in the main file.
    #[must_use]
    pub fn is_in_main_file(&self, location: SourceLocation) -> bool {
        location.file() == self.main_file_id()
    }

    /// Resolves a location to its one-based line number.
    #[must_use]
    pub fn line(&self, location: SourceLocation) -> Option<u32> {
        self.line_column(location).map(|position| position.line)
    }

    /// Resolves a location to a one-based line and column.
    #[must_use]
    pub fn line_column(&self, location: SourceLocation) -> Option<LineColumn> {
        self.file(location.file())
            .map(|file| file.line_column(location.offset()))
    }

    /// Returns the location just past the token starting at `location`.
    ///
    /// The token is re-lexed from the raw text. A location at the end of the
    /// file, or one whose file is unknown, is returned unchanged.
    #[must_use]
    pub fn token_end(&self, location: SourceLocation) -> SourceLocation {
        let Some(file) = self.file(location.file()) else {
            return location;
        };
        let len = token_len(file.text(), location.offset());
        location.with_offset(location.offset().saturating_add(len))
    }
}
