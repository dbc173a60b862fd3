//! Data structures and procedures for handling source locations.

pub use source_map::{FileName, SourceFile, SourceFileIndex, SourceMap};
use std::fmt;

pub mod source_map;

/// A location inside of a source file.
///
/// Both the line and the column are zero-based. The column counts Unicode scalar values.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Advance the position past the given character.
    pub fn advance(&mut self, character: char) {
        if character == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    /// Advance the position past every character of the given text.
    pub fn advance_str(&mut self, text: &str) {
        text.chars().for_each(|character| self.advance(character));
    }
}

/// Displayed one-based the way editors number lines and columns.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A single-line stretch of characters inside of a [source file](SourceFile).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Span {
    pub file: SourceFileIndex,
    pub start: Position,
    /// The amount of characters covered.
    pub width: u32,
}

impl Span {
    pub const fn new(file: SourceFileIndex, start: Position, width: u32) -> Self {
        Self { file, start, width }
    }

    pub fn end(self) -> Position {
        Position::new(self.start.line, self.start.column + self.width)
    }
}

pub trait Spanning {
    fn span(&self) -> Span;
}

impl Spanning for Span {
    fn span(&self) -> Span {
        *self
    }
}
