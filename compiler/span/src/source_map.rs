use super::{Position, Span};
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use unicode_width::UnicodeWidthStr;

#[cfg(test)]
mod test;

/// A mapping from [index](SourceFileIndex) to [source file](SourceFile).
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Open a file given its path and add it as a [`SourceFile`] to the map.
    pub fn load(&mut self, path: &Path) -> io::Result<SourceFileIndex> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.add(FileName::Path(path.to_owned()), Arc::new(source)))
    }

    /// Add text to the map creating a [`SourceFile`] in the process.
    pub fn add(&mut self, name: impl Into<FileName>, source: Arc<String>) -> SourceFileIndex {
        let index = SourceFileIndex(self.files.len());
        self.files.push(SourceFile { name: name.into(), content: source });
        index
    }

    pub fn add_str(&mut self, name: impl Into<FileName>, source: &str) -> SourceFileIndex {
        self.add(name, Arc::new(source.to_owned()))
    }

    /// Resolve a span to the string content it points to.
    pub fn snippet(&self, span: Span) -> &str {
        let line = self[span.file].line(span.start.line).unwrap_or_default();
        let start = byte_offset(line, span.start.column);
        let end = byte_offset(line, span.start.column + span.width);
        &line[start..end]
    }

    pub fn line_with_highlight(&self, span: Span) -> LineWithHighlight<'_> {
        let file = &self[span.file];
        let content = file.line(span.start.line).unwrap_or_default();

        let start = byte_offset(content, span.start.column);
        let end = byte_offset(content, span.start.column + span.width);

        LineWithHighlight {
            file: &file.name,
            number: span.start.line + 1,
            content,
            highlight: Highlight {
                start: span.start.column + 1,
                end: span.start.column + 1 + span.width,
                width: content[start..end].width(),
                prefix_width: content[..start].width(),
            },
        }
    }
}

/// The byte offset of the given column clamped to the end of the line.
fn byte_offset(line: &str, column: u32) -> usize {
    line.char_indices()
        .nth(column as usize)
        .map_or(line.len(), |(index, _)| index)
}

impl std::ops::Index<SourceFileIndex> for SourceMap {
    type Output = SourceFile;

    fn index(&self, index: SourceFileIndex) -> &Self::Output {
        &self.files[index.0]
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct SourceFileIndex(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct LineWithHighlight<'a> {
    pub file: &'a FileName,
    /// One-indexed line number.
    pub number: u32,
    /// The content of the entire line that contains the to-be-highlighted snippet.
    pub content: &'a str,
    pub highlight: Highlight,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Highlight {
    /// One-indexed column of the first highlighted character.
    pub start: u32,
    pub end: u32,
    pub width: usize,
    pub prefix_width: usize,
}

/// A source file.
///
/// Obtained by and contained within a [source map](SourceMap).
pub struct SourceFile {
    name: FileName,
    content: Arc<String>,
}

impl SourceFile {
    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The zero-indexed line without its line break.
    pub fn line(&self, number: u32) -> Option<&str> {
        let line = self.content.split('\n').nth(number as usize)?;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// The location right after the last character.
    pub fn end(&self) -> Position {
        let mut position = Position::default();
        position.advance_str(&self.content);
        position
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum FileName {
    Anonymous,
    Path(PathBuf),
    Virtual(&'static str),
}
