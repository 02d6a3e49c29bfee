//! Source locations.
//!
//! A [`Span`] is a byte range into a source file plus the line/column of
//! its start, used to point diagnostics at the offending text. A
//! [`SourceMap`] owns the source files a compilation reads from and can
//! turn a [`Span`] back into the snippet of text it covers.

use std::fmt;
use std::path::PathBuf;

/// Identifies a source file within a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl FileId {
    /// A placeholder file id for spans that are not tied to any real file
    /// (synthetic AST nodes, tests).
    pub const DUMMY: FileId = FileId(u32::MAX);
}

/// A half-open byte range into a source file, with its starting
/// line/column recorded for quick diagnostic rendering.
///
/// # Examples
///
/// ```
/// use toyc_util::{FileId, Span};
///
/// let span = Span::new(4, 9, 1, 5, FileId(0));
/// assert_eq!(span.len(), 5);
/// assert!(!span.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
    pub file_id: FileId,
}

impl Span {
    /// A zero-length span that carries no real location, used where a
    /// span is required but none is meaningful (builtin symbols).
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
        file_id: FileId::DUMMY,
    };

    pub fn new(start: u32, end: u32, line: u32, column: u32, file_id: FileId) -> Self {
        debug_assert!(start <= end);
        Self {
            start,
            end,
            line,
            column,
            file_id,
        }
    }

    /// A zero-length span at a single byte offset.
    pub fn point(offset: u32, line: u32, column: u32, file_id: FileId) -> Self {
        Self::new(offset, offset, line, column, file_id)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span containing both `self` and `other`. Both spans must
    /// belong to the same file.
    ///
    /// # Examples
    ///
    /// ```
    /// use toyc_util::{FileId, Span};
    ///
    /// let a = Span::new(0, 3, 1, 1, FileId(0));
    /// let b = Span::new(5, 8, 1, 6, FileId(0));
    /// let merged = a.merge(b);
    /// assert_eq!((merged.start, merged.end), (0, 8));
    /// ```
    pub fn merge(&self, other: Span) -> Span {
        debug_assert_eq!(self.file_id, other.file_id);
        let (start, line, column) = if self.start <= other.start {
            (self.start, self.line, self.column)
        } else {
            (other.start, other.line, other.column)
        };
        Span {
            start,
            end: self.end.max(other.end),
            line,
            column,
            file_id: self.file_id,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One source file tracked by a [`SourceMap`].
struct SourceFile {
    path: PathBuf,
    contents: String,
    /// Byte offset of the start of each line, for offset -> line/column
    /// lookup.
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(path: PathBuf, contents: String) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in contents.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            path,
            contents,
            line_starts,
        }
    }

    /// 1-based (line, column) for a byte offset.
    fn line_column(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        (line_idx as u32 + 1, offset - line_start + 1)
    }
}

/// Errors raised while looking up source text.
#[derive(Debug, thiserror::Error)]
pub enum SourceMapError {
    #[error("no source file registered for {0:?}")]
    FileNotFound(FileId),
    #[error("span {start}..{end} is out of bounds for file of length {file_len}")]
    SpanOutOfBounds {
        file_len: usize,
        start: u32,
        end: u32,
    },
}

/// Owns every source file read during a compilation and answers
/// offset <-> line/column and span -> text questions for diagnostics.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Registers a new source file and returns its id.
    pub fn add_file(&mut self, path: PathBuf, contents: String) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(path, contents));
        id
    }

    /// Builds a [`Span`] for a byte range in `file_id`, filling in the
    /// line/column of `start`.
    pub fn span(&self, file_id: FileId, start: u32, end: u32) -> Result<Span, SourceMapError> {
        let file = self
            .files
            .get(file_id.0 as usize)
            .ok_or(SourceMapError::FileNotFound(file_id))?;
        if end as usize > file.contents.len() {
            return Err(SourceMapError::SpanOutOfBounds {
                file_len: file.contents.len(),
                start,
                end,
            });
        }
        let (line, column) = file.line_column(start);
        Ok(Span::new(start, end, line, column, file_id))
    }

    /// The text a span covers.
    pub fn snippet(&self, span: Span) -> Result<&str, SourceMapError> {
        let file = self
            .files
            .get(span.file_id.0 as usize)
            .ok_or(SourceMapError::FileNotFound(span.file_id))?;
        file.contents
            .get(span.start as usize..span.end as usize)
            .ok_or(SourceMapError::SpanOutOfBounds {
                file_len: file.contents.len(),
                start: span.start,
                end: span.end,
            })
    }

    /// The full text of the line a span starts on, for the
    /// source-snippet-plus-underline diagnostic rendering.
    pub fn line_text(&self, span: Span) -> Result<&str, SourceMapError> {
        let file = self
            .files
            .get(span.file_id.0 as usize)
            .ok_or(SourceMapError::FileNotFound(span.file_id))?;
        let line_idx = (span.line as usize).saturating_sub(1);
        let start = file.line_starts[line_idx] as usize;
        let end = file
            .line_starts
            .get(line_idx + 1)
            .map(|&e| e as usize - 1)
            .unwrap_or(file.contents.len());
        Ok(file.contents[start..end].trim_end_matches('\r'))
    }

    pub fn path(&self, file_id: FileId) -> Option<&std::path::Path> {
        self.files.get(file_id.0 as usize).map(|f| f.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_picks_earliest_start() {
        let a = Span::new(10, 14, 2, 1, FileId(0));
        let b = Span::new(0, 4, 1, 1, FileId(0));
        let m = a.merge(b);
        assert_eq!(m.start, 0);
        assert_eq!(m.end, 14);
        assert_eq!(m.line, 1);
    }

    #[test]
    fn source_map_line_column_lookup() {
        let mut map = SourceMap::new();
        let id = map.add_file(PathBuf::from("t.toy"), "var a: Int\nvar b: Int\n".into());
        let span = map.span(id, 11, 14).unwrap();
        assert_eq!(span.line, 2);
        assert_eq!(span.column, 1);
        assert_eq!(map.snippet(span).unwrap(), "var");
    }

    #[test]
    fn line_text_returns_full_line() {
        let mut map = SourceMap::new();
        let id = map.add_file(PathBuf::from("t.toy"), "var a: Int\nvar b: Int\n".into());
        let span = map.span(id, 15, 16).unwrap();
        assert_eq!(map.line_text(span).unwrap(), "var b: Int");
    }

    #[test]
    fn span_out_of_bounds_is_reported() {
        let mut map = SourceMap::new();
        let id = map.add_file(PathBuf::from("t.toy"), "x".into());
        assert!(matches!(
            map.span(id, 0, 10),
            Err(SourceMapError::SpanOutOfBounds { .. })
        ));
    }
}
