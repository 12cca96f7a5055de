use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location span.
///
/// Line/column values are 1-based for human-readable messages; `lo`/`hi`
/// are byte offsets into the source text (half-open) so that the original
/// text of a node can be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
    #[serde(skip)]
    pub lo: usize,
    #[serde(skip)]
    pub hi: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            lo: 0,
            hi: 0,
        }
    }

    /// Attach byte offsets to a span.
    pub fn with_offsets(mut self, lo: usize, hi: usize) -> Self {
        self.lo = lo;
        self.hi = hi;
        self
    }

    /// Create a zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) = if (self.start_line, self.start_col)
            <= (other.start_line, other.start_col)
        {
            (self.start_line, self.start_col)
        } else {
            (other.start_line, other.start_col)
        };
        let (end_line, end_col) =
            if (self.end_line, self.end_col) >= (other.end_line, other.end_col) {
                (self.end_line, self.end_col)
            } else {
                (other.end_line, other.end_col)
            };

        Span::new(start_line, start_col, end_line, end_col)
            .with_offsets(self.lo.min(other.lo), self.hi.max(other.hi))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Holds the source text for error reporting and function source recovery.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Cached line start byte offsets for fast line lookup.
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Extract a source line by 1-based line number.
    ///
    /// Returns `None` if the line number is out of range.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        if idx >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[idx];
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.source.len());
        let line = &self.source[start..end];
        Some(line.trim_end_matches('\r'))
    }

    /// The exact source text covered by `span`.
    ///
    /// Returns an empty string when the span's offsets fall outside the
    /// source or off a character boundary.
    pub fn slice(&self, span: Span) -> &str {
        self.source.get(span.lo..span.hi).unwrap_or("")
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_point() {
        let s = Span::point(1, 5);
        assert_eq!(s.start_line, 1);
        assert_eq!(s.start_col, 5);
        assert_eq!(s.end_line, 1);
        assert_eq!(s.end_col, 5);
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(1, 5, 1, 10).with_offsets(4, 9);
        let b = Span::new(2, 3, 2, 8).with_offsets(14, 19);
        let merged = a.merge(b);
        assert_eq!(merged.start_line, 1);
        assert_eq!(merged.start_col, 5);
        assert_eq!(merged.end_line, 2);
        assert_eq!(merged.end_col, 8);
        assert_eq!((merged.lo, merged.hi), (4, 19));
    }

    #[test]
    fn test_span_merge_same_line() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(1, 3, 1, 8);
        let merged = a.merge(b);
        assert_eq!(merged.start_col, 3);
        assert_eq!(merged.end_col, 10);
    }

    #[test]
    fn test_span_display() {
        let s = Span::new(3, 7, 3, 15);
        assert_eq!(format!("{s}"), "3:7");
    }

    #[test]
    fn test_source_file_line_extraction() {
        let src = SourceFile::new("snippet.js", "line one\nline two\nline three");
        assert_eq!(src.line(1), Some("line one"));
        assert_eq!(src.line(2), Some("line two"));
        assert_eq!(src.line(3), Some("line three"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_source_file_crlf() {
        let src = SourceFile::new("snippet.js", "line one\r\nline two\r\n");
        assert_eq!(src.line(1), Some("line one"));
        assert_eq!(src.line(2), Some("line two"));
    }

    #[test]
    fn test_source_file_slice() {
        let src = SourceFile::new("snippet.js", "let f = x => x + 1;");
        let span = Span::new(1, 9, 1, 18).with_offsets(8, 18);
        assert_eq!(src.slice(span), "x => x + 1");
        let out_of_range = Span::point(1, 1).with_offsets(10, 400);
        assert_eq!(src.slice(out_of_range), "");
    }

    #[test]
    fn test_source_file_empty() {
        let src = SourceFile::new("snippet.js", "");
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.line(1), Some(""));
    }

    #[test]
    fn test_span_json_field_names() {
        let json = serde_json::to_string(&Span::new(2, 4, 2, 9)).unwrap();
        assert!(json.contains("\"line\":2"));
        assert!(json.contains("\"column\":4"));
        assert!(json.contains("\"end_column\":9"));
        assert!(!json.contains("\"lo\""));
    }
}
