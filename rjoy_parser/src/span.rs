//! Span information for source locations
//!
//! Byte offsets plus 1-indexed line/column pairs for diagnostics.

use serde::{Deserialize, Serialize};

/// Represents a span in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset start (0-indexed)
    pub start: usize,
    /// Byte offset end (exclusive)
    pub end: usize,
    /// Line number (1-indexed)
    pub start_line: usize,
    /// Line number (1-indexed)
    pub end_line: usize,
    /// Column (1-indexed, in bytes)
    pub start_column: usize,
    /// Column (1-indexed, in bytes)
    pub end_column: usize,
}

impl Span {
    /// Create a new span
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        end_line: usize,
        start_column: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Create an empty span at position 0
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Helper struct to track line and column positions while lexing
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Line start offsets (byte positions where each line starts)
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Create a new source map from source code
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Get line and column for a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = offset - line_start + 1;
        (line + 1, column)
    }

    /// Create a span with line/column information
    pub fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_column) = self.line_col(start);
        let (end_line, end_column) = self.line_col(end);
        Span {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }
}
