//! Line/column conversion utilities.
//!
//! The AST and diagnostics track byte offsets; user-facing output wants
//! line/column pairs. `LineMap` converts between the two.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A resolved source location as presented to users and external tools.
///
/// Lines and columns are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path (as given to the compiler)
    pub file: String,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
    /// Length of the region in bytes
    pub length: u32,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, column: u32, length: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            length,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Line map for efficient offset -> line/column conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (`line_starts[0]` is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];

        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            } else if ch == '\r' {
                // \r\n is handled by the \n branch; lone \r ends a line itself
                let next_idx = i + 1;
                if source.as_bytes().get(next_idx) != Some(&b'\n') {
                    line_starts.push(u32::try_from(next_idx).unwrap_or(u32::MAX));
                }
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a (line, column) pair, both 1-indexed.
    #[must_use]
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = offset.saturating_sub(line_start);
        (
            u32::try_from(line).unwrap_or(u32::MAX - 1) + 1,
            column + 1,
        )
    }

    /// Resolve a span into a user-facing `SourceLocation`.
    #[must_use]
    pub fn locate(&self, file: &str, span: Span) -> SourceLocation {
        let (line, column) = self.line_col(span.start);
        SourceLocation::new(file, line, column, span.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_basics() {
        let map = LineMap::build("ab\ncd\nef");
        assert_eq!(map.line_col(0), (1, 1));
        assert_eq!(map.line_col(1), (1, 2));
        assert_eq!(map.line_col(3), (2, 1));
        assert_eq!(map.line_col(7), (3, 2));
    }

    #[test]
    fn crlf_and_lone_cr() {
        let map = LineMap::build("a\r\nb\rc");
        assert_eq!(map.line_col(3), (2, 1)); // after \r\n
        assert_eq!(map.line_col(5), (3, 1)); // after lone \r
    }

    #[test]
    fn locate_produces_one_indexed() {
        let map = LineMap::build("let x = 1;\nlet y = 2;");
        let loc = map.locate("a.ts", Span::new(15, 16));
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.length, 1);
    }
}
