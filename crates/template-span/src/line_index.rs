//! Offset to line/column lookup for diagnostics.

use crate::ByteOffset;
use text_size::TextSize;

/// A 0-indexed line and column (byte column within the line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed byte column.
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Start offsets of every line in a source, for O(log n) offset lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Indexes the line starts of `text`.
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
            )
            .collect();

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` if the offset is past the end of the source.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);

        Some(LineCol::new(line as u32, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("<p>{$x}</p>");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(TextSize::from(3)), Some(LineCol::new(0, 3)));
    }

    #[test]
    fn test_offsets_after_newlines() {
        let index = LineIndex::new("<ul>\n  <li>{$item}</li>\n</ul>");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(TextSize::from(5)), Some(LineCol::new(1, 0)));
        assert_eq!(index.line_col(TextSize::from(11)), Some(LineCol::new(1, 6)));
        assert_eq!(index.line_col(TextSize::from(24)), Some(LineCol::new(2, 0)));
    }

    #[test]
    fn test_end_of_source_is_addressable() {
        let index = LineIndex::new("ab\n");
        assert_eq!(index.line_col(TextSize::from(3)), Some(LineCol::new(1, 0)));
        assert_eq!(index.line_col(TextSize::from(4)), None);
    }
}
