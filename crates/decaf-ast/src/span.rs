// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Byte ranges into the original source.

use std::fmt;

/// A half-open byte range `start..end` in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both.
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Precomputed line-start offsets for O(log n) byte-offset → line lookup.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset of the start of each line. line_starts[0] is always 0.
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineMap { line_starts }
    }

    /// Zero-based line index containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Byte offset where the line containing `offset` begins.
    pub fn line_start(&self, offset: usize) -> usize {
        self.line_starts[self.line_of(offset)]
    }

    /// Convert byte offset to (line, col), both 1-based.
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let idx = self.line_of(offset);
        (idx + 1, offset - self.line_starts[idx] + 1)
    }

    pub fn same_line(&self, a: usize, b: usize) -> bool {
        self.line_of(a) == self.line_of(b)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_and_contains() {
        let a = Span::new(2, 5);
        let b = Span::new(4, 9);
        assert_eq!(a.cover(b), Span::new(2, 9));
        assert!(a.cover(b).contains(a));
        assert!(!a.contains(b));
        assert_eq!(a.to_string(), "2..5");
    }

    #[test]
    fn line_lookup() {
        let src = "for x in xs\n  f x\n";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 3);
        assert_eq!(lm.line_of(0), 0);
        assert_eq!(lm.line_of(11), 0); // the '\n' belongs to line 0
        assert_eq!(lm.line_of(12), 1);
        assert_eq!(lm.line_start(15), 12);
        assert_eq!(lm.offset_to_line_col(14), (2, 3));
        assert!(lm.same_line(0, 10));
        assert!(!lm.same_line(10, 14));
    }
}
