// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Text overlay over the immutable original source.
//!
//! Edits are recorded against original offsets and only resolved on
//! `finish`, so the original text stays readable for the whole pass.
//! Replacements (`overwrite`/`remove`) never overlap each other; inserts
//! may sit on a replacement's boundary but never strictly inside it.

use decaf_ast::Span;
use tracing::trace;

use crate::error::EditError;

#[derive(Debug, Clone)]
struct Replacement {
    span: Span,
    text: String,
}

#[derive(Debug, Clone)]
struct Insertion {
    pos: usize,
    /// Ordering among inserts at one position. Appends count up, prepends down.
    seq: i64,
    text: String,
}

enum Piece<'e> {
    Insert(&'e str),
    Replace(&'e Replacement),
}

#[derive(Debug, Clone)]
pub struct Editor<'a> {
    original: &'a str,
    /// Sorted by start, pairwise disjoint.
    replacements: Vec<Replacement>,
    insertions: Vec<Insertion>,
    next_seq: i64,
}

impl<'a> Editor<'a> {
    pub fn new(original: &'a str) -> Self {
        Self { original, replacements: Vec::new(), insertions: Vec::new(), next_seq: 0 }
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<Span, EditError> {
        let span = Span::new(start, end);
        let valid = start <= end
            && end <= self.original.len()
            && self.original.is_char_boundary(start)
            && self.original.is_char_boundary(end);
        if valid {
            Ok(span)
        } else {
            Err(EditError::OutOfBounds { span, len: self.original.len() })
        }
    }

    /// The replacement strictly enclosing `pos`, if any.
    fn consuming(&self, pos: usize) -> Option<Span> {
        self.replacements
            .iter()
            .map(|r| r.span)
            .find(|r| r.start < pos && pos < r.end)
    }

    /// The unedited source text of a range.
    pub fn original(&self, start: usize, end: usize) -> Result<&'a str, EditError> {
        let span = self.check_range(start, end)?;
        Ok(&self.original[span.start..span.end])
    }

    /// The range with every edit inside it applied.
    ///
    /// An insert at `end` belongs to the range; an insert at `start` belongs
    /// to whatever precedes it.
    pub fn slice(&self, start: usize, end: usize) -> Result<String, EditError> {
        let span = self.check_range(start, end)?;
        let cut = |r: &&Replacement| {
            r.span.start < span.end.max(span.start + 1)
                && span.start < r.span.end
                && !span.contains(r.span)
        };
        if let Some(r) = self.replacements.iter().find(cut) {
            return Err(EditError::RangeConsumed { span, consumed: r.span });
        }
        Ok(self.render(span, false))
    }

    /// Insert after any earlier inserts at `pos`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), EditError> {
        self.check_range(pos, pos)?;
        if text.is_empty() {
            return Ok(());
        }
        if let Some(consumed) = self.consuming(pos) {
            return Err(EditError::RangeConsumed { span: Span::new(pos, pos), consumed });
        }
        self.next_seq += 1;
        trace!(pos, len = text.len(), "insert");
        self.insertions.push(Insertion { pos, seq: self.next_seq, text: text.to_string() });
        Ok(())
    }

    /// Insert before any earlier inserts at `pos`.
    pub fn prepend(&mut self, pos: usize, text: &str) -> Result<(), EditError> {
        self.check_range(pos, pos)?;
        if text.is_empty() {
            return Ok(());
        }
        if let Some(consumed) = self.consuming(pos) {
            return Err(EditError::RangeConsumed { span: Span::new(pos, pos), consumed });
        }
        self.next_seq += 1;
        trace!(pos, len = text.len(), "prepend");
        self.insertions.push(Insertion { pos, seq: -self.next_seq, text: text.to_string() });
        Ok(())
    }

    pub fn overwrite(&mut self, start: usize, end: usize, text: &str) -> Result<(), EditError> {
        let span = self.check_range(start, end)?;
        if span.is_empty() {
            return Err(EditError::EmptyOverwrite { pos: start });
        }
        self.replace(span, text)
    }

    /// Like `overwrite`, but inserts at `end` are treated as part of the
    /// range and dropped with it.
    pub fn overwrite_through(&mut self, start: usize, end: usize, text: &str) -> Result<(), EditError> {
        let span = self.check_range(start, end)?;
        if span.is_empty() {
            return Err(EditError::EmptyOverwrite { pos: start });
        }
        self.replace(span, text)?;
        self.insertions.retain(|i| i.pos != span.end);
        Ok(())
    }

    /// Removing an empty range is a no-op.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<(), EditError> {
        let span = self.check_range(start, end)?;
        if span.is_empty() {
            return Ok(());
        }
        self.replace(span, "")
    }

    fn replace(&mut self, span: Span, text: &str) -> Result<(), EditError> {
        for r in &self.replacements {
            if r.span.contains(span) {
                return Err(EditError::RangeConsumed { span, consumed: r.span });
            }
            let overlaps = r.span.start < span.end && span.start < r.span.end;
            if overlaps && !span.contains(r.span) {
                return Err(EditError::OverlappingEdit { span, existing: r.span });
            }
        }

        // Supersede everything inside; inserts on the boundaries stay.
        self.replacements.retain(|r| !span.contains(r.span));
        self.insertions.retain(|i| !(span.start < i.pos && i.pos < span.end));

        trace!(start = span.start, end = span.end, len = text.len(), "overwrite");
        let idx = self.replacements.partition_point(|r| r.span.start < span.start);
        self.replacements.insert(idx, Replacement { span, text: text.to_string() });
        Ok(())
    }

    /// True if a replacement covers any of `start..end` (or strictly
    /// encloses `start` for an empty range).
    pub fn is_consumed(&self, start: usize, end: usize) -> bool {
        self.replacements
            .iter()
            .any(|r| r.span.start < end.max(start + 1) && start < r.span.end)
    }

    /// Resolve every edit into the output text.
    pub fn finish(self) -> String {
        self.render(Span::new(0, self.original.len()), true)
    }

    fn render(&self, span: Span, include_start: bool) -> String {
        let mut events: Vec<(usize, u8, i64, Piece<'_>)> = Vec::new();
        for i in &self.insertions {
            let after_start = i.pos > span.start || (include_start && i.pos == span.start);
            if after_start && i.pos <= span.end {
                events.push((i.pos, 0, i.seq, Piece::Insert(&i.text)));
            }
        }
        for r in &self.replacements {
            if span.contains(r.span) {
                events.push((r.span.start, 1, 0, Piece::Replace(r)));
            }
        }
        events.sort_by_key(|(pos, order, seq, _)| (*pos, *order, *seq));

        let mut out = String::with_capacity(span.len());
        let mut cursor = span.start;
        for (pos, _, _, piece) in events {
            if pos < cursor {
                continue;
            }
            out.push_str(&self.original[cursor..pos]);
            cursor = pos;
            match piece {
                Piece::Insert(text) => out.push_str(text),
                Piece::Replace(r) => {
                    out.push_str(&r.text);
                    cursor = r.span.end;
                }
            }
        }
        out.push_str(&self.original[cursor..span.end]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_at_one_position_keep_call_order() {
        let mut editor = Editor::new("ab");
        editor.insert(1, "1").unwrap();
        editor.insert(1, "2").unwrap();
        editor.prepend(1, "0").unwrap();
        assert_eq!(editor.finish(), "a012b");
    }

    #[test]
    fn overwrite_supersedes_inner_edits_but_keeps_boundaries() {
        let mut editor = Editor::new("for x in xs");
        editor.overwrite(4, 5, "y").unwrap();
        editor.insert(6, "!").unwrap();
        editor.insert(4, "<").unwrap();
        editor.insert(11, ">").unwrap();
        editor.overwrite(4, 11, "(header)").unwrap();
        assert_eq!(editor.finish(), "for <(header)>");
    }

    #[test]
    fn overwrite_through_takes_the_end_boundary() {
        let mut editor = Editor::new("for x in f a\n");
        editor.overwrite(10, 11, "(").unwrap();
        editor.insert(12, ")").unwrap();
        editor.insert(4, "<").unwrap();
        editor.overwrite_through(4, 12, "(header) {").unwrap();
        assert_eq!(editor.finish(), "for <(header) {\n");
    }

    #[test]
    fn conflicting_replacements_are_rejected() {
        let mut editor = Editor::new("0123456789");
        editor.overwrite(2, 6, "x").unwrap();
        assert_eq!(
            editor.overwrite(4, 8, "y"),
            Err(EditError::OverlappingEdit { span: Span::new(4, 8), existing: Span::new(2, 6) })
        );
        assert_eq!(
            editor.remove(3, 5),
            Err(EditError::RangeConsumed { span: Span::new(3, 5), consumed: Span::new(2, 6) })
        );
        assert!(matches!(editor.overwrite(2, 6, "z"), Err(EditError::RangeConsumed { .. })));
        assert!(matches!(editor.insert(3, "w"), Err(EditError::RangeConsumed { .. })));
        editor.insert(6, "w").unwrap();
        assert_eq!(editor.finish(), "01xw6789");
    }

    #[test]
    fn slice_applies_edits_inside_the_range() {
        let mut editor = Editor::new("@x + y");
        editor.overwrite(0, 1, "this.").unwrap();
        editor.insert(2, ")").unwrap();
        editor.insert(4, "(").unwrap();
        assert_eq!(editor.slice(0, 2).unwrap(), "this.x)");
        assert_eq!(editor.slice(4, 6).unwrap(), " y");
        assert_eq!(editor.original(0, 2).unwrap(), "@x");
        assert!(matches!(editor.slice(1, 3), Ok(_)));
    }

    #[test]
    fn slice_into_a_replacement_is_an_error() {
        let mut editor = Editor::new("abcdef");
        editor.overwrite(1, 4, "X").unwrap();
        assert!(matches!(editor.slice(2, 5), Err(EditError::RangeConsumed { .. })));
        assert!(matches!(editor.slice(2, 3), Err(EditError::RangeConsumed { .. })));
        assert_eq!(editor.slice(0, 5).unwrap(), "aXe");
    }

    #[test]
    fn empty_ranges_and_bounds() {
        let mut editor = Editor::new("abc");
        assert_eq!(editor.overwrite(1, 1, "x"), Err(EditError::EmptyOverwrite { pos: 1 }));
        editor.remove(2, 2).unwrap();
        assert_eq!(
            editor.insert(9, "x"),
            Err(EditError::OutOfBounds { span: Span::new(9, 9), len: 3 })
        );
        assert!(!editor.is_consumed(0, 3));
        editor.remove(0, 1).unwrap();
        assert!(editor.is_consumed(0, 0));
        assert!(!editor.is_consumed(1, 2));
        assert_eq!(editor.finish(), "bc");
    }
}
