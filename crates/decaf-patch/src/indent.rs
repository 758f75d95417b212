// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Line indentation bookkeeping.
//!
//! Blocks that move to a different nesting depth register a shift for their
//! lines instead of rewriting whitespace on the spot. Indent queries see the
//! shifts immediately; the whitespace edits are emitted once, at the end.

use std::collections::BTreeMap;

use decaf_ast::ParseContext;

use crate::config::PatchConfig;
use crate::editor::Editor;
use crate::error::EditError;

#[derive(Debug, Clone)]
pub struct Indentation {
    unit: String,
    /// Line start offset -> width delta.
    shifts: BTreeMap<usize, isize>,
}

/// Width of the leading whitespace of the line starting at `line_start`.
fn leading_width(source: &str, line_start: usize) -> usize {
    source[line_start..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count()
}

fn is_blank_line(source: &str, line_start: usize) -> bool {
    source[line_start..]
        .bytes()
        .take_while(|b| *b != b'\n')
        .all(|b| b == b' ' || b == b'\t' || b == b'\r')
}

/// Leading whitespace of the first indented line, if any.
pub fn detect_indent_unit(ctx: &ParseContext) -> Option<String> {
    let source = ctx.source();
    let mut line_start = 0;
    while line_start < source.len() {
        let width = leading_width(source, line_start);
        if width > 0
            && !is_blank_line(source, line_start)
            && !ctx.is_inside_literal_text(line_start)
        {
            return Some(source[line_start..line_start + width].to_string());
        }
        line_start = match source[line_start..].find('\n') {
            Some(nl) => line_start + nl + 1,
            None => break,
        };
    }
    None
}

impl Indentation {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into(), shifts: BTreeMap::new() }
    }

    pub fn detect(ctx: &ParseContext, config: &PatchConfig) -> Self {
        Self::new(detect_indent_unit(ctx).unwrap_or_else(|| config.fallback_indent_unit()))
    }

    pub fn unit_width(&self) -> usize {
        self.unit.len()
    }

    pub fn render(&self, width: usize) -> String {
        let ch = if self.unit.starts_with('\t') { '\t' } else { ' ' };
        std::iter::repeat(ch).take(width).collect()
    }

    /// Indent width of the line containing `pos`, shifts included.
    pub fn indent_at(&self, ctx: &ParseContext, pos: usize) -> usize {
        let line_start = ctx.line_start(pos);
        let source = leading_width(ctx.source(), line_start) as isize;
        let shift = self.shifts.get(&line_start).copied().unwrap_or(0);
        (source + shift).max(0) as usize
    }

    /// Shift every line overlapping `start..end` by `delta`.
    ///
    /// The first line only moves when `start` begins it. Blank lines and
    /// lines that start inside a string or block comment are left alone.
    pub fn shift_lines(&mut self, ctx: &ParseContext, start: usize, end: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let source = ctx.source();
        let map = ctx.line_map();
        let first = map.line_of(start);
        let last = map.line_of(end);
        let mut line_start = ctx.line_start(start);
        for line in first..=last {
            let skip = (line == first && !ctx.starts_line(start))
                || is_blank_line(source, line_start)
                || ctx.is_inside_literal_text(line_start);
            if !skip {
                *self.shifts.entry(line_start).or_insert(0) += delta;
            }
            match source[line_start..].find('\n') {
                Some(nl) => line_start += nl + 1,
                None => break,
            }
        }
    }

    /// Emit the whitespace edits for every registered shift.
    ///
    /// Lines whose indentation is already covered by another edit keep it.
    pub fn apply(&self, ctx: &ParseContext, editor: &mut Editor<'_>) -> Result<(), EditError> {
        let source = ctx.source();
        for (&line_start, &delta) in &self.shifts {
            let current = leading_width(source, line_start);
            let wanted = (current as isize + delta).max(0) as usize;
            if wanted == current || editor.is_consumed(line_start, line_start + current) {
                continue;
            }
            let text = self.render(wanted);
            if current == 0 {
                editor.insert(line_start, &text)?;
            } else {
                editor.overwrite(line_start, line_start + current, &text)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_lexer::Lexer;

    fn context(source: &str) -> ParseContext {
        ParseContext::new(source, Lexer::new(source).tokenize().tokens)
    }

    #[test]
    fn detects_the_first_indented_line() {
        let ctx = context("a\n\n    b\n  c\n");
        assert_eq!(detect_indent_unit(&ctx).as_deref(), Some("    "));
        assert_eq!(detect_indent_unit(&context("a\nb\n")), None);

        let ctx = context("a\n");
        let config = PatchConfig { use_tabs: true, ..PatchConfig::default() };
        assert_eq!(Indentation::detect(&ctx, &config).render(2), "\t\t");
    }

    #[test]
    fn shifts_accumulate_and_skip_blank_lines() {
        let source = "f\n  a\n\n  b\n";
        let ctx = context(source);
        let mut indentation = Indentation::new("  ");
        indentation.shift_lines(&ctx, 4, 10, 2);
        indentation.shift_lines(&ctx, 4, 5, 2);
        assert_eq!(indentation.indent_at(&ctx, 4), 6);
        assert_eq!(indentation.indent_at(&ctx, 10), 4);

        let mut editor = Editor::new(source);
        indentation.apply(&ctx, &mut editor).unwrap();
        assert_eq!(editor.finish(), "f\n      a\n\n    b\n");
    }

    #[test]
    fn first_line_moves_only_when_the_range_starts_it() {
        let source = "x = f a,\n  b\n";
        let ctx = context(source);
        let mut indentation = Indentation::new("  ");
        indentation.shift_lines(&ctx, 6, 12, 2);
        assert_eq!(indentation.indent_at(&ctx, 0), 0);
        assert_eq!(indentation.indent_at(&ctx, 11), 4);
    }

    #[test]
    fn consumed_indentation_is_left_alone() {
        let source = "f\n  a\n";
        let ctx = context(source);
        let mut indentation = Indentation::new("  ");
        indentation.shift_lines(&ctx, 4, 5, 2);
        let mut editor = Editor::new(source);
        editor.overwrite(1, 4, ", ").unwrap();
        indentation.apply(&ctx, &mut editor).unwrap();
        assert_eq!(editor.finish(), "f, a\n");
    }
}
