// SPDX-License-Identifier: (MIT OR Apache-2.0)

use decaf_ast::{ParseContext, Span, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingKind {
    Comment,
    BlankLine,
}

/// Original formatting a patcher chose to carry forward into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedFormatting {
    pub kind: FormattingKind,
    pub span: Span,
    pub text: String,
}

/// Comments and blank lines strictly between `start` and `end`, in source order.
pub fn formatting_between(ctx: &ParseContext, start: usize, end: usize) -> Vec<CarriedFormatting> {
    let mut items: Vec<CarriedFormatting> = ctx
        .comments_between(start, end)
        .map(|t| CarriedFormatting {
            kind: FormattingKind::Comment,
            span: t.span,
            text: match &t.kind {
                TokenKind::Comment(text) => text.clone(),
                _ => ctx.text(t.span).to_string(),
            },
        })
        .collect();

    let source = ctx.source();
    let mut line_start = match source[start..end].find('\n') {
        Some(nl) => start + nl + 1,
        None => end,
    };
    while line_start < end {
        let line_end = source[line_start..]
            .find('\n')
            .map_or(source.len(), |nl| line_start + nl);
        if line_end > end {
            break;
        }
        if source[line_start..line_end].trim().is_empty() {
            items.push(CarriedFormatting {
                kind: FormattingKind::BlankLine,
                span: Span::new(line_start, line_end),
                text: String::new(),
            });
        }
        line_start = line_end + 1;
    }

    items.sort_by_key(|item| item.span.start);
    items
}
