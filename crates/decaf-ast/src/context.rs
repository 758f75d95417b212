// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source text plus token stream, with the lookups patchers perform on them.

use crate::token::{Token, TokenKind};
use crate::{LineMap, Span};

/// Everything the parser hands over besides the tree itself.
#[derive(Debug, Clone)]
pub struct ParseContext {
    source: String,
    tokens: Vec<Token>,
    line_map: LineMap,
}

impl ParseContext {
    /// `tokens` must be sorted by start offset and must not overlap.
    pub fn new(source: impl Into<String>, tokens: Vec<Token>) -> Self {
        let source = source.into();
        let line_map = LineMap::new(&source);
        Self { source, tokens, line_map }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    /// Index of the first token starting at or after `pos`.
    pub fn token_index_at_or_after(&self, pos: usize) -> usize {
        self.tokens.partition_point(|t| t.span.start < pos)
    }

    /// First token inside `start..end` matching `pred`.
    pub fn find_token(
        &self,
        start: usize,
        end: usize,
        pred: impl Fn(&TokenKind) -> bool,
    ) -> Option<&Token> {
        self.tokens[self.token_index_at_or_after(start)..]
            .iter()
            .take_while(|t| t.span.end <= end)
            .find(|t| pred(&t.kind))
    }

    /// First non-trivia token starting at or after `pos`.
    pub fn next_significant_token(&self, pos: usize) -> Option<&Token> {
        self.tokens[self.token_index_at_or_after(pos)..]
            .iter()
            .find(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
    }

    /// Last non-trivia token ending at or before `pos`.
    pub fn previous_significant_token(&self, pos: usize) -> Option<&Token> {
        let end = self.tokens.partition_point(|t| t.span.end <= pos);
        self.tokens[..end]
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
    }

    /// Comment tokens lying inside `start..end`.
    pub fn comments_between(&self, start: usize, end: usize) -> impl Iterator<Item = &Token> {
        self.tokens[self.token_index_at_or_after(start)..]
            .iter()
            .take_while(move |t| t.span.end <= end)
            .filter(|t| matches!(t.kind, TokenKind::Comment(_)))
    }

    /// True if `pos` falls strictly inside a string or block comment token,
    /// where line starts are content rather than indentation.
    pub fn is_inside_literal_text(&self, pos: usize) -> bool {
        let idx = self.tokens.partition_point(|t| t.span.start < pos);
        idx > 0 && {
            let t = &self.tokens[idx - 1];
            t.span.end > pos && matches!(t.kind, TokenKind::String(_) | TokenKind::Comment(_))
        }
    }

    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    pub fn line_start(&self, pos: usize) -> usize {
        self.line_map.line_start(pos)
    }

    /// True if only whitespace precedes `pos` on its line.
    pub fn starts_line(&self, pos: usize) -> bool {
        self.source[self.line_start(pos)..pos]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, start: usize, end: usize) -> Token {
        Token { kind, span: Span::new(start, end) }
    }

    // for x in xs then f x   # hi
    fn sample() -> ParseContext {
        let src = "for x in xs then f x   # hi\n";
        ParseContext::new(
            src,
            vec![
                tok(TokenKind::For, 0, 3),
                tok(TokenKind::Ident("x".into()), 4, 5),
                tok(TokenKind::In, 6, 8),
                tok(TokenKind::Ident("xs".into()), 9, 11),
                tok(TokenKind::Then, 12, 16),
                tok(TokenKind::Ident("f".into()), 17, 18),
                tok(TokenKind::Ident("x".into()), 19, 20),
                tok(TokenKind::Comment("# hi".into()), 23, 27),
                tok(TokenKind::Newline, 27, 28),
                tok(TokenKind::Eof, 28, 28),
            ],
        )
    }

    #[test]
    fn finds_connector_tokens() {
        let ctx = sample();
        let then = ctx.find_token(11, 17, |k| *k == TokenKind::Then).unwrap();
        assert_eq!(then.span, Span::new(12, 16));
        assert!(ctx.find_token(0, 11, |k| *k == TokenKind::Then).is_none());
    }

    #[test]
    fn significant_neighbours_skip_trivia() {
        let ctx = sample();
        assert_eq!(ctx.next_significant_token(11).unwrap().kind, TokenKind::Then);
        assert!(ctx.next_significant_token(21).is_none());
        let prev = ctx.previous_significant_token(28).unwrap();
        assert_eq!(prev.kind, TokenKind::Ident("x".into()));
    }

    #[test]
    fn comments_and_literal_text() {
        let ctx = sample();
        assert_eq!(ctx.comments_between(0, 28).count(), 1);
        assert!(ctx.is_inside_literal_text(25));
        assert!(!ctx.is_inside_literal_text(23));
        assert!(ctx.starts_line(0));
        assert!(!ctx.starts_line(4));
    }
}
