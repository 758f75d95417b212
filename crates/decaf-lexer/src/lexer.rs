// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use decaf_ast::token::{Token, TokenKind};
use decaf_ast::Span;
use logos::Logos;
use thiserror::Error;

/// Raw token type for logos; literal values are converted in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
enum RawToken {
    // === Keywords ===
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("of")]
    Of,
    #[token("own")]
    Own,
    #[token("by")]
    By,
    #[token("when")]
    When,
    #[token("then")]
    Then,
    #[token("return")]
    Return,
    #[token("this")]
    This,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("is")]
    Is,
    #[token("isnt")]
    Isnt,
    #[token("true")]
    #[token("yes")]
    #[token("on")]
    True,
    #[token("false")]
    #[token("no")]
    #[token("off")]
    False,
    #[token("null")]
    Null,

    // === Operators (longer first) ===
    #[token("...")]
    DotDotDot,
    #[token("..")]
    DotDot,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("?")]
    Question,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    // `# line` and `### block ###`; kept, since patchers carry them forward
    #[token("#", comment)]
    Comment,

    // === Literals ===
    #[regex(r"0x[0-9a-fA-F]+")]
    HexInt,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Float,

    #[regex(r"[0-9]+")]
    DecInt,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,
}

/// Consume the rest of a comment after its leading `#`.
fn comment(lexer: &mut logos::Lexer<RawToken>) {
    let rest = lexer.remainder();
    let is_block = rest.starts_with("##") && !rest[2..].starts_with('#');
    let consumed = if is_block {
        match rest[2..].find("###") {
            Some(close) => close + 5,
            // Unterminated block comment runs to end of input
            None => rest.len(),
        }
    } else {
        rest.find('\n').unwrap_or(rest.len())
    };
    lexer.bump(consumed);
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let kind = match result {
                Ok(raw) => match convert_token(raw, slice, span.start, span.end) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span.start));
                    continue;
                }
            };

            tokens.push(Token { kind, span: Span::new(span.start, span.end) });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult { tokens, errors: std::mem::take(&mut self.errors) }
    }
}

/// Convert a raw logos token to a `TokenKind`, parsing literal values.
fn convert_token(raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Of => TokenKind::Of,
        RawToken::Own => TokenKind::Own,
        RawToken::By => TokenKind::By,
        RawToken::When => TokenKind::When,
        RawToken::Then => TokenKind::Then,
        RawToken::Return => TokenKind::Return,
        RawToken::This => TokenKind::This,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::Is => TokenKind::Is,
        RawToken::Isnt => TokenKind::Isnt,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Null => TokenKind::Null,

        RawToken::DotDotDot => TokenKind::DotDotDot,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Dot => TokenKind::Dot,
        RawToken::At => TokenKind::At,
        RawToken::Question => TokenKind::Question,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,

        RawToken::Newline => TokenKind::Newline,
        RawToken::Comment => TokenKind::Comment(slice.to_string()),

        RawToken::HexInt => {
            let value = i64::from_str_radix(&slice[2..], 16)
                .map_err(|_| LexError::invalid_number(start, end))?;
            TokenKind::Int(value)
        }
        RawToken::DecInt => {
            let value = slice.parse::<i64>().map_err(|_| LexError::invalid_number(start, end))?;
            TokenKind::Int(value)
        }
        RawToken::Float => {
            let value = slice.parse::<f64>().map_err(|_| LexError::invalid_number(start, end))?;
            TokenKind::Float(value)
        }
        // Escapes are left as written; the output dialect shares them
        RawToken::String => TokenKind::String(slice[1..slice.len() - 1].to_string()),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
    })
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
            hint: None,
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Invalid number".to_string(),
            hint: Some("integer literals must fit in 64 bits".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let result = Lexer::new(source).tokenize();
        assert!(result.is_ok(), "{:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn loop_header_connectors() {
        assert_eq!(
            kinds("for x, i in xs by -2 when x then f x"),
            vec![
                TokenKind::For,
                TokenKind::Ident("x".into()),
                TokenKind::Comma,
                TokenKind::Ident("i".into()),
                TokenKind::In,
                TokenKind::Ident("xs".into()),
                TokenKind::By,
                TokenKind::Minus,
                TokenKind::Int(2),
                TokenKind::When,
                TokenKind::Ident("x".into()),
                TokenKind::Then,
                TokenKind::Ident("f".into()),
                TokenKind::Ident("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_need_word_boundaries() {
        assert_eq!(
            kinds("format isnt offset"),
            vec![
                TokenKind::Ident("format".into()),
                TokenKind::Isnt,
                TokenKind::Ident("offset".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_tokens() {
        let result = Lexer::new("a # note\n###\nblock\n### b").tokenize();
        let spans: Vec<_> = result
            .tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Comment(_)))
            .map(|t| t.span)
            .collect();
        assert_eq!(spans, vec![Span::new(2, 8), Span::new(9, 22)]);
        assert_eq!(result.tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn numbers_and_strings() {
        assert_eq!(
            kinds("0.5 0x1F 'a' \"b\""),
            vec![
                TokenKind::Float(0.5),
                TokenKind::Int(31),
                TokenKind::String("a".into()),
                TokenKind::String("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn arrows_and_this() {
        assert_eq!(
            kinds("(a) => @b"),
            vec![
                TokenKind::LParen,
                TokenKind::Ident("a".into()),
                TokenKind::RParen,
                TokenKind::FatArrow,
                TokenKind::At,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unexpected_character_is_reported() {
        let result = Lexer::new("a ~ b").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].span, Span::new(2, 3));
    }
}
