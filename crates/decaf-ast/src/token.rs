// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the dialect scanner.

use crate::Span;

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    String(String),
    /// `true`/`yes`/`on` and `false`/`no`/`off`
    Bool(bool),
    Null,

    Ident(String),

    // Keywords
    For,
    In,
    Of,
    Own,
    By,
    When,
    Then,
    Return,
    This,
    And,
    Or,
    Not,
    Is,
    Isnt,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Dot,
    DotDot,
    DotDotDot,
    At,
    Arrow,
    FatArrow,
    Question,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Semi,
    Comma,

    Newline,
    /// `# ...` or `### ... ###`; the text includes the markers.
    Comment(String),
    Eof,
}

impl TokenKind {
    /// Tokens that carry no syntax: layout and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Comment(_))
    }

    /// Human-readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int(_) => "integer",
            TokenKind::Float(_) => "float",
            TokenKind::String(_) => "string",
            TokenKind::Bool(_) => "boolean",
            TokenKind::Null => "'null'",
            TokenKind::Ident(_) => "identifier",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Of => "'of'",
            TokenKind::Own => "'own'",
            TokenKind::By => "'by'",
            TokenKind::When => "'when'",
            TokenKind::Then => "'then'",
            TokenKind::Return => "'return'",
            TokenKind::This => "'this'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::Is => "'is'",
            TokenKind::Isnt => "'isnt'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "'..'",
            TokenKind::DotDotDot => "'...'",
            TokenKind::At => "'@'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Question => "'?'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",
            TokenKind::Newline => "newline",
            TokenKind::Comment(_) => "comment",
            TokenKind::Eof => "end of file",
        }
    }
}
