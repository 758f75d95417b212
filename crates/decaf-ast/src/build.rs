// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Hand assembly of syntax trees with byte-accurate spans.
//!
//! Nodes are located through the token stream: leaves name the token text
//! and which occurrence to take, composite nodes derive their span from
//! their children plus the delimiter tokens around them. Lookup failures
//! panic, since a mismatch means the fixture itself is wrong.

use std::cell::Cell;

use crate::node::{BinaryOp, Node, NodeKind, ObjectMember};
use crate::token::{Token, TokenKind};
use crate::{NodeId, ParseContext, Span};

pub struct TreeBuilder<'a> {
    ctx: &'a ParseContext,
    next_id: Cell<u32>,
}

/// Children of a `for ... in` loop.
pub struct ForInParts {
    pub value: Option<Node>,
    pub key: Option<Node>,
    pub target: Node,
    pub step: Option<Node>,
    pub filter: Option<Node>,
    pub body: Node,
}

/// Children of a `for ... of` loop.
pub struct ForOfParts {
    pub key: Node,
    pub value: Option<Node>,
    pub target: Node,
    pub filter: Option<Node>,
    pub body: Node,
    pub own: bool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(ctx: &'a ParseContext) -> Self {
        Self { ctx, next_id: Cell::new(0) }
    }

    fn node(&self, kind: NodeKind, span: Span) -> Node {
        let id = NodeId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        Node::new(id, kind, span)
    }

    /// Span of the `nth` (0-based) token whose source text is `text`.
    pub fn token(&self, text: &str, nth: usize) -> Span {
        self.ctx
            .tokens()
            .iter()
            .filter(|t| self.ctx.text(t.span) == text)
            .nth(nth)
            .map(|t| t.span)
            .unwrap_or_else(|| panic!("no occurrence {nth} of token `{text}`"))
    }

    fn next_after(&self, pos: usize) -> &Token {
        self.ctx
            .next_significant_token(pos)
            .unwrap_or_else(|| panic!("no token after {pos}"))
    }

    fn prev_before(&self, pos: usize) -> &Token {
        self.ctx
            .previous_significant_token(pos)
            .unwrap_or_else(|| panic!("no token before {pos}"))
    }

    fn expect_after(&self, pos: usize, kind: TokenKind) -> Span {
        let t = self.next_after(pos);
        assert_eq!(t.kind, kind, "expected {} after {pos}", kind.display_name());
        t.span
    }

    // --- Leaves ---

    pub fn ident(&self, name: &str, nth: usize) -> Node {
        self.node(NodeKind::Identifier(name.to_string()), self.token(name, nth))
    }

    pub fn int(&self, text: &str, nth: usize) -> Node {
        let value = text.parse().unwrap_or_else(|_| panic!("`{text}` is not an integer"));
        self.node(NodeKind::Int(value), self.token(text, nth))
    }

    pub fn float(&self, text: &str, nth: usize) -> Node {
        let value = text.parse().unwrap_or_else(|_| panic!("`{text}` is not a float"));
        self.node(NodeKind::Float(value), self.token(text, nth))
    }

    /// `text` includes the quotes.
    pub fn string(&self, text: &str, nth: usize) -> Node {
        let inner = text[1..text.len() - 1].to_string();
        self.node(NodeKind::String(inner), self.token(text, nth))
    }

    pub fn boolean(&self, text: &str, nth: usize) -> Node {
        let value = matches!(text, "true" | "yes" | "on");
        self.node(NodeKind::Bool(value), self.token(text, nth))
    }

    pub fn null(&self, nth: usize) -> Node {
        self.node(NodeKind::Null, self.token("null", nth))
    }

    pub fn this(&self, nth: usize) -> Node {
        self.node(NodeKind::This { shorthand: false }, self.token("this", nth))
    }

    /// A bare `@`.
    pub fn at(&self, nth: usize) -> Node {
        self.node(NodeKind::This { shorthand: true }, self.token("@", nth))
    }

    /// `@member`, built on the `nth` `@` token.
    pub fn this_member(&self, member: &str, nth: usize) -> Node {
        let this = self.at(nth);
        let name = self.next_after(this.span.end).span;
        assert_eq!(self.ctx.text(name), member);
        let span = Span::new(this.span.start, name.end);
        self.node(
            NodeKind::MemberAccess { expression: Box::new(this), member: member.to_string() },
            span,
        )
    }

    // --- Composite expressions ---

    pub fn member(&self, object: Node, member: &str) -> Node {
        let dot = self.expect_after(object.outer.end, TokenKind::Dot);
        let name = self.next_after(dot.end).span;
        assert_eq!(self.ctx.text(name), member);
        let span = Span::new(object.outer.start, name.end);
        self.node(
            NodeKind::MemberAccess { expression: Box::new(object), member: member.to_string() },
            span,
        )
    }

    pub fn index(&self, object: Node, index: Node) -> Node {
        let close = self.expect_after(index.outer.end, TokenKind::RBracket);
        let span = Span::new(object.outer.start, close.end);
        self.node(
            NodeKind::DynamicMemberAccess { expression: Box::new(object), index: Box::new(index) },
            span,
        )
    }

    /// Explicit `f(a)` when `(` directly follows the callee, implicit `f a` otherwise.
    pub fn call(&self, function: Node, arguments: Vec<Node>) -> Node {
        let next = self.next_after(function.outer.end);
        let end = if next.kind == TokenKind::LParen && next.span.start == function.outer.end {
            let after = arguments.last().map_or(next.span.end, |a| a.outer.end);
            self.expect_after(after, TokenKind::RParen).end
        } else {
            arguments
                .last()
                .map(|a| a.outer.end)
                .unwrap_or_else(|| panic!("implicit call without arguments"))
        };
        let span = Span::new(function.outer.start, end);
        self.node(
            NodeKind::FunctionApplication { function: Box::new(function), arguments },
            span,
        )
    }

    pub fn negate(&self, operand: Node) -> Node {
        let minus = self.prev_before(operand.outer.start);
        assert_eq!(minus.kind, TokenKind::Minus, "negation needs a leading '-'");
        let span = Span::new(minus.span.start, operand.outer.end);
        self.node(NodeKind::UnaryNegate(Box::new(operand)), span)
    }

    pub fn binary(&self, op: BinaryOp, left: Node, right: Node) -> Node {
        let span = Span::new(left.outer.start, right.outer.end);
        self.node(NodeKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
    }

    pub fn assign(&self, assignee: Node, expression: Node) -> Node {
        let span = Span::new(assignee.outer.start, expression.outer.end);
        self.node(
            NodeKind::Assign { assignee: Box::new(assignee), expression: Box::new(expression) },
            span,
        )
    }

    /// Braced when a `{` directly precedes the first key, implicit otherwise.
    pub fn object(&self, members: Vec<(Node, Node)>) -> Node {
        let first = members.first().map(|(k, _)| k.outer.start).expect("object needs a member");
        let last = members.last().map(|(_, v)| v.outer.end).expect("object needs a member");
        let open = self.prev_before(first);
        let span = if open.kind == TokenKind::LBrace {
            Span::new(open.span.start, self.expect_after(last, TokenKind::RBrace).end)
        } else {
            Span::new(first, last)
        };
        let members = members
            .into_iter()
            .map(|(key, expression)| ObjectMember { key, expression })
            .collect();
        self.node(NodeKind::ObjectInitialiser(members), span)
    }

    /// Built on the `nth` `[` token.
    pub fn array(&self, elements: Vec<Node>, nth: usize) -> Node {
        let open = self.token("[", nth);
        let after = elements.last().map_or(open.end, |e| e.outer.end);
        let close = self.expect_after(after, TokenKind::RBracket);
        self.node(NodeKind::ArrayInitialiser(elements), Span::new(open.start, close.end))
    }

    /// Widen the outer span over the surrounding `(` `)`.
    pub fn paren(&self, node: Node) -> Node {
        let open = self.prev_before(node.outer.start);
        assert_eq!(open.kind, TokenKind::LParen);
        let close = self.expect_after(node.outer.end, TokenKind::RParen);
        let outer = Span::new(open.span.start, close.end);
        node.with_outer(outer)
    }

    // --- Statements ---

    pub fn block(&self, statements: Vec<Node>) -> Node {
        let start = statements.first().map(|s| s.outer.start).expect("empty block");
        let end = statements.last().map(|s| s.outer.end).expect("empty block");
        self.node(NodeKind::Block(statements), Span::new(start, end))
    }

    /// Built on the `nth` `return` token.
    pub fn ret(&self, expression: Option<Node>, nth: usize) -> Node {
        let keyword = self.token("return", nth);
        let end = expression.as_ref().map_or(keyword.end, |e| e.outer.end);
        self.node(NodeKind::Return(expression.map(Box::new)), Span::new(keyword.start, end))
    }

    /// Built on the `nth` arrow token (`->`, or `=>` when `bound`).
    pub fn function(&self, params: Vec<Node>, body: Option<Node>, nth: usize, bound: bool) -> Node {
        let arrow = self.token(if bound { "=>" } else { "->" }, nth);
        let before = self.ctx.previous_significant_token(arrow.start);
        let start = match before {
            Some(t) if t.kind == TokenKind::RParen => self.matching_open_paren(t.span.start),
            _ => arrow.start,
        };
        let end = body.as_ref().map_or(arrow.end, |b| b.outer.end);
        self.node(
            NodeKind::Function { params, body: body.map(Box::new), bound },
            Span::new(start, end),
        )
    }

    fn matching_open_paren(&self, close_start: usize) -> usize {
        let tokens = self.ctx.tokens();
        let mut idx = self.ctx.token_index_at_or_after(close_start);
        let mut depth = 0usize;
        loop {
            match tokens[idx].kind {
                TokenKind::RParen => depth += 1,
                TokenKind::LParen => {
                    depth -= 1;
                    if depth == 0 {
                        return tokens[idx].span.start;
                    }
                }
                _ => {}
            }
            idx = idx.checked_sub(1).expect("unbalanced parentheses");
        }
    }

    /// Built on the `nth` `for` token.
    pub fn for_in(&self, nth: usize, parts: ForInParts) -> Node {
        let keyword = self.token("for", nth);
        let span = Span::new(keyword.start, parts.body.outer.end);
        self.node(
            NodeKind::ForIn {
                key_assignee: parts.key.map(Box::new),
                val_assignee: parts.value.map(Box::new),
                target: Box::new(parts.target),
                step: parts.step.map(Box::new),
                filter: parts.filter.map(Box::new),
                body: Box::new(parts.body),
            },
            span,
        )
    }

    /// Built on the `nth` `for` token.
    pub fn for_of(&self, nth: usize, parts: ForOfParts) -> Node {
        let keyword = self.token("for", nth);
        let span = Span::new(keyword.start, parts.body.outer.end);
        self.node(
            NodeKind::ForOf {
                key_assignee: Box::new(parts.key),
                val_assignee: parts.value.map(Box::new),
                target: Box::new(parts.target),
                filter: parts.filter.map(Box::new),
                body: Box::new(parts.body),
                own: parts.own,
            },
            span,
        )
    }

    pub fn program(&self, body: Option<Node>) -> Node {
        let span = Span::new(0, self.ctx.source().len());
        self.node(NodeKind::Program(body.map(Box::new)), span)
    }
}
