// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree nodes.

use crate::{NodeId, Span};

/// A node in the syntax tree.
///
/// `span` covers the node's own text; `outer` additionally covers any
/// delimiters wrapped directly around it (grouping parentheses).
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub span: Span,
    pub outer: Span,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, span: Span) -> Self {
        Self { id, kind, span, outer: span }
    }

    pub fn with_outer(mut self, outer: Span) -> Self {
        self.outer = outer;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// The kind of node, with its kind-specific children.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Root of a file. The body is absent for an empty file.
    Program(Option<Box<Node>>),
    /// Sequence of statements forming a body.
    Block(Vec<Node>),
    Identifier(String),
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    /// `this`, or `@` when `shorthand` is set.
    This { shorthand: bool },
    /// `a.b`, or `@b` when the object is a shorthand `This`.
    MemberAccess { expression: Box<Node>, member: String },
    /// `a[b]`
    DynamicMemberAccess { expression: Box<Node>, index: Box<Node> },
    /// `f(a, b)` or the implicit form `f a, b`.
    FunctionApplication { function: Box<Node>, arguments: Vec<Node> },
    /// `-a`
    UnaryNegate(Box<Node>),
    Binary { op: BinaryOp, left: Box<Node>, right: Box<Node> },
    Assign { assignee: Box<Node>, expression: Box<Node> },
    /// `{a: 1}` or the implicit form `a: 1`.
    ObjectInitialiser(Vec<ObjectMember>),
    ArrayInitialiser(Vec<Node>),
    /// `(a) -> body`, or `(a) => body` when `bound`.
    Function { params: Vec<Node>, body: Option<Box<Node>>, bound: bool },
    Return(Option<Box<Node>>),
    /// `for value[, key] in target [by step] [when filter]`
    ForIn {
        key_assignee: Option<Box<Node>>,
        val_assignee: Option<Box<Node>>,
        target: Box<Node>,
        step: Option<Box<Node>>,
        filter: Option<Box<Node>>,
        body: Box<Node>,
    },
    /// `for [own] key[, value] of target [when filter]`
    ForOf {
        key_assignee: Box<Node>,
        val_assignee: Option<Box<Node>>,
        target: Box<Node>,
        filter: Option<Box<Node>>,
        body: Box<Node>,
        own: bool,
    },
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Program(_) => "Program",
            NodeKind::Block(_) => "Block",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::Int(_) => "Int",
            NodeKind::Float(_) => "Float",
            NodeKind::String(_) => "String",
            NodeKind::Bool(_) => "Bool",
            NodeKind::Null => "Null",
            NodeKind::This { .. } => "This",
            NodeKind::MemberAccess { .. } => "MemberAccessOp",
            NodeKind::DynamicMemberAccess { .. } => "DynamicMemberAccessOp",
            NodeKind::FunctionApplication { .. } => "FunctionApplication",
            NodeKind::UnaryNegate(_) => "UnaryNegateOp",
            NodeKind::Binary { .. } => "BinaryOp",
            NodeKind::Assign { .. } => "AssignOp",
            NodeKind::ObjectInitialiser(_) => "ObjectInitialiser",
            NodeKind::ArrayInitialiser(_) => "ArrayInitialiser",
            NodeKind::Function { .. } => "Function",
            NodeKind::Return(_) => "Return",
            NodeKind::ForIn { .. } => "ForIn",
            NodeKind::ForOf { .. } => "ForOf",
        }
    }
}

/// `key: expression` inside an object literal.
#[derive(Debug, Clone)]
pub struct ObjectMember {
    pub key: Node,
    pub expression: Node,
}

/// Binary operators the dialect spells differently from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Spelling in the output dialect.
    pub fn output_operator(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "===",
            BinaryOp::Ne => "!==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}
