// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The contract every node patcher implements.
//!
//! A patcher is built once per syntax node, initialized bottom-up, told by
//! its parent whether an expression is required, and then patched exactly
//! once. Patching emits overlay edits and nothing else.

use decaf_ast::{NodeId, Node, Span};

use crate::bindings::ScopeId;
use crate::context::PatchContext;
use crate::error::{PatchError, PatchResult};
use crate::expr::{
    ArrayPatcher, AssignPatcher, BinaryPatcher, CallPatcher, IdentifierPatcher, IndexPatcher,
    LiteralPatcher, MemberAccessPatcher, NegatePatcher, ObjectPatcher, ReturnPatcher, ThisPatcher,
};
use crate::for_in::ForInPatcher;
use crate::for_of::ForOfPatcher;
use crate::function::FunctionPatcher;

/// Range bookkeeping and protocol flags shared by all patchers.
#[derive(Debug, Clone)]
pub struct PatcherBase {
    pub node: &'static str,
    pub id: NodeId,
    /// The node's own text.
    pub content: Span,
    /// `content` plus any grouping delimiters around it.
    pub outer: Span,
    /// Scope synthesized bindings are claimed in.
    pub scope: ScopeId,
    expression_required: bool,
    patched: bool,
}

impl PatcherBase {
    pub fn new(node: &Node, scope: ScopeId) -> Self {
        Self {
            node: node.type_name(),
            id: node.id,
            content: node.span,
            outer: node.outer,
            scope,
            expression_required: false,
            patched: false,
        }
    }

    pub fn expression_required(&self) -> bool {
        self.expression_required
    }

    pub fn is_patched(&self) -> bool {
        self.patched
    }

    pub fn invalid(&self, reason: impl Into<String>) -> PatchError {
        PatchError::invalid_tree(self.node, self.content, reason)
    }
}

pub trait NodePatcher {
    fn base(&self) -> &PatcherBase;
    fn base_mut(&mut self) -> &mut PatcherBase;

    /// One-time setup, run after the children were initialized.
    fn initialize(&mut self) {}

    /// Whether the node can produce valid output as an expression.
    fn can_patch_as_expression(&self) -> bool {
        true
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()>;

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        if self.statement_needs_parens() {
            let content = self.base().content;
            cx.prepend(content.start, "(")?;
            self.patch_as_expression(cx)?;
            cx.insert(content.end, ")")
        } else {
            self.patch_as_expression(cx)
        }
    }

    /// Safe to evaluate more than once without repeating side effects.
    fn is_repeatable(&self) -> bool {
        false
    }

    /// Would be misparsed at the start of a statement without parentheses.
    fn statement_needs_parens(&self) -> bool {
        false
    }

    fn statement_needs_semicolon(&self) -> bool {
        true
    }

    /// Contains a `return` that would escape a function wrapper.
    fn contains_return(&self) -> bool {
        false
    }

    fn set_requires_expression(&mut self) {
        self.base_mut().expression_required = true;
    }

    fn patch(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let base = self.base();
        if base.patched {
            return Err(PatchError::AlreadyPatched { node: base.node, span: base.content });
        }
        let required = base.expression_required;
        if required && !self.can_patch_as_expression() {
            let base = self.base();
            return Err(PatchError::ExpressionNotSupported { node: base.node, span: base.content });
        }
        self.base_mut().patched = true;
        if required {
            self.patch_as_expression(cx)
        } else {
            self.patch_as_statement(cx)
        }
    }

    fn content(&self) -> Span {
        self.base().content
    }

    fn outer(&self) -> Span {
        self.base().outer
    }
}

/// Every patcher that can appear as a child of another.
#[derive(Debug)]
pub enum Patcher {
    Identifier(IdentifierPatcher),
    Literal(LiteralPatcher),
    This(ThisPatcher),
    MemberAccess(MemberAccessPatcher),
    Index(IndexPatcher),
    Call(CallPatcher),
    Negate(NegatePatcher),
    Binary(BinaryPatcher),
    Assign(AssignPatcher),
    Object(ObjectPatcher),
    Array(ArrayPatcher),
    Function(FunctionPatcher),
    Return(ReturnPatcher),
    ForIn(ForInPatcher),
    ForOf(ForOfPatcher),
}

/// The two accessors every concrete patcher implements the same way.
macro_rules! base_accessors {
    () => {
        fn base(&self) -> &$crate::patcher::PatcherBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut $crate::patcher::PatcherBase {
            &mut self.base
        }
    };
}

pub(crate) use base_accessors;

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Patcher::Identifier($p) => $body,
            Patcher::Literal($p) => $body,
            Patcher::This($p) => $body,
            Patcher::MemberAccess($p) => $body,
            Patcher::Index($p) => $body,
            Patcher::Call($p) => $body,
            Patcher::Negate($p) => $body,
            Patcher::Binary($p) => $body,
            Patcher::Assign($p) => $body,
            Patcher::Object($p) => $body,
            Patcher::Array($p) => $body,
            Patcher::Function($p) => $body,
            Patcher::Return($p) => $body,
            Patcher::ForIn($p) => $body,
            Patcher::ForOf($p) => $body,
        }
    };
}

impl Patcher {
    /// Value of a numeric literal.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Patcher::Literal(p) => p.numeric_value(),
            _ => None,
        }
    }

    pub fn is_object_initialiser(&self) -> bool {
        matches!(self, Patcher::Object(_))
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Patcher::Identifier(_))
    }
}

impl NodePatcher for Patcher {
    fn base(&self) -> &PatcherBase {
        dispatch!(self, p => p.base())
    }

    fn base_mut(&mut self) -> &mut PatcherBase {
        dispatch!(self, p => p.base_mut())
    }

    fn initialize(&mut self) {
        dispatch!(self, p => p.initialize())
    }

    fn can_patch_as_expression(&self) -> bool {
        dispatch!(self, p => p.can_patch_as_expression())
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        dispatch!(self, p => p.patch_as_expression(cx))
    }

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        dispatch!(self, p => p.patch_as_statement(cx))
    }

    fn is_repeatable(&self) -> bool {
        dispatch!(self, p => p.is_repeatable())
    }

    fn statement_needs_parens(&self) -> bool {
        dispatch!(self, p => p.statement_needs_parens())
    }

    fn statement_needs_semicolon(&self) -> bool {
        dispatch!(self, p => p.statement_needs_semicolon())
    }

    fn contains_return(&self) -> bool {
        dispatch!(self, p => p.contains_return())
    }
}
