// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Construction of the patcher tree from a syntax tree.
//!
//! Walks the tree once, validating the shapes the patchers rely on,
//! recording the names every scope uses, and running each patcher's
//! `initialize` after its children were built.

use decaf_ast::{Node, NodeKind, ParseContext, Span, TokenKind};

use crate::bindings::{Bindings, ScopeId};
use crate::block::{BlockPatcher, ProgramPatcher};
use crate::error::{PatchError, PatchResult};
use crate::expr::{
    ArrayPatcher, AssignPatcher, BinaryPatcher, CallPatcher, IdentifierPatcher, IndexPatcher,
    LiteralPatcher, LiteralValue, MemberAccessPatcher, NegatePatcher, ObjectPatcher,
    ReturnPatcher, ThisPatcher,
};
use crate::for_in::ForInPatcher;
use crate::for_of::ForOfPatcher;
use crate::function::FunctionPatcher;
use crate::patcher::{NodePatcher, Patcher, PatcherBase};

pub struct PatcherBuilder<'a> {
    ctx: &'a ParseContext,
    bindings: Bindings,
}

impl<'a> PatcherBuilder<'a> {
    pub fn new(ctx: &'a ParseContext) -> Self {
        Self { ctx, bindings: Bindings::new() }
    }

    /// The scope tree with every source name recorded.
    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }

    pub fn build_program(&mut self, node: &Node) -> PatchResult<ProgramPatcher> {
        let NodeKind::Program(body) = &node.kind else {
            return Err(PatchError::invalid_tree(node.type_name(), node.span, "expected a program"));
        };
        let base = PatcherBase::new(node, Bindings::ROOT);
        let body = match body {
            Some(body) => Some(self.build_block(body, Bindings::ROOT)?),
            None => None,
        };
        Ok(ProgramPatcher::new(base, body))
    }

    pub fn build_block(&mut self, node: &Node, scope: ScopeId) -> PatchResult<BlockPatcher> {
        let NodeKind::Block(statements) = &node.kind else {
            return Err(PatchError::invalid_tree(node.type_name(), node.span, "expected a block"));
        };
        if statements.is_empty() {
            return Err(PatchError::invalid_tree("Block", node.span, "empty block"));
        }
        let statements = statements
            .iter()
            .map(|s| self.build(s, scope))
            .collect::<PatchResult<Vec<_>>>()?;
        let inline = !self.ctx.starts_line(node.span.start);
        Ok(BlockPatcher::new(PatcherBase::new(node, scope), statements, inline))
    }

    fn boxed(&mut self, node: &Node, scope: ScopeId) -> PatchResult<Box<Patcher>> {
        self.build(node, scope).map(Box::new)
    }

    fn boxed_opt(&mut self, node: Option<&Node>, scope: ScopeId) -> PatchResult<Option<Box<Patcher>>> {
        node.map(|n| self.boxed(n, scope)).transpose()
    }

    pub fn build(&mut self, node: &Node, scope: ScopeId) -> PatchResult<Patcher> {
        let mut patcher = self.construct(node, scope)?;
        patcher.initialize();
        Ok(patcher)
    }

    fn construct(&mut self, node: &Node, scope: ScopeId) -> PatchResult<Patcher> {
        let base = PatcherBase::new(node, scope);
        let patcher = match &node.kind {
            NodeKind::Program(_) | NodeKind::Block(_) => {
                return Err(base.invalid("statement sequence in expression position"));
            }
            NodeKind::Identifier(name) => {
                self.bindings.declare(scope, name);
                Patcher::Identifier(IdentifierPatcher::new(base))
            }
            NodeKind::Int(v) => Patcher::Literal(LiteralPatcher::new(base, LiteralValue::Int(*v))),
            NodeKind::Float(v) => Patcher::Literal(LiteralPatcher::new(base, LiteralValue::Float(*v))),
            NodeKind::String(_) => Patcher::Literal(LiteralPatcher::new(base, LiteralValue::String)),
            NodeKind::Bool(v) => Patcher::Literal(LiteralPatcher::new(base, LiteralValue::Bool(*v))),
            NodeKind::Null => Patcher::Literal(LiteralPatcher::new(base, LiteralValue::Null)),
            NodeKind::This { shorthand } => Patcher::This(ThisPatcher::new(base, *shorthand)),
            NodeKind::MemberAccess { expression, .. } => {
                let object = self.boxed(expression, scope)?;
                Patcher::MemberAccess(MemberAccessPatcher::new(base, object))
            }
            NodeKind::DynamicMemberAccess { expression, index } => {
                let object = self.boxed(expression, scope)?;
                let index = self.boxed(index, scope)?;
                Patcher::Index(IndexPatcher::new(base, object, index))
            }
            NodeKind::FunctionApplication { function, arguments } => {
                let implicit = !self.has_call_parens(function);
                let function = self.boxed(function, scope)?;
                let arguments = arguments
                    .iter()
                    .map(|a| self.build(a, scope))
                    .collect::<PatchResult<Vec<_>>>()?;
                Patcher::Call(CallPatcher::new(base, function, arguments, implicit)?)
            }
            NodeKind::UnaryNegate(operand) => {
                let operand = self.boxed(operand, scope)?;
                Patcher::Negate(NegatePatcher::new(base, operand))
            }
            NodeKind::Binary { op, left, right } => {
                let operator = self.operator_between(&base, left, right)?;
                let left = self.boxed(left, scope)?;
                let right = self.boxed(right, scope)?;
                Patcher::Binary(BinaryPatcher::new(base, *op, operator, left, right))
            }
            NodeKind::Assign { assignee, expression } => {
                let assignee = self.boxed(assignee, scope)?;
                let expression = self.boxed(expression, scope)?;
                Patcher::Assign(AssignPatcher::new(base, assignee, expression))
            }
            NodeKind::ObjectInitialiser(members) => {
                let braced = self.ctx.source()[node.span.start..].starts_with('{');
                let members = members
                    .iter()
                    .map(|m| -> PatchResult<(Patcher, Patcher)> {
                        Ok((self.build(&m.key, scope)?, self.build(&m.expression, scope)?))
                    })
                    .collect::<PatchResult<Vec<_>>>()?;
                Patcher::Object(ObjectPatcher::new(base, members, braced))
            }
            NodeKind::ArrayInitialiser(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| self.build(e, scope))
                    .collect::<PatchResult<Vec<_>>>()?;
                Patcher::Array(ArrayPatcher::new(base, elements))
            }
            NodeKind::Function { params, body, bound } => {
                let inner = self.bindings.add_scope(scope);
                let arrow = self.arrow(&base, params.last())?;
                let params = params
                    .iter()
                    .map(|p| self.build(p, inner))
                    .collect::<PatchResult<Vec<_>>>()?;
                let body = match body {
                    Some(body) => Some(self.build_block(body, inner)?),
                    None => None,
                };
                Patcher::Function(FunctionPatcher::new(base, params, body, *bound, arrow))
            }
            NodeKind::Return(expression) => {
                let expression = self.boxed_opt(expression.as_deref(), scope)?;
                Patcher::Return(ReturnPatcher::new(base, expression))
            }
            NodeKind::ForIn { key_assignee, val_assignee, target, step, filter, body } => {
                let Some(val_assignee) = val_assignee else {
                    return Err(base.invalid("loop without a value assignee"));
                };
                Self::check_loop_shape(&base, target, body)?;
                let val_assignee = self.boxed(val_assignee, scope)?;
                let key_assignee = self.boxed_opt(key_assignee.as_deref(), scope)?;
                let target = self.boxed(target, scope)?;
                let step = self.boxed_opt(step.as_deref(), scope)?;
                let filter = self.boxed_opt(filter.as_deref(), scope)?;
                let body = self.build_block(body, scope)?;
                Patcher::ForIn(ForInPatcher::new(
                    base,
                    val_assignee,
                    key_assignee,
                    target,
                    step,
                    filter,
                    body,
                ))
            }
            NodeKind::ForOf { key_assignee, val_assignee, target, filter, body, own } => {
                Self::check_loop_shape(&base, target, body)?;
                let key_assignee = self.boxed(key_assignee, scope)?;
                let val_assignee = self.boxed_opt(val_assignee.as_deref(), scope)?;
                let target = self.boxed(target, scope)?;
                let filter = self.boxed_opt(filter.as_deref(), scope)?;
                let body = self.build_block(body, scope)?;
                Patcher::ForOf(ForOfPatcher::new(
                    base,
                    key_assignee,
                    val_assignee,
                    target,
                    filter,
                    body,
                    *own,
                ))
            }
        };
        Ok(patcher)
    }

    /// Only the prefix form with a block body is supported.
    fn check_loop_shape(base: &PatcherBase, target: &Node, body: &Node) -> PatchResult<()> {
        if body.span.start < target.span.start {
            return Err(base.invalid("postfix loops are not supported"));
        }
        if !matches!(body.kind, NodeKind::Block(_)) {
            return Err(base.invalid("loop body is not a block"));
        }
        Ok(())
    }

    /// `f(a)` has its `(` directly after the callee.
    fn has_call_parens(&self, function: &Node) -> bool {
        self.ctx
            .next_significant_token(function.outer.end)
            .is_some_and(|t| t.kind == TokenKind::LParen && t.span.start == function.outer.end)
    }

    fn operator_between(&self, base: &PatcherBase, left: &Node, right: &Node) -> PatchResult<Span> {
        self.ctx
            .find_token(left.outer.end, right.outer.start, |k| !k.is_trivia())
            .map(|t| t.span)
            .ok_or_else(|| base.invalid("no operator between the operands"))
    }

    fn arrow(&self, base: &PatcherBase, last_param: Option<&Node>) -> PatchResult<Span> {
        let from = last_param.map_or(base.content.start, |p| p.outer.end);
        self.ctx
            .find_token(from, base.content.end, |k| {
                matches!(k, TokenKind::Arrow | TokenKind::FatArrow)
            })
            .map(|t| t.span)
            .ok_or_else(|| base.invalid("function without an arrow"))
    }
}
