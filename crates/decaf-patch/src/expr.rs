// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Patchers for the expressions loops embed and delegate to.

use decaf_ast::{BinaryOp, Span, TokenKind};

use crate::context::PatchContext;
use crate::error::{PatchError, PatchResult};
use crate::patcher::{base_accessors, NodePatcher, Patcher, PatcherBase};

// ── Leaves ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct IdentifierPatcher {
    base: PatcherBase,
}

impl IdentifierPatcher {
    pub fn new(base: PatcherBase) -> Self {
        Self { base }
    }
}

impl NodePatcher for IdentifierPatcher {
    base_accessors!();

    fn patch_as_expression(&mut self, _cx: &mut PatchContext<'_>) -> PatchResult<()> {
        Ok(())
    }

    fn is_repeatable(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    String,
    Bool(bool),
    Null,
}

#[derive(Debug)]
pub struct LiteralPatcher {
    base: PatcherBase,
    value: LiteralValue,
}

impl LiteralPatcher {
    pub fn new(base: PatcherBase, value: LiteralValue) -> Self {
        Self { base, value }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        match self.value {
            LiteralValue::Int(v) => Some(v as f64),
            LiteralValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl NodePatcher for LiteralPatcher {
    base_accessors!();

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        // `yes`/`on`/`no`/`off`
        if let LiteralValue::Bool(value) = self.value {
            let spelled = if value { "true" } else { "false" };
            let content = self.base.content;
            if cx.original(content)? != spelled {
                cx.overwrite(content.start, content.end, spelled)?;
            }
        }
        Ok(())
    }

    fn is_repeatable(&self) -> bool {
        true
    }
}

/// `this`, `@`, or the `@` of `@member`.
#[derive(Debug)]
pub struct ThisPatcher {
    base: PatcherBase,
    shorthand: bool,
}

impl ThisPatcher {
    pub fn new(base: PatcherBase, shorthand: bool) -> Self {
        Self { base, shorthand }
    }
}

impl NodePatcher for ThisPatcher {
    base_accessors!();

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        if !self.shorthand {
            return Ok(());
        }
        let content = self.base.content;
        let source = cx.parse_context().source();
        let member_follows = source[content.end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
        cx.overwrite(content.start, content.end, if member_follows { "this." } else { "this" })
    }

    fn is_repeatable(&self) -> bool {
        true
    }
}

// ── Accessors and operators ─────────────────────────────────────────────

#[derive(Debug)]
pub struct MemberAccessPatcher {
    base: PatcherBase,
    object: Box<Patcher>,
}

impl MemberAccessPatcher {
    pub fn new(base: PatcherBase, object: Box<Patcher>) -> Self {
        Self { base, object }
    }
}

impl NodePatcher for MemberAccessPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        self.object.set_requires_expression();
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.object.patch(cx)
    }

    fn is_repeatable(&self) -> bool {
        self.object.is_repeatable()
    }
}

/// `a[b]`
#[derive(Debug)]
pub struct IndexPatcher {
    base: PatcherBase,
    object: Box<Patcher>,
    index: Box<Patcher>,
}

impl IndexPatcher {
    pub fn new(base: PatcherBase, object: Box<Patcher>, index: Box<Patcher>) -> Self {
        Self { base, object, index }
    }
}

impl NodePatcher for IndexPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        self.object.set_requires_expression();
        self.index.set_requires_expression();
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.object.patch(cx)?;
        self.index.patch(cx)
    }

    fn is_repeatable(&self) -> bool {
        self.object.is_repeatable() && self.index.is_repeatable()
    }
}

#[derive(Debug)]
pub struct CallPatcher {
    base: PatcherBase,
    function: Box<Patcher>,
    arguments: Vec<Patcher>,
    /// `f a, b` rather than `f(a, b)`.
    implicit: bool,
}

impl CallPatcher {
    pub fn new(
        base: PatcherBase,
        function: Box<Patcher>,
        arguments: Vec<Patcher>,
        implicit: bool,
    ) -> PatchResult<Self> {
        if implicit && arguments.is_empty() {
            return Err(base.invalid("implicit call without arguments"));
        }
        Ok(Self { base, function, arguments, implicit })
    }
}

impl NodePatcher for CallPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        self.function.set_requires_expression();
        for argument in &mut self.arguments {
            argument.set_requires_expression();
        }
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.function.patch(cx)?;
        let function_end = self.function.outer().end;
        let first = self.arguments.first().map(|a| a.outer());
        let last = self.arguments.last().map(|a| a.outer());
        if let (true, Some(first)) = (self.implicit, first) {
            cx.overwrite(function_end, first.start, "(")?;
        }
        for argument in &mut self.arguments {
            argument.patch(cx)?;
        }
        if let (true, Some(last)) = (self.implicit, last) {
            cx.insert(last.end, ")")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct NegatePatcher {
    base: PatcherBase,
    operand: Box<Patcher>,
}

impl NegatePatcher {
    pub fn new(base: PatcherBase, operand: Box<Patcher>) -> Self {
        Self { base, operand }
    }

    pub fn operand(&self) -> &Patcher {
        &self.operand
    }
}

impl NodePatcher for NegatePatcher {
    base_accessors!();

    fn initialize(&mut self) {
        self.operand.set_requires_expression();
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.operand.patch(cx)
    }

    fn is_repeatable(&self) -> bool {
        self.operand.is_repeatable()
    }
}

#[derive(Debug)]
pub struct BinaryPatcher {
    base: PatcherBase,
    op: BinaryOp,
    /// The operator token as written.
    operator: Span,
    left: Box<Patcher>,
    right: Box<Patcher>,
}

impl BinaryPatcher {
    pub fn new(
        base: PatcherBase,
        op: BinaryOp,
        operator: Span,
        left: Box<Patcher>,
        right: Box<Patcher>,
    ) -> Self {
        Self { base, op, operator, left, right }
    }
}

impl NodePatcher for BinaryPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        self.left.set_requires_expression();
        self.right.set_requires_expression();
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.left.patch(cx)?;
        let spelled = self.op.output_operator();
        if cx.original(self.operator)? != spelled {
            cx.overwrite(self.operator.start, self.operator.end, spelled)?;
        }
        self.right.patch(cx)
    }
}

#[derive(Debug)]
pub struct AssignPatcher {
    base: PatcherBase,
    assignee: Box<Patcher>,
    expression: Box<Patcher>,
}

impl AssignPatcher {
    pub fn new(base: PatcherBase, assignee: Box<Patcher>, expression: Box<Patcher>) -> Self {
        Self { base, assignee, expression }
    }
}

impl NodePatcher for AssignPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        self.assignee.set_requires_expression();
        self.expression.set_requires_expression();
    }

    fn can_patch_as_expression(&self) -> bool {
        self.expression.can_patch_as_expression()
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.assignee.patch(cx)?;
        self.expression.patch(cx)
    }
}

// ── Literals with children ──────────────────────────────────────────────

#[derive(Debug)]
pub struct ArrayPatcher {
    base: PatcherBase,
    elements: Vec<Patcher>,
}

impl ArrayPatcher {
    pub fn new(base: PatcherBase, elements: Vec<Patcher>) -> Self {
        Self { base, elements }
    }
}

impl NodePatcher for ArrayPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        for element in &mut self.elements {
            element.set_requires_expression();
        }
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        for element in &mut self.elements {
            element.patch(cx)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ObjectPatcher {
    base: PatcherBase,
    members: Vec<(Patcher, Patcher)>,
    /// Written with `{ }`.
    braced: bool,
}

impl ObjectPatcher {
    pub fn new(base: PatcherBase, members: Vec<(Patcher, Patcher)>, braced: bool) -> Self {
        Self { base, members, braced }
    }
}

impl NodePatcher for ObjectPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        for (key, value) in &mut self.members {
            key.set_requires_expression();
            value.set_requires_expression();
        }
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let content = self.base.content;
        if !self.braced {
            cx.insert(content.start, "{")?;
        }
        let ctx = cx.parse_context();
        let count = self.members.len();
        for idx in 0..count {
            let (key, value) = &mut self.members[idx];
            key.patch(cx)?;
            value.patch(cx)?;
            let value_end = value.outer().end;
            // Members on separate lines need their commas.
            if let Some((next, _)) = self.members.get(idx + 1) {
                let next_start = next.outer().start;
                if ctx.find_token(value_end, next_start, |k| *k == TokenKind::Comma).is_none() {
                    cx.insert(value_end, ",")?;
                }
            }
        }
        if !self.braced {
            cx.insert(content.end, "}")?;
        }
        Ok(())
    }

    fn statement_needs_parens(&self) -> bool {
        true
    }
}

// ── Statements ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ReturnPatcher {
    base: PatcherBase,
    expression: Option<Box<Patcher>>,
}

impl ReturnPatcher {
    pub fn new(base: PatcherBase, expression: Option<Box<Patcher>>) -> Self {
        Self { base, expression }
    }
}

impl NodePatcher for ReturnPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        if let Some(expression) = &mut self.expression {
            expression.set_requires_expression();
        }
    }

    fn can_patch_as_expression(&self) -> bool {
        false
    }

    fn patch_as_expression(&mut self, _cx: &mut PatchContext<'_>) -> PatchResult<()> {
        Err(PatchError::ExpressionNotSupported { node: self.base.node, span: self.base.content })
    }

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        match &mut self.expression {
            Some(expression) => expression.patch(cx),
            None => Ok(()),
        }
    }

    fn contains_return(&self) -> bool {
        true
    }
}
