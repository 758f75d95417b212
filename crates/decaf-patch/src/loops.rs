// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared machinery for iteration constructs.
//!
//! `LoopCore` owns the target, filter, and body every loop has, the derived
//! snippets computed from them, and the statement layout helpers. Concrete
//! loops add their assignees and header arithmetic on top.

use decaf_ast::TokenKind;
use tracing::debug;

use crate::block::{BlockPatcher, ImplicitReturn};
use crate::context::PatchContext;
use crate::error::PatchResult;
use crate::formatting::formatting_between;
use crate::memo::Memo;
use crate::patcher::{NodePatcher, Patcher, PatcherBase};

/// Wrapper the loop is emitted into when its value is needed.
#[derive(Debug, Clone)]
pub struct Wrapper {
    pub result: String,
    /// Indent of the statements inside the wrapper.
    pub indent: usize,
}

#[derive(Debug)]
pub struct LoopCore {
    pub base: PatcherBase,
    pub target: Box<Patcher>,
    pub filter: Option<Box<Patcher>>,
    pub body: BlockPatcher,
    target_code: Memo<String>,
    target_reference: Memo<String>,
    filter_code: Memo<Option<String>>,
    wrapper: Option<Wrapper>,
}

impl LoopCore {
    pub fn new(
        base: PatcherBase,
        target: Box<Patcher>,
        filter: Option<Box<Patcher>>,
        body: BlockPatcher,
    ) -> Self {
        Self {
            base,
            target,
            filter,
            body,
            target_code: Memo::new("target code"),
            target_reference: Memo::new("target reference"),
            filter_code: Memo::new("filter code"),
            wrapper: None,
        }
    }

    pub fn initialize(&mut self) {
        self.target.set_requires_expression();
        if let Some(filter) = &mut self.filter {
            filter.set_requires_expression();
        }
    }

    // ── Layout ──

    pub fn loop_indent(&self, cx: &PatchContext<'_>) -> usize {
        match &self.wrapper {
            Some(wrapper) if !self.body.inline() => wrapper.indent,
            _ => cx.line_indent(self.base.content.start),
        }
    }

    /// Indent of lines inserted at the top of the body.
    pub fn outer_body_indent(&self, cx: &PatchContext<'_>) -> usize {
        self.loop_indent(cx) + cx.indent_unit()
    }

    /// Indent of the original body statements; one deeper under a filter.
    pub fn body_indent(&self, cx: &PatchContext<'_>) -> usize {
        let filter = if self.filter.is_some() { cx.indent_unit() } else { 0 };
        self.outer_body_indent(cx) + filter
    }

    /// End of the header, given the header children besides target and filter.
    pub fn header_end(&self, extra: Option<&Patcher>) -> usize {
        [Some(&*self.target), self.filter.as_deref(), extra]
            .into_iter()
            .flatten()
            .map(|p| p.outer().end)
            .max()
            .unwrap_or(self.base.content.end)
    }

    // ── Derived snippets ──

    pub fn target_code(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<String> {
        if let Some(code) = self.target_code.get() {
            return Ok(code.clone());
        }
        self.target.patch(cx)?;
        let code = cx.slice(self.target.outer())?;
        Ok(self.target_code.fill(code)?.clone())
    }

    pub fn requires_extracting_target(&self) -> bool {
        !self.target.is_repeatable()
    }

    /// The expression the loop indexes: the target itself when repeatable,
    /// otherwise a binding it is hoisted into.
    pub fn target_reference(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<String> {
        if let Some(reference) = self.target_reference.get() {
            return Ok(reference.clone());
        }
        let code = self.target_code(cx)?;
        let reference = if self.requires_extracting_target() {
            let config = cx.config();
            cx.claim_free_binding(self.base.scope, &config.iterable_binding)
        } else {
            code
        };
        Ok(self.target_reference.fill(reference)?.clone())
    }

    pub fn filter_code(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<Option<String>> {
        if let Some(code) = self.filter_code.get() {
            return Ok(code.clone());
        }
        let code = match &mut self.filter {
            Some(filter) => {
                filter.patch(cx)?;
                Some(cx.slice(filter.content())?)
            }
            None => None,
        };
        Ok(self.filter_code.fill(code)?.clone())
    }

    // ── Statement emission ──

    /// Evaluate a non-repeatable target once, ahead of the loop.
    pub fn hoist_target(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        if !self.requires_extracting_target() {
            return Ok(());
        }
        let code = self.target_code(cx)?;
        let reference = self.target_reference(cx)?;
        let separator = match &self.wrapper {
            Some(_) if self.body.inline() => " ".to_string(),
            _ => format!("\n{}", cx.render_indent(self.loop_indent(cx))),
        };
        debug!(node = self.base.node, binding = %reference, "hoisting loop target");
        cx.insert(self.base.content.start, &format!("{reference} = {code};{separator}"))
    }

    /// Drop a `then` between the header and the body, with the space after it.
    pub fn remove_then_token(&self, cx: &mut PatchContext<'_>, header_end: usize) -> PatchResult<()> {
        let ctx = cx.parse_context();
        let body_start = self.body.content().start;
        let Some(then) = ctx.find_token(header_end, body_start, |k| *k == TokenKind::Then) else {
            return Ok(());
        };
        let spaces = ctx.source()[then.span.end..body_start]
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        cx.remove(then.span.start, then.span.end + spaces)
    }

    /// Comments and blank lines between the header and the body stay where
    /// they are, above the inserted body lines; report them.
    pub fn carry_formatting_after_header(&self, cx: &mut PatchContext<'_>, header_end: usize) {
        let items = formatting_between(cx.parse_context(), header_end, self.body.content().start);
        if !items.is_empty() {
            debug!(node = self.base.node, count = items.len(), "carrying formatting after loop header");
        }
        cx.carry(items);
    }

    /// Patch the body, wrapped in the filter condition if there is one, and
    /// close the loop.
    pub fn patch_body_and_filter(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let loop_indent = self.loop_indent(cx);
        let outer_indent = self.outer_body_indent(cx);
        match self.filter_code(cx)? {
            Some(code) => {
                self.body.insert_line_before(cx, &format!("if ({code}) {{"), outer_indent)?;
                self.body.patch(cx)?;
                self.body.append_line_after(cx, "}", outer_indent)?;
            }
            None => self.body.patch(cx)?,
        }
        self.body.append_line_after(cx, "}", loop_indent)
    }

    // ── Wrapped expression form ──

    fn begin_wrapper(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let config = cx.config();
        let result = cx.claim_free_binding(self.base.scope, &config.result_binding);
        let start = self.base.content.start;
        let indent = cx.line_indent(start) + cx.indent_unit();
        if self.body.inline() {
            cx.insert(start, &format!("(() => {{ {result} = []; "))?;
        } else {
            let inner = cx.render_indent(indent);
            cx.insert(start, &format!("(() => {{\n{inner}{result} = [];\n{inner}"))?;
        }
        self.body.set_implicit(ImplicitReturn::Push(result.clone()));
        self.wrapper = Some(Wrapper { result, indent });
        Ok(())
    }

    fn end_wrapper(&self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let Some(wrapper) = &self.wrapper else {
            return Ok(());
        };
        let end = self.base.content.end;
        let result = &wrapper.result;
        if self.body.inline() {
            cx.insert(end, &format!(" return {result}; }})()"))
        } else {
            let inner = cx.render_indent(wrapper.indent);
            let outer = cx.render_indent(cx.line_indent(self.base.content.start));
            cx.insert(end, &format!("\n{inner}return {result};\n{outer}}})()"))
        }
    }
}

/// A loop construct built on `LoopCore`.
pub trait LoopPatcher: NodePatcher {
    fn core(&self) -> &LoopCore;
    fn core_mut(&mut self) -> &mut LoopCore;

    /// Emit the loop as a statement.
    fn patch_loop_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()>;

    /// The fallback expression form that works for every loop: run the
    /// statement form inside an immediately invoked arrow that collects the
    /// body values.
    fn patch_as_wrapped_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        debug!(node = self.base().node, span = %self.base().content, strategy = "wrapped", "patching loop");
        self.core_mut().begin_wrapper(cx)?;
        self.patch_loop_statement(cx)?;
        self.core().end_wrapper(cx)
    }
}
