// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Function literals: `(a) -> body` and the bound `(a) => body`.

use decaf_ast::Span;

use crate::block::{BlockPatcher, ImplicitReturn};
use crate::context::PatchContext;
use crate::error::PatchResult;
use crate::patcher::{base_accessors, NodePatcher, Patcher, PatcherBase};

#[derive(Debug)]
pub struct FunctionPatcher {
    base: PatcherBase,
    params: Vec<Patcher>,
    body: Option<BlockPatcher>,
    bound: bool,
    arrow: Span,
}

impl FunctionPatcher {
    pub fn new(
        base: PatcherBase,
        params: Vec<Patcher>,
        body: Option<BlockPatcher>,
        bound: bool,
        arrow: Span,
    ) -> Self {
        Self { base, params, body, bound, arrow }
    }

    /// Opening text replacing the arrow.
    fn opening(&self, has_param_list: bool) -> &'static str {
        match (self.bound, has_param_list) {
            (false, true) => "{",
            (false, false) => "function() {",
            (true, true) => "=> {",
            (true, false) => "() => {",
        }
    }
}

impl NodePatcher for FunctionPatcher {
    base_accessors!();

    fn initialize(&mut self) {
        for param in &mut self.params {
            param.set_requires_expression();
        }
        // The last statement's value becomes the result.
        if let Some(body) = &mut self.body {
            let returns = body.statements.last().is_some_and(|last| {
                !matches!(last, Patcher::Return(_)) && last.can_patch_as_expression()
            });
            if returns {
                body.set_implicit(ImplicitReturn::Return);
            }
        }
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let start = self.base.content.start;
        let has_param_list = start < self.arrow.start;
        if has_param_list && !self.bound {
            cx.insert(start, "function")?;
        }
        for param in &mut self.params {
            param.patch(cx)?;
        }

        let opening = self.opening(has_param_list);
        let arrow = self.arrow;
        match &mut self.body {
            None => cx.overwrite(arrow.start, arrow.end, &format!("{opening}}}")),
            Some(body) => {
                cx.overwrite(arrow.start, arrow.end, opening)?;
                body.patch(cx)?;
                let end = body.outer().end;
                if body.inline() {
                    cx.insert(end, " }")
                } else {
                    let indent = cx.render_indent(cx.line_indent(start));
                    cx.insert(end, &format!("\n{indent}}}"))
                }
            }
        }
    }

    /// A bare `function` keyword would start a declaration.
    fn statement_needs_parens(&self) -> bool {
        !self.bound
    }
}
