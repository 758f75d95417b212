// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `for value[, key] in target [by step] [when filter]`
//!
//! Emitted as `target.filter(...).map(...)` when the loop's value is needed
//! and the chain preserves its meaning, as an indexed `for (;;)` loop in
//! statement position, and through the wrapped form otherwise.

use tracing::debug;

use crate::block::BlockPatcher;
use crate::context::PatchContext;
use crate::error::PatchResult;
use crate::loops::{LoopCore, LoopPatcher};
use crate::memo::Memo;
use crate::patcher::{NodePatcher, Patcher, PatcherBase};

/// Normalized view of the optional step expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Numeric literal once negations are stripped.
    pub is_literal: bool,
    /// Odd number of leading negations.
    pub negated: bool,
    /// Expression a dynamic step binding is initialized from.
    pub init: String,
    /// Literal text, or the step binding.
    pub update: String,
    pub number: Option<f64>,
}

impl Step {
    /// The implicit step of a loop without `by`.
    pub fn unit() -> Self {
        Self {
            is_literal: true,
            negated: false,
            init: "1".to_string(),
            update: "1".to_string(),
            number: Some(1.0),
        }
    }

    pub fn init_code(&self, index: &str, reference: &str) -> String {
        let mut code = if self.negated {
            format!("{index} = {reference}.length - 1")
        } else {
            format!("{index} = 0")
        };
        if !self.is_literal {
            code.push_str(&format!(", {} = {}", self.update, self.init));
        }
        code
    }

    pub fn test_code(&self, index: &str, reference: &str) -> String {
        if self.negated {
            format!("{index} >= 0")
        } else {
            format!("{index} < {reference}.length")
        }
    }

    pub fn update_code(&self, index: &str) -> String {
        match (self.number, self.negated) {
            (Some(n), true) if n == 1.0 => format!("{index}--"),
            (Some(n), false) if n == 1.0 => format!("{index}++"),
            (_, true) => format!("{index} -= {}", self.update),
            (_, false) => format!("{index} += {}", self.update),
        }
    }
}

#[derive(Debug)]
pub struct ForInPatcher {
    core: LoopCore,
    val_assignee: Box<Patcher>,
    key_assignee: Option<Box<Patcher>>,
    step: Option<Box<Patcher>>,
    value_binding: Memo<String>,
    index_binding: Memo<String>,
    step_desc: Memo<Step>,
}

impl ForInPatcher {
    pub fn new(
        base: PatcherBase,
        val_assignee: Box<Patcher>,
        key_assignee: Option<Box<Patcher>>,
        target: Box<Patcher>,
        step: Option<Box<Patcher>>,
        filter: Option<Box<Patcher>>,
        body: BlockPatcher,
    ) -> Self {
        Self {
            core: LoopCore::new(base, target, filter, body),
            val_assignee,
            key_assignee,
            step,
            value_binding: Memo::new("value binding"),
            index_binding: Memo::new("index binding"),
            step_desc: Memo::new("step"),
        }
    }

    /// A `filter`/`map` chain keeps the loop's meaning: no step, a body
    /// that is an expression, and no index that filtering would shift.
    pub fn can_patch_as_map_expression(&self) -> bool {
        if self.step.is_some() {
            return false;
        }
        if !self.core.body.can_patch_as_expression() {
            return false;
        }
        !(self.core.filter.is_some() && self.key_assignee.is_some())
    }

    fn header_end(&self) -> usize {
        self.core.header_end(self.step.as_deref())
    }

    fn value_binding(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<String> {
        if let Some(binding) = self.value_binding.get() {
            return Ok(binding.clone());
        }
        self.val_assignee.patch(cx)?;
        let binding = cx.slice(self.val_assignee.content())?;
        Ok(self.value_binding.fill(binding)?.clone())
    }

    /// The key assignee when there is one, otherwise a fresh binding.
    fn index_binding(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<String> {
        if let Some(binding) = self.index_binding.get() {
            return Ok(binding.clone());
        }
        let binding = match &mut self.key_assignee {
            Some(key) => {
                key.patch(cx)?;
                cx.slice(key.content())?
            }
            None => {
                let config = cx.config();
                cx.claim_free_binding(self.core.base.scope, &config.index_binding)
            }
        };
        Ok(self.index_binding.fill(binding)?.clone())
    }

    fn step(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<Step> {
        if let Some(step) = self.step_desc.get() {
            return Ok(step.clone());
        }
        let step = match self.step.as_deref_mut() {
            None => Step::unit(),
            Some(step) => {
                let (negated, root) = {
                    let mut negated = false;
                    let mut root: &Patcher = step;
                    while let Patcher::Negate(negate) = root {
                        negated = !negated;
                        root = negate.operand();
                    }
                    (negated, root)
                };
                let number = root.numeric_value();
                let root_content = root.content();

                step.patch(cx)?;
                let full = cx.slice(step.content())?;
                let root_code = cx.slice(root_content)?;
                let update = if number.is_some() {
                    root_code.clone()
                } else {
                    let config = cx.config();
                    cx.claim_free_binding(self.core.base.scope, &config.step_binding)
                };
                Step {
                    is_literal: number.is_some(),
                    negated,
                    // Counting down starts from the end; the sign lives in the update.
                    init: if negated { root_code } else { full },
                    update,
                    number,
                }
            }
        };
        Ok(self.step_desc.fill(step)?.clone())
    }

    fn patch_as_map_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let header_end = self.header_end();
        self.core.remove_then_token(cx, header_end)?;

        self.val_assignee.patch(cx)?;
        if let Some(key) = &mut self.key_assignee {
            key.patch(cx)?;
        }
        self.core.target.patch(cx)?;
        if let Some(filter) = &mut self.core.filter {
            filter.patch(cx)?;
        }
        self.core.body.set_requires_expression();
        self.core.body.patch(cx)?;

        let mut assignees = cx.slice(self.val_assignee.content())?;
        if let Some(key) = &self.key_assignee {
            assignees.push_str(", ");
            assignees.push_str(&cx.slice(key.content())?);
        }

        // for a in b when c then d  ->  b.filter((a) => c).map((a) => d)
        let target = self.core.target.outer();
        cx.remove(self.core.base.content.start, target.start)?;
        match &self.core.filter {
            Some(filter) => {
                let filter = filter.outer();
                cx.overwrite(target.end, filter.start, &format!(".filter(({assignees}) => "))?;
                cx.insert(filter.end, &format!(").map(({assignees}) =>"))?;
            }
            None => cx.insert(target.end, &format!(".map(({assignees}) =>"))?,
        }
        if self.core.body.is_object_initialiser_block() {
            self.core.body.surround_in_parens(cx)?;
        }
        cx.insert(self.core.body.outer().end, ")")
    }

    fn patch_loop_header(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let index = self.index_binding(cx)?;
        let reference = self.core.target_reference(cx)?;
        let step = self.step(cx)?;
        self.core.hoist_target(cx)?;

        let header = format!(
            "({}; {}; {}) {{",
            step.init_code(&index, &reference),
            step.test_code(&index, &reference),
            step.update_code(&index),
        );
        cx.overwrite_through(self.val_assignee.outer().start, self.header_end(), &header)
    }

    fn patch_loop_body(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let header_end = self.header_end();
        self.core.remove_then_token(cx, header_end)?;
        self.core.carry_formatting_after_header(cx, header_end);

        let value = self.value_binding(cx)?;
        let index = self.index_binding(cx)?;
        let reference = self.core.target_reference(cx)?;
        let mut assignment = format!("{value} = {reference}[{index}]");
        if self.val_assignee.statement_needs_parens() {
            assignment = format!("({assignment})");
        }
        let indent = self.core.outer_body_indent(cx);
        self.core.body.insert_line_before(cx, &format!("{assignment};"), indent)?;
        self.core.patch_body_and_filter(cx)
    }
}

impl LoopPatcher for ForInPatcher {
    fn core(&self) -> &LoopCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LoopCore {
        &mut self.core
    }

    fn patch_loop_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        if !self.core.body.inline() {
            let indent = self.core.body_indent(cx);
            self.core.body.set_indent(cx, indent);
        }

        // Value, key, target, step, filter: later snippets embed earlier ones.
        self.value_binding(cx)?;
        self.index_binding(cx)?;
        self.core.target_code(cx)?;
        self.step(cx)?;
        self.core.filter_code(cx)?;

        self.patch_loop_header(cx)?;
        self.patch_loop_body(cx)
    }
}

impl NodePatcher for ForInPatcher {
    fn base(&self) -> &PatcherBase {
        &self.core.base
    }

    fn base_mut(&mut self) -> &mut PatcherBase {
        &mut self.core.base
    }

    fn initialize(&mut self) {
        self.core.initialize();
        self.val_assignee.set_requires_expression();
        if let Some(key) = &mut self.key_assignee {
            key.set_requires_expression();
        }
        if let Some(step) = &mut self.step {
            step.set_requires_expression();
        }
    }

    fn can_patch_as_expression(&self) -> bool {
        !self.core.body.contains_return()
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        if !self.can_patch_as_map_expression() {
            return self.patch_as_wrapped_expression(cx);
        }
        debug!(node = "ForIn", span = %self.core.base.content, strategy = "map", "patching loop");
        self.patch_as_map_expression(cx)
    }

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        debug!(node = "ForIn", span = %self.core.base.content, strategy = "indexed", "patching loop");
        self.patch_loop_statement(cx)
    }

    fn statement_needs_semicolon(&self) -> bool {
        false
    }

    fn contains_return(&self) -> bool {
        self.core.body.contains_return()
    }
}
