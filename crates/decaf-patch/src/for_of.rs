// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `for [own] key[, value] of target [when filter]`, emitted as `for (k in o)`.

use decaf_ast::TokenKind;
use tracing::debug;

use crate::block::BlockPatcher;
use crate::context::PatchContext;
use crate::error::PatchResult;
use crate::loops::{LoopCore, LoopPatcher};
use crate::patcher::{NodePatcher, Patcher, PatcherBase};

#[derive(Debug)]
pub struct ForOfPatcher {
    core: LoopCore,
    key_assignee: Box<Patcher>,
    val_assignee: Option<Box<Patcher>>,
    /// Skip inherited properties.
    own: bool,
}

impl ForOfPatcher {
    pub fn new(
        base: PatcherBase,
        key_assignee: Box<Patcher>,
        val_assignee: Option<Box<Patcher>>,
        target: Box<Patcher>,
        filter: Option<Box<Patcher>>,
        body: BlockPatcher,
        own: bool,
    ) -> Self {
        Self { core: LoopCore::new(base, target, filter, body), key_assignee, val_assignee, own }
    }

    /// Where the header text starts: `own` when present, else the key.
    fn header_start(&self, cx: &PatchContext<'_>) -> PatchResult<usize> {
        let key_start = self.key_assignee.outer().start;
        if !self.own {
            return Ok(key_start);
        }
        let content = self.core.base.content;
        cx.parse_context()
            .find_token(content.start, key_start, |k| *k == TokenKind::Own)
            .map(|t| t.span.start)
            .ok_or_else(|| self.core.base.invalid("`own` flag without an `own` token"))
    }
}

impl LoopPatcher for ForOfPatcher {
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

        // A key that is not a plain name is assigned from a fresh binding.
        self.key_assignee.patch(cx)?;
        let key_code = cx.slice(self.key_assignee.content())?;
        let key_binding = if self.key_assignee.is_identifier() {
            None
        } else {
            let config = cx.config();
            Some(cx.claim_free_binding(self.core.base.scope, &config.key_binding))
        };
        let key = key_binding.clone().unwrap_or_else(|| key_code.clone());

        let value_code = match &mut self.val_assignee {
            Some(value) => {
                value.patch(cx)?;
                Some((cx.slice(value.content())?, value.statement_needs_parens()))
            }
            None => None,
        };

        let reference = self.core.target_reference(cx)?;
        self.core.filter_code(cx)?;
        self.core.hoist_target(cx)?;

        let header_end = self.core.header_end(None);
        let header_start = self.header_start(cx)?;
        cx.overwrite_through(header_start, header_end, &format!("({key} in {reference}) {{"))?;
        self.core.remove_then_token(cx, header_end)?;
        self.core.carry_formatting_after_header(cx, header_end);

        let indent = self.core.outer_body_indent(cx);
        if self.own {
            let check = format!(
                "if (!Object.prototype.hasOwnProperty.call({reference}, {key})) {{ continue; }}"
            );
            self.core.body.insert_line_before(cx, &check, indent)?;
        }
        if key_binding.is_some() {
            self.core.body.insert_line_before(cx, &format!("{key_code} = {key};"), indent)?;
        }
        if let Some((value, needs_parens)) = value_code {
            let mut assignment = format!("{value} = {reference}[{key}]");
            if needs_parens {
                assignment = format!("({assignment})");
            }
            self.core.body.insert_line_before(cx, &format!("{assignment};"), indent)?;
        }
        self.core.patch_body_and_filter(cx)
    }
}

impl NodePatcher for ForOfPatcher {
    fn base(&self) -> &PatcherBase {
        &self.core.base
    }

    fn base_mut(&mut self) -> &mut PatcherBase {
        &mut self.core.base
    }

    fn initialize(&mut self) {
        self.core.initialize();
        self.key_assignee.set_requires_expression();
        if let Some(value) = &mut self.val_assignee {
            value.set_requires_expression();
        }
    }

    fn can_patch_as_expression(&self) -> bool {
        !self.core.body.contains_return()
    }

    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        self.patch_as_wrapped_expression(cx)
    }

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        debug!(node = "ForOf", span = %self.core.base.content, own = self.own, "patching loop");
        self.patch_loop_statement(cx)
    }

    fn statement_needs_semicolon(&self) -> bool {
        false
    }

    fn contains_return(&self) -> bool {
        self.core.body.contains_return()
    }
}
