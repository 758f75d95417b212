// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared state threaded through one patch pass.

use decaf_ast::{ParseContext, Span};

use crate::bindings::{Bindings, ScopeId};
use crate::config::PatchConfig;
use crate::editor::Editor;
use crate::error::PatchResult;
use crate::formatting::CarriedFormatting;
use crate::indent::Indentation;

/// Result of patching a whole program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutput {
    pub code: String,
    /// Comments and blank lines kept in place that finalization may want
    /// to normalize.
    pub carried: Vec<CarriedFormatting>,
}

/// The text overlay plus everything a patcher may consult or claim.
///
/// Patchers only ever write through this context, and only inside their
/// own outer range.
pub struct PatchContext<'a> {
    ctx: &'a ParseContext,
    config: &'a PatchConfig,
    editor: Editor<'a>,
    bindings: Bindings,
    indentation: Indentation,
    carried: Vec<CarriedFormatting>,
}

impl<'a> PatchContext<'a> {
    pub fn new(ctx: &'a ParseContext, config: &'a PatchConfig, bindings: Bindings) -> Self {
        Self {
            ctx,
            config,
            editor: Editor::new(ctx.source()),
            bindings,
            indentation: Indentation::detect(ctx, config),
            carried: Vec::new(),
        }
    }

    pub fn parse_context(&self) -> &'a ParseContext {
        self.ctx
    }

    pub fn config(&self) -> &'a PatchConfig {
        self.config
    }

    // --- Text overlay ---

    pub fn original(&self, span: Span) -> PatchResult<&'a str> {
        Ok(self.editor.original(span.start, span.end)?)
    }

    pub fn slice(&self, span: Span) -> PatchResult<String> {
        Ok(self.editor.slice(span.start, span.end)?)
    }

    pub fn insert(&mut self, pos: usize, text: &str) -> PatchResult<()> {
        Ok(self.editor.insert(pos, text)?)
    }

    pub fn prepend(&mut self, pos: usize, text: &str) -> PatchResult<()> {
        Ok(self.editor.prepend(pos, text)?)
    }

    pub fn overwrite(&mut self, start: usize, end: usize, text: &str) -> PatchResult<()> {
        Ok(self.editor.overwrite(start, end, text)?)
    }

    /// Replace a range whose edited text was already captured, including
    /// what its last child appended.
    pub fn overwrite_through(&mut self, start: usize, end: usize, text: &str) -> PatchResult<()> {
        Ok(self.editor.overwrite_through(start, end, text)?)
    }

    pub fn remove(&mut self, start: usize, end: usize) -> PatchResult<()> {
        Ok(self.editor.remove(start, end)?)
    }

    // --- Bindings ---

    pub fn claim_free_binding(&mut self, scope: ScopeId, base: &str) -> String {
        self.bindings.claim_free_binding(scope, base)
    }

    // --- Indentation ---

    pub fn line_indent(&self, pos: usize) -> usize {
        self.indentation.indent_at(self.ctx, pos)
    }

    pub fn indent_unit(&self) -> usize {
        self.indentation.unit_width()
    }

    pub fn render_indent(&self, width: usize) -> String {
        self.indentation.render(width)
    }

    pub fn shift_lines(&mut self, start: usize, end: usize, delta: isize) {
        self.indentation.shift_lines(self.ctx, start, end, delta);
    }

    pub fn carry(&mut self, items: impl IntoIterator<Item = CarriedFormatting>) {
        self.carried.extend(items);
    }

    /// Emit pending indentation and resolve the overlay.
    pub fn finish(mut self) -> PatchResult<PatchOutput> {
        self.indentation.apply(self.ctx, &mut self.editor)?;
        self.carried.sort_by_key(|item| item.span.start);
        Ok(PatchOutput { code: self.editor.finish(), carried: self.carried })
    }
}
