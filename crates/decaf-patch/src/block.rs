// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement sequences: loop and function bodies, and the program root.

use crate::context::PatchContext;
use crate::error::{PatchError, PatchResult};
use crate::patcher::{base_accessors, NodePatcher, Patcher, PatcherBase};

/// What happens to the value of a block's last statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplicitReturn {
    /// `return <last>;`
    Return,
    /// `<result>.push(<last>);`
    Push(String),
}

#[derive(Debug)]
pub struct BlockPatcher {
    base: PatcherBase,
    pub statements: Vec<Patcher>,
    /// Shares its first line with the header it belongs to.
    inline: bool,
    implicit: Option<ImplicitReturn>,
}

impl BlockPatcher {
    pub fn new(base: PatcherBase, statements: Vec<Patcher>, inline: bool) -> Self {
        Self { base, statements, inline, implicit: None }
    }

    pub fn inline(&self) -> bool {
        self.inline
    }

    pub fn set_implicit(&mut self, implicit: ImplicitReturn) {
        self.implicit = Some(implicit);
    }

    /// A single object literal, which would read as a block after `=>`.
    pub fn is_object_initialiser_block(&self) -> bool {
        matches!(self.statements.as_slice(), [only] if only.is_object_initialiser())
    }

    /// Move the block's lines so the first one sits at `width`.
    pub fn set_indent(&self, cx: &mut PatchContext<'_>, width: usize) {
        if self.inline {
            return;
        }
        let content = self.base.content;
        let delta = width as isize - cx.line_indent(content.start) as isize;
        cx.shift_lines(content.start, content.end, delta);
    }

    /// Add a line above the first statement, or in front of it when inline.
    pub fn insert_line_before(
        &self,
        cx: &mut PatchContext<'_>,
        line: &str,
        indent: usize,
    ) -> PatchResult<()> {
        let start = self.base.content.start;
        if self.inline {
            cx.insert(start, &format!("{line} "))
        } else {
            let line_start = cx.parse_context().line_start(start);
            let text = format!("{}{line}\n", cx.render_indent(indent));
            cx.insert(line_start, &text)
        }
    }

    /// Add a line after the last statement, or behind it when inline.
    pub fn append_line_after(
        &self,
        cx: &mut PatchContext<'_>,
        line: &str,
        indent: usize,
    ) -> PatchResult<()> {
        let end = self.base.content.end;
        if self.inline {
            cx.insert(end, &format!(" {line}"))
        } else {
            let text = format!("\n{}{line}", cx.render_indent(indent));
            cx.insert(end, &text)
        }
    }

    pub fn surround_in_parens(&self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let content = self.base.content;
        cx.prepend(content.start, "(")?;
        cx.insert(content.end, ")")
    }
}

impl NodePatcher for BlockPatcher {
    base_accessors!();

    fn can_patch_as_expression(&self) -> bool {
        self.statements.iter().all(|s| s.can_patch_as_expression())
    }

    /// `a` alone, or `(a, b)` for several statements.
    fn patch_as_expression(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        match self.statements.as_mut_slice() {
            [] => Ok(()),
            [only] => {
                only.set_requires_expression();
                only.patch(cx)
            }
            many => {
                let start = many[0].outer().start;
                let end = many[many.len() - 1].outer().end;
                cx.prepend(start, "(")?;
                for idx in 0..many.len() {
                    many[idx].set_requires_expression();
                    many[idx].patch(cx)?;
                    if let Some(next) = many.get(idx + 1) {
                        cx.overwrite(many[idx].outer().end, next.outer().start, ", ")?;
                    }
                }
                cx.insert(end, ")")
            }
        }
    }

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        let count = self.statements.len();
        for (idx, statement) in self.statements.iter_mut().enumerate() {
            let outer = statement.outer();
            let implicit = match &self.implicit {
                Some(implicit)
                    if idx + 1 == count
                        && !matches!(statement, Patcher::Return(_))
                        && statement.can_patch_as_expression() =>
                {
                    Some(implicit)
                }
                _ => None,
            };
            match implicit {
                Some(ImplicitReturn::Return) => {
                    cx.insert(outer.start, "return ")?;
                    statement.set_requires_expression();
                    statement.patch(cx)?;
                    cx.insert(outer.end, ";")?;
                }
                Some(ImplicitReturn::Push(result)) => {
                    cx.insert(outer.start, &format!("{result}.push("))?;
                    statement.set_requires_expression();
                    statement.patch(cx)?;
                    cx.insert(outer.end, ");")?;
                }
                None => {
                    statement.patch(cx)?;
                    if statement.statement_needs_semicolon() {
                        cx.insert(outer.end, ";")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn statement_needs_semicolon(&self) -> bool {
        false
    }

    fn contains_return(&self) -> bool {
        self.statements.iter().any(|s| s.contains_return())
    }
}

/// Root of a file.
#[derive(Debug)]
pub struct ProgramPatcher {
    base: PatcherBase,
    body: Option<BlockPatcher>,
}

impl ProgramPatcher {
    pub fn new(base: PatcherBase, body: Option<BlockPatcher>) -> Self {
        Self { base, body }
    }
}

impl NodePatcher for ProgramPatcher {
    base_accessors!();

    fn can_patch_as_expression(&self) -> bool {
        false
    }

    fn patch_as_expression(&mut self, _cx: &mut PatchContext<'_>) -> PatchResult<()> {
        Err(PatchError::ExpressionNotSupported { node: self.base.node, span: self.base.content })
    }

    fn patch_as_statement(&mut self, cx: &mut PatchContext<'_>) -> PatchResult<()> {
        match &mut self.body {
            Some(body) => body.patch(cx),
            None => Ok(()),
        }
    }

    fn statement_needs_semicolon(&self) -> bool {
        false
    }
}
