// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Patch pass errors.
//!
//! Every variant is a contract violation: either the caller asked a node for
//! something it declared it cannot do, or the tree handed over does not have
//! the shape the pass relies on. None of them are recoverable at this layer.

use decaf_ast::Span;
use thiserror::Error;

/// A text overlay edit that conflicts with an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("range {span} was already consumed by the edit over {consumed}")]
    RangeConsumed { span: Span, consumed: Span },

    #[error("edit over {span} partially overlaps the edit over {existing}")]
    OverlappingEdit { span: Span, existing: Span },

    #[error("range {span} is outside the source (length {len})")]
    OutOfBounds { span: Span, len: usize },

    #[error("cannot overwrite the empty range at {pos}")]
    EmptyOverwrite { pos: usize },
}

/// A patcher contract violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    /// The parent required an expression the node cannot produce.
    #[error("`{node}` at {span} cannot be patched as an expression")]
    ExpressionNotSupported { node: &'static str, span: Span },

    #[error("`{node}` at {span} was already patched")]
    AlreadyPatched { node: &'static str, span: Span },

    /// The syntax tree does not have the shape the patcher expects.
    #[error("invalid `{node}` at {span}: {reason}")]
    InvalidTree { node: &'static str, span: Span, reason: String },

    /// A computed-once value was computed twice.
    #[error("`{name}` was already computed")]
    AlreadyComputed { name: &'static str },

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl PatchError {
    pub fn invalid_tree(node: &'static str, span: Span, reason: impl Into<String>) -> Self {
        PatchError::InvalidTree { node, span, reason: reason.into() }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            PatchError::ExpressionNotSupported { span, .. }
            | PatchError::AlreadyPatched { span, .. }
            | PatchError::InvalidTree { span, .. } => Some(*span),
            PatchError::AlreadyComputed { .. } => None,
            PatchError::Edit(EditError::RangeConsumed { span, .. })
            | PatchError::Edit(EditError::OverlappingEdit { span, .. })
            | PatchError::Edit(EditError::OutOfBounds { span, .. }) => Some(*span),
            PatchError::Edit(EditError::EmptyOverwrite { pos }) => Some(Span::new(*pos, *pos)),
        }
    }
}

pub type PatchResult<T> = Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_node_and_range() {
        let err = PatchError::ExpressionNotSupported { node: "ForIn", span: Span::new(4, 20) };
        assert_eq!(err.to_string(), "`ForIn` at 4..20 cannot be patched as an expression");

        let err = PatchError::invalid_tree("ForIn", Span::new(0, 3), "missing value assignee");
        assert_eq!(err.to_string(), "invalid `ForIn` at 0..3: missing value assignee");
    }

    #[test]
    fn edit_errors_convert_and_keep_their_span() {
        let err: PatchError =
            EditError::OverlappingEdit { span: Span::new(2, 6), existing: Span::new(4, 8) }.into();
        assert_eq!(err.span(), Some(Span::new(2, 6)));
        assert_eq!(err.to_string(), "edit over 2..6 partially overlaps the edit over 4..8");
        assert_eq!(PatchError::AlreadyComputed { name: "step" }.span(), None);
    }
}
