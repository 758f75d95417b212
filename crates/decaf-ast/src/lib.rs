// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree types for the sugared scripting dialect.
//!
//! The parser that produces these trees is not part of this workspace. This
//! crate only defines the node shapes, their byte spans in the original
//! source, the token stream, and the lookups the patch pass performs on it.

pub mod span;
pub mod token;
pub mod node;
pub mod context;

#[cfg(any(test, feature = "test-support"))]
pub mod build;

pub use context::ParseContext;
pub use node::{BinaryOp, Node, NodeKind, ObjectMember};
pub use span::{LineMap, Span};
pub use token::{Token, TokenKind};

/// Unique identifier for syntax nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}
