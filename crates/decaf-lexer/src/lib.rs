// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the sugared scripting dialect.
//!
//! Produces the token stream (connector keywords, comments, newlines) that
//! the patch pass consults through `ParseContext`. It does not build trees.

mod lexer;

pub use lexer::{LexError, LexResult, Lexer};
