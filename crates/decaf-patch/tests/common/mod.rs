// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Fixtures shared by the patch pass tests.

#![allow(dead_code)]

use decaf_ast::build::TreeBuilder;
use decaf_ast::{Node, ParseContext};
use decaf_lexer::Lexer;
use decaf_patch::{patch_program, PatchConfig, PatchOutput, PatchResult};

pub fn context(source: &str) -> ParseContext {
    let result = Lexer::new(source).tokenize();
    assert!(result.is_ok(), "lex errors in fixture: {:?}", result.errors);
    ParseContext::new(source, result.tokens)
}

/// Build the program tree with `build`, wrapping its statements in a block.
pub fn program(ctx: &ParseContext, build: impl FnOnce(&TreeBuilder<'_>) -> Vec<Node>) -> Node {
    let b = TreeBuilder::new(ctx);
    let statements = build(&b);
    let body = b.block(statements);
    b.program(Some(body))
}

pub fn try_patch(
    source: &str,
    config: &PatchConfig,
    build: impl FnOnce(&TreeBuilder<'_>) -> Vec<Node>,
) -> PatchResult<PatchOutput> {
    let ctx = context(source);
    let root = program(&ctx, build);
    patch_program(&ctx, &root, config)
}

pub fn patch_with(
    source: &str,
    config: &PatchConfig,
    build: impl FnOnce(&TreeBuilder<'_>) -> Vec<Node>,
) -> String {
    match try_patch(source, config, build) {
        Ok(output) => output.code,
        Err(e) => panic!("patching {source:?} failed: {e}"),
    }
}

pub fn patch(source: &str, build: impl FnOnce(&TreeBuilder<'_>) -> Vec<Node>) -> String {
    patch_with(source, &PatchConfig::default(), build)
}
