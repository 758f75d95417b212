// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! In-place patch pass from the sugared dialect to curly-brace output.
//!
//! Every syntax node gets a patcher that rewrites its own source range
//! through a shared text overlay. Text nobody touches passes through
//! unchanged, so comments and layout survive the rewrite.

mod block;
mod build;
mod config;
mod context;
mod error;
mod expr;
mod for_in;
mod for_of;
mod formatting;
mod function;
mod loops;
mod memo;
mod patcher;

pub mod bindings;
pub mod editor;
pub mod indent;

use decaf_ast::{Node, ParseContext};
use tracing::debug;

pub use build::PatcherBuilder;
pub use config::PatchConfig;
pub use context::{PatchContext, PatchOutput};
pub use error::{EditError, PatchError, PatchResult};
pub use for_in::Step;
pub use formatting::{CarriedFormatting, FormattingKind};
pub use patcher::{NodePatcher, Patcher, PatcherBase};

/// Patch a whole program with the default configuration.
pub fn patch(ctx: &ParseContext, program: &Node) -> PatchResult<PatchOutput> {
    patch_program(ctx, program, &PatchConfig::default())
}

/// Patch a whole program.
///
/// Fails on the first contract violation; no partial output is returned.
pub fn patch_program(
    ctx: &ParseContext,
    program: &Node,
    config: &PatchConfig,
) -> PatchResult<PatchOutput> {
    let mut builder = PatcherBuilder::new(ctx);
    let mut root = builder.build_program(program)?;
    let mut cx = PatchContext::new(ctx, config, builder.into_bindings());
    root.patch(&mut cx)?;
    let output = cx.finish()?;
    debug!(len = output.code.len(), carried = output.carried.len(), "patched program");
    Ok(output)
}
