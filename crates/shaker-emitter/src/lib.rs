//! Output side of the shaker bundler core.
//!
//! Given a module graph whose inclusion pass has run, this crate:
//! - groups modules into chunks and wires the bindings chunks exchange
//!   ([`ChunkSet`])
//! - assigns collision-free final names per chunk ([`ChunkNames`])
//! - renders the included nodes of each module by editing its original
//!   text ([`render_module`])
//! - wraps the result in the syntax of the output format and adds
//!   banner, footer, intro and outro ([`render_chunk`])

pub mod chunk;
pub mod edit_buffer;
pub mod finalisers;
pub mod names;
pub mod output;
pub mod render;

pub use chunk::{Chunk, ChunkDependency, ChunkId, ChunkSet, ExportMode, ModuleDeclarations};
pub use edit_buffer::{BundleBuffer, EditBuffer, SourceEditor};
pub use names::{ChunkNames, NamingOptions};
pub use output::{RenderOptions, RenderedChunk, render_chunk};
pub use render::{DynamicImportTarget, RenderContext, namespace_block, render_module};

#[cfg(test)]
#[path = "../../shaker-analysis/tests/support/mod.rs"]
pub(crate) mod test_support;
