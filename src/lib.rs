//! shaker: the tree-shaking core of an ES module bundler.
//!
//! A build takes modules as source text plus acorn ESTree JSON and runs
//! them through the pipeline stages, one crate each:
//!
//! 1. `shaker-ast` builds the node arena from the trees.
//! 2. `shaker-binder` declares scopes and variables and links imports and
//!    exports across the module graph.
//! 3. `shaker-analysis` answers the effect and value queries and runs
//!    inclusion to a fixpoint.
//! 4. This crate orders the modules, colours them by the entry points that
//!    load them and groups them into chunks.
//! 5. `shaker-emitter` wires the chunks together, picks final names and
//!    renders each chunk in the requested module format.
//!
//! [`build`] runs the whole pipeline; [`Bundle`] splits linking from
//! generation for callers that want to inspect the graph first.

pub mod bundle;
pub mod chunking;
pub mod config;
pub mod execution;
pub mod reporter;
pub mod tracing_config;

#[cfg(feature = "cli")]
pub mod cli;

pub use bundle::{BuildOptions, BuildOutput, Bundle, build};
pub use config::{ShakerConfig, TreeshakeConfig, load_config, parse_config};
pub use execution::{ExecutionOrder, analyse_execution};
pub use shaker_binder::ModuleInput;
pub use shaker_common::{BuildError, Diagnostic, DiagnosticCategory, DiagnosticCode, OutputFormat, TreeshakeOptions};
pub use shaker_emitter::RenderedChunk;

#[cfg(test)]
#[path = "../crates/shaker-analysis/tests/support/mod.rs"]
pub(crate) mod test_support;
