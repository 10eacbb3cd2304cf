//! Module-format wrappers around a chunk's rendered body.
//!
//! Each finaliser adds the import and export syntax of one output format to
//! the joined module bodies: ES `import`/`export` statements, CommonJS
//! `require` calls and `exports` assignments, an AMD `define` wrapper or a
//! `System.register` wrapper with setters.

mod amd;
mod cjs;
mod es;
mod shared;
mod system;

use shaker_common::OutputFormat;

use crate::chunk::{ExportMode, ModuleDeclarations};
use crate::edit_buffer::BundleBuffer;

/// Chunk-level facts every finaliser reads.
pub struct FinaliseContext<'f> {
    pub declarations: &'f ModuleDeclarations,
    pub export_mode: ExportMode,
    /// Indentation of wrapped bodies.
    pub indent: &'f str,
    /// User intro, already followed by a blank line when non-empty.
    pub intro: String,
    /// User outro, already preceded by a blank line when non-empty.
    pub outro: String,
    pub is_entry_facade: bool,
    pub interop: bool,
    pub strict: bool,
    pub var_or_const: &'static str,
}

/// Wrap `bundle` in the syntax of `format`.
#[tracing::instrument(level = "debug", skip_all, fields(format = %format))]
pub fn finalise(format: OutputFormat, bundle: &mut BundleBuffer<'_>, ctx: &FinaliseContext<'_>) {
    match format {
        OutputFormat::Es => es::finalise(bundle, ctx),
        OutputFormat::Cjs => cjs::finalise(bundle, ctx),
        OutputFormat::Amd => amd::finalise(bundle, ctx),
        OutputFormat::System => system::finalise(bundle, ctx),
    }
}

#[cfg(test)]
#[path = "../../tests/finalisers.rs"]
mod tests;
