//! Assembling the final text of a chunk.

use rustc_hash::FxHashMap;
use shaker_ast::NodeIndex;
use shaker_common::{Diagnostic, DiagnosticCode, OutputFormat};
use tracing::{debug, warn};

use crate::chunk::{ChunkId, ChunkSet};
use crate::edit_buffer::{BundleBuffer, EditBuffer, common_indent};
use crate::finalisers::{FinaliseContext, finalise};
use crate::names::{ChunkNames, NamingOptions};
use crate::render::{DynamicImportTarget, RenderContext, namespace_block, render_module};

/// Output options that shape the rendered text.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Freeze reified namespace objects.
    pub freeze: bool,
    /// Declare synthesized bindings with `const` instead of `var`.
    pub prefer_const: bool,
    pub interop: bool,
    /// Emit `'use strict'` in the CommonJS and AMD wrappers.
    pub strict: bool,
    /// Import path overrides for external module ids.
    pub paths: FxHashMap<String, String>,
    pub banner: String,
    pub footer: String,
    pub intro: String,
    pub outro: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Es,
            freeze: true,
            prefer_const: false,
            interop: true,
            strict: true,
            paths: FxHashMap::default(),
            banner: String::new(),
            footer: String::new(),
            intro: String::new(),
            outro: String::new(),
        }
    }
}

/// One emitted file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedChunk {
    pub file_name: String,
    pub code: String,
    /// Export names, in declaration order.
    pub exports: Vec<String>,
    /// Ids of the chunks and external modules it loads.
    pub imports: Vec<String>,
    /// Ids of its member modules, in execution order.
    pub modules: Vec<String>,
    pub is_entry: bool,
}

/// Render chunk `id` of a linked chunk set.
#[tracing::instrument(level = "debug", skip_all, fields(chunk = id.0))]
pub fn render_chunk(
    chunks: &ChunkSet<'_>,
    id: ChunkId,
    options: &RenderOptions,
    dynamic_imports: &FxHashMap<NodeIndex, DynamicImportTarget>,
    folded_tests: &FxHashMap<NodeIndex, bool>,
) -> RenderedChunk {
    let graph = chunks.graph();
    let chunk = chunks.chunk(id);
    let names = ChunkNames::assign(
        chunks,
        id,
        NamingOptions {
            format: options.format,
            interop: options.interop,
        },
    );
    let indent = common_indent(chunk.modules.iter().map(|&m| graph.module(m).code.as_str()));
    let ctx = RenderContext {
        graph,
        names: &names,
        format: options.format,
        prefer_const: options.prefer_const,
        freeze: options.freeze,
        interop: options.interop,
        indent: &indent,
        exported: &chunk.exported_variables,
        dynamic_imports,
        folded_tests,
    };

    let mut bundle = BundleBuffer::new("\n\n");
    for &module in &chunk.modules {
        let mut source = EditBuffer::new(&graph.module(module).code);
        render_module(&ctx, module, &mut source);
        if let Some(block) = namespace_block(&ctx, module) {
            source.trim_end();
            source.append(&format!("\n\n{block}"));
        }
        source.trim();
        if !source.is_blank() {
            bundle.add_source(source);
        }
    }

    if bundle.is_blank() && chunk.exports.is_empty() {
        warn!(file = %chunk.file_name, "empty bundle");
        graph.warn(Diagnostic::new(DiagnosticCode::EmptyBundle, &[]));
    }
    bundle.trim();

    let declarations = chunks.module_declarations(id, &names, &options.paths);
    let export_mode = chunks.export_mode(id);
    debug!(mode = export_mode.as_str(), "export mode");
    let finalise_ctx = FinaliseContext {
        declarations: &declarations,
        export_mode,
        indent: &indent,
        intro: if options.intro.is_empty() {
            String::new()
        } else {
            format!("{}\n\n", options.intro)
        },
        outro: if options.outro.is_empty() {
            String::new()
        } else {
            format!("\n\n{}", options.outro)
        },
        is_entry_facade: chunk.is_entry_facade,
        interop: options.interop,
        strict: options.strict,
        var_or_const: ctx.var_or_const(),
    };
    finalise(options.format, &mut bundle, &finalise_ctx);

    if !options.banner.is_empty() {
        bundle.prepend(&format!("{}\n", options.banner));
    }
    if !options.footer.is_empty() {
        bundle.append(&format!("\n{}", options.footer));
    }
    let mut code = bundle.to_string();
    code.push('\n');

    RenderedChunk {
        file_name: chunk.file_name.clone(),
        code,
        exports: chunk.exports.keys().map(ToString::to_string).collect(),
        imports: declarations.dependencies.iter().map(|d| d.id.clone()).collect(),
        modules: chunk.modules.iter().map(|&m| graph.module(m).id.clone()).collect(),
        is_entry: chunk.entry_module.is_some(),
    }
}
