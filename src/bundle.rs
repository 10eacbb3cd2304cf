//! The build pipeline: link, analyse, include, chunk and render.

use rustc_hash::FxHashMap;
use shaker_analysis::{Analyzer, InclusionStats};
use shaker_ast::NodeIndex;
use shaker_binder::{ModuleGraph, ModuleId, ModuleInput, ModuleRef};
use shaker_common::{BuildError, Diagnostic, DiagnosticCode, OutputFormat, TreeshakeOptions};
use shaker_emitter::{ChunkId, ChunkSet, DynamicImportTarget, RenderOptions, RenderedChunk, render_chunk};
use tracing::{debug, info};

use crate::chunking::{ChunkGroup, assemble, group_by_colour, single_group};
use crate::execution::{ExecutionOrder, analyse_execution};

/// Everything that shapes one build.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Ids of the entry modules.
    pub entries: Vec<String>,
    pub format: OutputFormat,
    /// `None` disables tree-shaking: every statement is kept.
    pub treeshake: Option<TreeshakeOptions>,
    /// Output path overrides for external module ids.
    pub paths: FxHashMap<String, String>,
    pub freeze: bool,
    pub prefer_const: bool,
    pub interop: bool,
    pub strict: bool,
    /// Render every module, dynamically imported ones included, into a
    /// single chunk.
    pub inline_dynamic_imports: bool,
    pub banner: String,
    pub footer: String,
    pub intro: String,
    pub outro: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            format: OutputFormat::Es,
            treeshake: Some(TreeshakeOptions::default()),
            paths: FxHashMap::default(),
            freeze: true,
            prefer_const: false,
            interop: true,
            strict: true,
            inline_dynamic_imports: false,
            banner: String::new(),
            footer: String::new(),
            intro: String::new(),
            outro: String::new(),
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: self.format,
            freeze: self.freeze,
            prefer_const: self.prefer_const,
            interop: self.interop,
            strict: self.strict,
            paths: self.paths.clone(),
            banner: self.banner.clone(),
            footer: self.footer.clone(),
            intro: self.intro.clone(),
            outro: self.outro.clone(),
        }
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.entries.is_empty() {
            return Err(BuildError::new(
                DiagnosticCode::InvalidOption,
                &["You must supply at least one entry module"],
            ));
        }
        if self.inline_dynamic_imports && self.entries.len() > 1 {
            return Err(BuildError::new(
                DiagnosticCode::InvalidOption,
                &["Multiple entry modules are not supported when inlining dynamic imports"],
            ));
        }
        Ok(())
    }
}

/// The files and warnings a build produced.
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// Output files, each entry's file first.
    pub chunks: Vec<RenderedChunk>,
    pub warnings: Vec<Diagnostic>,
    pub stats: InclusionStats,
}

impl BuildOutput {
    #[must_use]
    pub fn chunk(&self, file_name: &str) -> Option<&RenderedChunk> {
        self.chunks.iter().find(|chunk| chunk.file_name == file_name)
    }
}

/// A linked module graph ready to be generated.
pub struct Bundle {
    graph: ModuleGraph,
    options: BuildOptions,
}

impl Bundle {
    /// Bind and link `inputs`. Parse and linking errors are fatal.
    #[tracing::instrument(level = "debug", skip_all, fields(modules = inputs.len()))]
    pub fn new(inputs: Vec<ModuleInput>, options: BuildOptions) -> Result<Self, BuildError> {
        options.validate()?;
        let mut graph = ModuleGraph::new();
        for input in inputs {
            graph.add_module(input).map_err(|err| locate_error(&graph, err))?;
        }
        graph.link().map_err(|err| locate_error(&graph, err))?;
        Ok(Self { graph, options })
    }

    #[must_use]
    pub const fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    #[must_use]
    pub const fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn entry_modules(&self) -> Result<Vec<ModuleId>, BuildError> {
        self.options
            .entries
            .iter()
            .map(|entry| {
                self.graph
                    .module_by_id(entry)
                    .ok_or_else(|| BuildError::new(DiagnosticCode::UnresolvedEntry, &[entry.as_str()]))
            })
            .collect()
    }

    /// Run tree-shaking and render every chunk. Inclusion marks the graph
    /// in place, so a bundle is generated once.
    #[tracing::instrument(level = "debug", skip_all, fields(format = self.options.format.as_str()))]
    pub fn generate(self) -> Result<BuildOutput, BuildError> {
        let graph = &self.graph;
        let options = &self.options;
        let entries = self.entry_modules()?;
        let order = analyse_execution(graph, &entries);

        let treeshake = options.treeshake.clone().unwrap_or_default();
        let pure_external_modules = treeshake.pure_external_modules.clone();
        let analyzer = Analyzer::new(graph, treeshake);
        if options.treeshake.is_none() {
            analyzer.include_everything();
        }
        self.mark_entry_points(&analyzer, &order, &entries);
        let mut stats = analyzer.run_inclusion(&order.ordered);
        warn_unused_external_imports(graph);

        let groups = if options.inline_dynamic_imports {
            vec![single_group(&order)]
        } else {
            group_by_colour(&order)
        };
        if !options.inline_dynamic_imports && self.include_inlined_namespaces(&analyzer, &groups) {
            stats = analyzer.run_inclusion(&order.ordered);
        }

        let mut chunks = ChunkSet::new(graph, &pure_external_modules);
        let output_order = assemble(&mut chunks, graph, groups);
        let dynamic_imports = dynamic_import_targets(&chunks, &order, &options.paths);
        let folded_tests = analyzer.folded_tests();
        let render_options = options.render_options();
        let rendered: Vec<RenderedChunk> = output_order
            .iter()
            .map(|&id| render_chunk(&chunks, id, &render_options, &dynamic_imports, &folded_tests))
            .collect();

        let warnings: Vec<Diagnostic> = graph
            .diagnostics
            .take()
            .into_iter()
            .map(|diagnostic| locate(graph, diagnostic))
            .collect();
        info!(
            chunks = rendered.len(),
            warnings = warnings.len(),
            passes = stats.passes,
            "build finished"
        );
        Ok(BuildOutput {
            chunks: rendered,
            warnings,
            stats,
        })
    }

    /// Include what every entry point exposes. A single-chunk build also
    /// needs the namespace object of every dynamically imported module.
    fn mark_entry_points(&self, analyzer: &Analyzer<'_>, order: &ExecutionOrder, entries: &[ModuleId]) {
        for &entry in entries {
            analyzer.include_entry_exports(entry);
        }
        for &target in &order.dynamic_imports {
            if !entries.contains(&target) {
                analyzer.include_entry_exports(target);
            }
            if self.options.inline_dynamic_imports {
                analyzer.include_namespace(target);
            }
        }
    }

    /// Dynamic imports whose target shares the importer's chunk resolve to
    /// the target's namespace object. Returns whether any was included.
    fn include_inlined_namespaces(&self, analyzer: &Analyzer<'_>, groups: &[ChunkGroup]) -> bool {
        let group_of = |module: ModuleId| groups.iter().position(|g| g.modules.contains(&module));
        let mut included = false;
        for group in groups {
            for &module in &group.modules {
                for target in self.graph.module(module).dynamic_dependencies.iter().flatten() {
                    if let ModuleRef::Internal(target) = *target
                        && group_of(target) == group_of(module)
                    {
                        analyzer.include_namespace(target);
                        included = true;
                    }
                }
            }
        }
        included
    }
}

/// Bundle `inputs` in one go.
pub fn build(inputs: Vec<ModuleInput>, options: BuildOptions) -> Result<BuildOutput, BuildError> {
    Bundle::new(inputs, options)?.generate()
}

fn warn_unused_external_imports(graph: &ModuleGraph) {
    for external in &graph.externals {
        if external.has_star_reexport {
            continue;
        }
        let unused: Vec<String> = external
            .variables
            .iter()
            .filter(|(name, variable)| &***name != "*" && !graph.variable(**variable).is_included())
            .map(|(name, _)| format!("'{name}'"))
            .collect();
        let names = match unused.as_slice() {
            [] => continue,
            [single] => format!("{single} is"),
            [init @ .., last] => format!("{} and {last} are", init.join(", ")),
        };
        debug!(external = %external.id, unused = unused.len(), "unused external imports");
        graph.warn(Diagnostic::new(
            DiagnosticCode::UnusedExternalImport,
            &[names.as_str(), external.id.as_str()],
        ));
    }
}

/// How every `import()` with a known target renders in its own chunk.
fn dynamic_import_targets(
    chunks: &ChunkSet<'_>,
    order: &ExecutionOrder,
    paths: &FxHashMap<String, String>,
) -> FxHashMap<NodeIndex, DynamicImportTarget> {
    let graph = chunks.graph();
    let mut targets = FxHashMap::default();
    for &module in &order.ordered {
        let data = graph.module(module);
        for (&node, target) in data.dynamic_imports.iter().zip(&data.dynamic_dependencies) {
            let resolution = match *target {
                Some(ModuleRef::Internal(target)) => {
                    let importer_chunk = chunks.chunk_of(module);
                    if chunks.chunk_of(target) == importer_chunk {
                        DynamicImportTarget::Namespace(graph.module(target).namespace)
                    } else {
                        match entry_chunk(chunks, target) {
                            Some(chunk) => DynamicImportTarget::Chunk(chunks.chunk(chunk).import_path()),
                            None => continue,
                        }
                    }
                }
                Some(ModuleRef::External(external)) => {
                    let id = &graph.external(external).id;
                    DynamicImportTarget::External(paths.get(id).cloned().unwrap_or_else(|| id.clone()))
                }
                None => continue,
            };
            targets.insert(node, resolution);
        }
    }
    targets
}

/// The chunk that exposes exactly what `entry` exports: its facade when it
/// has one, else the chunk holding it.
fn entry_chunk(chunks: &ChunkSet<'_>, entry: ModuleId) -> Option<ChunkId> {
    chunks
        .chunks()
        .iter()
        .find(|chunk| chunk.entry_module == Some(entry) && chunk.is_entry_facade)
        .map(|chunk| chunk.id)
        .or_else(|| chunks.chunk_of(entry))
}

fn locate(graph: &ModuleGraph, mut diagnostic: Diagnostic) -> Diagnostic {
    if let Some(module) = diagnostic.module.as_deref().and_then(|id| graph.module_by_id(id)) {
        diagnostic.locate(&graph.module(module).line_map);
    }
    diagnostic
}

fn locate_error(graph: &ModuleGraph, mut err: BuildError) -> BuildError {
    let diagnostic = locate(graph, err.diagnostic().clone());
    *err.diagnostic_mut() = diagnostic;
    err
}

#[cfg(test)]
#[path = "../tests/bundle.rs"]
mod tests;
