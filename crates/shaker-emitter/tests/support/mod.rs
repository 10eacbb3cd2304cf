//! Fixture graphs run through inclusion and rendered as one chunk.

#![allow(dead_code)]

#[path = "../../../shaker-analysis/tests/support/mod.rs"]
mod graph;

pub use graph::*;

use rustc_hash::FxHashMap;
use shaker_analysis::Analyzer;
use shaker_ast::NodeIndex;
use shaker_binder::{ModuleGraph, ModuleId, ModuleRef};
use shaker_common::{OutputFormat, TreeshakeOptions};
use shaker_emitter::{ChunkSet, RenderOptions, render_chunk};

/// Modules reachable from `entry`, dependencies first.
pub fn execution_order(graph: &ModuleGraph, entry: ModuleId) -> Vec<ModuleId> {
    fn visit(graph: &ModuleGraph, module: ModuleId, seen: &mut Vec<ModuleId>, order: &mut Vec<ModuleId>) {
        if seen.contains(&module) {
            return;
        }
        seen.push(module);
        for dependency in &graph.module(module).dependencies {
            if let ModuleRef::Internal(dependency) = *dependency {
                visit(graph, dependency, seen, order);
            }
        }
        order.push(module);
    }
    let (mut seen, mut order) = (Vec::new(), Vec::new());
    visit(graph, entry, &mut seen, &mut order);
    order
}

/// Include what `entry` exports and run inclusion to a fixpoint. Returns
/// the folded `if` tests.
pub fn shake(graph: &ModuleGraph, entry: &str) -> FxHashMap<NodeIndex, bool> {
    let analyzer = Analyzer::new(graph, TreeshakeOptions::default());
    analyzer.include_entry_exports(module(graph, entry));
    let modules: Vec<_> = graph.module_ids().collect();
    analyzer.run_inclusion(&modules);
    analyzer.folded_tests()
}

/// Link everything `entry` reaches into a single chunk named `main.js`.
pub fn single_chunk<'g>(graph: &'g ModuleGraph, entry: &str) -> ChunkSet<'g> {
    let entry = module(graph, entry);
    let mut chunks = ChunkSet::new(graph, &[]);
    let id = chunks.add_chunk(execution_order(graph, entry), Some(entry));
    chunks.set_file_name(id, "main.js");
    chunks.link();
    chunks
}

/// Bundle `keys` (entry first) into one file of `format`.
pub fn bundle(keys: &[&str], format: OutputFormat) -> String {
    bundle_with(keys, RenderOptions {
        format,
        ..RenderOptions::default()
    })
}

pub fn bundle_with(keys: &[&str], options: RenderOptions) -> String {
    let graph = linked(keys);
    let folded = shake(&graph, keys[0]);
    let chunks = single_chunk(&graph, keys[0]);
    let id = chunks.chunk_ids().next().expect("one chunk");
    render_chunk(&chunks, id, &options, &FxHashMap::default(), &folded).code
}
