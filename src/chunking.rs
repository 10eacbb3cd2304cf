//! Grouping modules into chunks and naming the output files.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use shaker_binder::{ModuleGraph, ModuleId};
use shaker_emitter::{ChunkId, ChunkSet};
use tracing::debug;

use crate::execution::ExecutionOrder;

/// Modules of one chunk before wiring, in execution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkGroup {
    pub modules: Vec<ModuleId>,
    pub entry_module: Option<ModuleId>,
    /// Further entry points coloured like this group; each gets a facade.
    pub extra_entries: Vec<ModuleId>,
}

/// One group per distinct entry-point colour, in order of first appearance.
#[must_use]
pub fn group_by_colour(order: &ExecutionOrder) -> Vec<ChunkGroup> {
    let mut groups: IndexMap<Vec<usize>, Vec<ModuleId>> = IndexMap::new();
    for &module in &order.ordered {
        if let Some(colour) = order.colour(module) {
            groups.entry(colour.ones().collect()).or_default().push(module);
        }
    }
    groups
        .into_values()
        .map(|modules| {
            let mut entries = order
                .entry_points
                .iter()
                .copied()
                .filter(|entry| modules.contains(entry));
            let entry_module = entries.next();
            ChunkGroup {
                extra_entries: entries.collect(),
                modules,
                entry_module,
            }
        })
        .collect()
}

/// Every reachable module in one chunk for the first entry.
#[must_use]
pub fn single_group(order: &ExecutionOrder) -> ChunkGroup {
    ChunkGroup {
        modules: order.ordered.clone(),
        entry_module: order.entry_points.first().copied(),
        extra_entries: Vec::new(),
    }
}

/// Unique output file names. Entries keep their base name (`.js` and
/// `.mjs` kept, any other extension folded into the name); clashes get
/// numeric suffixes starting at 2.
#[derive(Debug, Default)]
pub struct ChunkNamer {
    used: FxHashSet<String>,
}

impl ChunkNamer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, id: &str) -> String {
        let base = id.rsplit(['/', '\\']).next().unwrap_or(id);
        let (stem, extension) = match base.rfind('.') {
            Some(dot) if dot > 0 && matches!(&base[dot..], ".js" | ".mjs") => (&base[..dot], &base[dot..]),
            _ => (base, ".js"),
        };
        let mut unique = stem.to_string();
        let mut index = 2;
        while self.used.contains(&unique) {
            unique = format!("{stem}{index}");
            index += 1;
        }
        self.used.insert(unique.clone());
        format!("{unique}{extension}")
    }
}

/// Add `groups` to `chunks`, wire them and name every resulting chunk.
/// Returns the chunks in output order: each entry's file, then the chunk
/// holding its modules when that is a different one.
#[tracing::instrument(level = "debug", skip_all, fields(groups = groups.len()))]
pub fn assemble(chunks: &mut ChunkSet<'_>, graph: &ModuleGraph, groups: Vec<ChunkGroup>) -> Vec<ChunkId> {
    let mut initial = Vec::new();
    for group in groups {
        initial.push(chunks.add_chunk(group.modules, group.entry_module));
        for entry in group.extra_entries {
            initial.push(chunks.add_chunk(Vec::new(), Some(entry)));
        }
    }
    let facades = chunks.link();

    let mut namer = ChunkNamer::new();
    let mut output = Vec::new();
    for id in initial {
        let chunk = chunks.chunk(id);
        if let Some(entry) = chunk.entry_module {
            let name = namer.name(&graph.module(entry).id);
            if chunk.is_entry_facade {
                chunks.set_file_name(id, name);
                output.push(id);
                continue;
            }
            if let Some(&facade) = facades
                .iter()
                .find(|&&facade| chunks.chunk(facade).entry_module == Some(entry))
            {
                chunks.set_file_name(facade, name);
                output.push(facade);
            }
        }
        let name = namer.name("chunk");
        chunks.set_file_name(id, name);
        output.push(id);
    }
    debug!(chunks = output.len(), facades = facades.len(), "chunks named");
    output
}

#[cfg(test)]
#[path = "../tests/chunking.rs"]
mod tests;
