//! Execution order and entry-point colouring.
//!
//! Modules run dependencies first, so a depth-first post-order walk from
//! every entry point gives the order they appear in the output. The same
//! walk colours each module with the set of entry points that load it; the
//! colours later decide which modules can share a chunk. Dynamic import
//! targets become entry points of their own once the static entries have
//! been walked.

use fixedbitset::FixedBitSet;
use rustc_hash::{FxHashMap, FxHashSet};
use shaker_binder::{ModuleGraph, ModuleId, ModuleRef};
use shaker_common::{Diagnostic, DiagnosticCode};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct ExecutionOrder {
    /// Every reachable module, dependencies before dependents.
    pub ordered: Vec<ModuleId>,
    /// Static entries followed by dynamic import targets, in discovery order.
    pub entry_points: Vec<ModuleId>,
    /// Internal modules loaded through `import()`.
    pub dynamic_imports: Vec<ModuleId>,
    exec_index: FxHashMap<ModuleId, usize>,
    colours: FxHashMap<ModuleId, FixedBitSet>,
}

impl ExecutionOrder {
    /// Position of `module` in [`ExecutionOrder::ordered`].
    #[must_use]
    pub fn exec_index(&self, module: ModuleId) -> Option<usize> {
        self.exec_index.get(&module).copied()
    }

    /// The entry points that load `module`, one bit per entry point.
    #[must_use]
    pub fn colour(&self, module: ModuleId) -> Option<&FixedBitSet> {
        self.colours.get(&module)
    }

    #[must_use]
    pub fn is_entry_point(&self, module: ModuleId) -> bool {
        self.entry_points.contains(&module)
    }
}

struct Walker<'g> {
    graph: &'g ModuleGraph,
    order: ExecutionOrder,
    all_seen: FxHashSet<ModuleId>,
    current: ModuleId,
    current_bit: usize,
}

impl Walker<'_> {
    fn visit(&mut self, module: ModuleId, parents: &mut FxHashMap<ModuleId, Option<ModuleId>>) {
        if module != self.current && self.order.entry_points.contains(&module) {
            return;
        }
        let colour = self.order.colours.entry(module).or_default();
        colour.grow(self.current_bit + 1);
        colour.insert(self.current_bit);

        let graph = self.graph;
        let data = graph.module(module);
        for dependency in &data.dependencies {
            let ModuleRef::Internal(dependency) = *dependency else {
                continue;
            };
            if parents.contains_key(&dependency) {
                if !self.all_seen.contains(&dependency) {
                    self.warn_cycle(dependency, module, parents);
                }
                continue;
            }
            parents.insert(dependency, Some(module));
            self.visit(dependency, parents);
        }
        for target in data.dynamic_dependencies.iter().flatten() {
            if let ModuleRef::Internal(target) = *target
                && !self.order.dynamic_imports.contains(&target)
            {
                self.order.dynamic_imports.push(target);
            }
        }

        if !self.all_seen.insert(module) {
            return;
        }
        self.order.exec_index.insert(module, self.order.ordered.len());
        self.order.ordered.push(module);
    }

    /// `a -> b -> a`, starting at the module the cycle closes on.
    fn warn_cycle(&self, id: ModuleId, parent: ModuleId, parents: &FxHashMap<ModuleId, Option<ModuleId>>) {
        let graph = self.graph;
        let mut path = vec![graph.module(id).id.as_str()];
        let mut current = Some(parent);
        while let Some(module) = current.filter(|&m| m != id) {
            path.push(&graph.module(module).id);
            current = parents.get(&module).copied().flatten();
        }
        path.push(path[0]);
        path.reverse();
        let cycle = path.join(" -> ");
        debug!(%cycle, "circular dependency");
        graph.warn(Diagnostic::new(DiagnosticCode::CircularDependency, &[cycle.as_str()]).in_module(path[0]));
    }

    fn walk_from(&mut self, entry: ModuleId) {
        self.current = entry;
        self.current_bit = self.order.entry_points.len();
        self.order.entry_points.push(entry);
        let mut parents = FxHashMap::default();
        parents.insert(entry, None);
        self.visit(entry, &mut parents);
        trace!(entry = %self.graph.module(entry).id, ordered = self.order.ordered.len(), "walked entry");
    }
}

/// Walk the graph from `entries`, then from every dynamic import target
/// found on the way.
#[tracing::instrument(level = "debug", skip_all, fields(entries = entries.len()))]
pub fn analyse_execution(graph: &ModuleGraph, entries: &[ModuleId]) -> ExecutionOrder {
    let mut walker = Walker {
        graph,
        order: ExecutionOrder::default(),
        all_seen: FxHashSet::default(),
        current: ModuleId(0),
        current_bit: 0,
    };
    for &entry in entries {
        if !walker.order.entry_points.contains(&entry) {
            walker.walk_from(entry);
        }
    }
    let mut next = 0;
    while let Some(&target) = walker.order.dynamic_imports.get(next) {
        next += 1;
        if !walker.order.entry_points.contains(&target) {
            walker.walk_from(target);
        }
    }

    let mut order = walker.order;
    let width = order.entry_points.len();
    for colour in order.colours.values_mut() {
        colour.grow(width);
    }
    debug!(
        modules = order.ordered.len(),
        entry_points = width,
        dynamic = order.dynamic_imports.len(),
        "execution order"
    );
    order
}

#[cfg(test)]
#[path = "../tests/execution.rs"]
mod tests;
