//! Final identifier names of one chunk.
//!
//! Every binding rendered into a chunk shares the chunk's top-level
//! namespace: module-level declarations of all member modules, imported
//! bindings and the names of dependency objects. Collisions there are
//! resolved with `$`-suffixed base-64 counters (`foo$1`, `foo$2`, ...).
//! Nested scopes are then deshadowed: a local declaration that would hide a
//! binding the scope uses from outside is renamed with a decimal suffix.

use rustc_hash::{FxHashMap, FxHashSet};
use shaker_ast::NodeKind;
use shaker_binder::{ModuleGraph, ScopeId, VariableId};
use shaker_common::OutputFormat;
use shaker_common::identifiers::{make_legal, to_base64};
use shaker_common::limits::MAX_RENAME_ATTEMPTS;
use tracing::trace;

use crate::chunk::{ChunkDependency, ChunkId, ChunkSet};

#[derive(Clone, Copy, Debug)]
pub struct NamingOptions {
    pub format: OutputFormat,
    /// Wrap default imports of external modules in an interop check.
    pub interop: bool,
}

#[derive(Debug, Default)]
pub struct ChunkNames {
    names: FxHashMap<VariableId, String>,
    dependencies: FxHashMap<ChunkDependency, String>,
}

impl ChunkNames {
    /// Assign the final name of every binding rendered into `chunk`.
    #[tracing::instrument(level = "debug", skip_all, fields(chunk = chunk.0))]
    pub fn assign(chunks: &ChunkSet<'_>, chunk: ChunkId, options: NamingOptions) -> Self {
        let mut namer = Namer::new(chunks, chunk, options);
        namer.name_dependencies();
        namer.name_imports();
        namer.name_declarations();
        let graph = chunks.graph();
        for &module in &chunks.chunk(chunk).modules {
            for &child in &graph.scope(graph.module(module).scope).children {
                namer.deshadow(child);
            }
        }
        trace!(renamed = namer.names.names.len(), "names assigned");
        namer.names
    }

    /// The name `variable` renders as; unrenamed bindings keep their own.
    #[must_use]
    pub fn name_of<'a>(&'a self, graph: &'a ModuleGraph, variable: VariableId) -> &'a str {
        let variable = graph.original_variable(variable);
        self.names
            .get(&variable)
            .map_or_else(|| &*graph.variable(variable).name, String::as_str)
    }

    /// Identifier bound to a dependency's exports object.
    #[must_use]
    pub fn dependency_name(&self, dependency: ChunkDependency) -> &str {
        self.dependencies.get(&dependency).map_or("", String::as_str)
    }

    /// Whether `variable` is written through the `exports` object.
    #[must_use]
    pub fn is_exports_member(&self, graph: &ModuleGraph, variable: VariableId) -> bool {
        self.name_of(graph, variable).starts_with("exports.")
    }
}

struct Namer<'c, 'g> {
    chunks: &'c ChunkSet<'g>,
    graph: &'g ModuleGraph,
    chunk: ChunkId,
    options: NamingOptions,
    used: FxHashSet<String>,
    names: ChunkNames,
}

impl<'c, 'g> Namer<'c, 'g> {
    fn new(chunks: &'c ChunkSet<'g>, chunk: ChunkId, options: NamingOptions) -> Self {
        let graph = chunks.graph();
        let mut used: FxHashSet<String> = FxHashSet::default();
        used.insert(String::from("undefined"));
        used.extend(options.format.reserved_names().iter().map(|n| (*n).to_string()));
        for &module in &chunks.chunk(chunk).modules {
            let scope = graph.scope(graph.module(module).scope);
            for &variable in &scope.accessed_outside {
                let variable = graph.variable(variable);
                if variable.is_global() {
                    used.insert(variable.name.to_string());
                }
            }
        }
        Self {
            chunks,
            graph,
            chunk,
            options,
            used,
            names: ChunkNames::default(),
        }
    }

    fn safe_name(&mut self, base: &str, reserve: bool) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.used.contains(&candidate) && counter < MAX_RENAME_ATTEMPTS {
            candidate = format!("{base}${}", to_base64(counter));
            counter += 1;
        }
        if reserve {
            self.used.insert(candidate.clone());
        }
        candidate
    }

    fn name_dependencies(&mut self) {
        let chunks = self.chunks;
        let reserve = !self.options.format.uses_local_import_names();
        for &dependency in &chunks.chunk(self.chunk).dependencies {
            let base = match dependency {
                ChunkDependency::Chunk(chunk) => chunks.chunk(chunk).variable_name(),
                ChunkDependency::External(external) => make_legal(&self.graph.external(external).name),
            };
            let name = self.safe_name(&base, reserve);
            self.names.dependencies.insert(dependency, name);
        }
    }

    fn name_imports(&mut self) {
        let format = self.options.format;
        let local_names = format.uses_local_import_names();
        let (graph, chunks) = (self.graph, self.chunks);
        let current = chunks.chunk(self.chunk);
        for import in &current.imports {
            let dependency_name = self.names.dependency_name(import.dependency).to_string();
            let usage = current.usage(import.dependency);
            for imported in &import.variables {
                let name = match (import.dependency, &*imported.imported) {
                    (ChunkDependency::External(_), "*") if local_names => {
                        let base = &graph.variable(imported.variable).name;
                        self.safe_name(base, true)
                    }
                    (ChunkDependency::External(_), "*") => dependency_name.clone(),
                    (ChunkDependency::External(_), "default") => {
                        let interop_name =
                            usage.namespace || (format != OutputFormat::Es && usage.names);
                        let base = if interop_name {
                            format!("{dependency_name}__default")
                        } else {
                            dependency_name.clone()
                        };
                        if local_names { self.safe_name(&base, true) } else { base }
                    }
                    (_, imported_name) if local_names => {
                        let base = match import.dependency {
                            ChunkDependency::External(_) => imported_name.to_string(),
                            ChunkDependency::Chunk(_) => graph.variable(imported.variable).name.to_string(),
                        };
                        self.safe_name(&base, true)
                    }
                    (_, imported_name) => format!("{dependency_name}.{imported_name}"),
                };
                self.names.names.insert(imported.variable, name);
            }
        }
    }

    /// A reassigned exported `var`/`let` is written straight to `exports`
    /// by the CommonJS and AMD formats.
    fn exports_member_name(&self, variable: VariableId) -> Option<String> {
        if self.options.format.uses_local_import_names() {
            return None;
        }
        let data = self.graph.variable(variable);
        if !data.is_reassigned() || data.is_id {
            return None;
        }
        let exported = self.chunks.chunk(self.chunk).exported_variables.get(&variable)?;
        let declared_by_declarator = data.declarations.first().is_some_and(|&decl| {
            let parent = self.graph.arena.get(decl).map(|node| node.parent);
            matches!(
                parent.and_then(|p| self.graph.arena.kind(p)),
                Some(NodeKind::VariableDeclarator { id, .. }) if *id == decl
            )
        });
        declared_by_declarator.then(|| format!("exports.{exported}"))
    }

    fn name_declarations(&mut self) {
        let (graph, chunks) = (self.graph, self.chunks);
        for &module in &chunks.chunk(self.chunk).modules {
            let module = graph.module(module);
            for &variable in graph.scope(module.scope).variables.values() {
                let data = graph.variable(variable);
                if !data.is_included() || data.is_synthetic() || graph.original_variable(variable) != variable {
                    continue;
                }
                let name = match self.exports_member_name(variable) {
                    Some(name) => name,
                    None => self.safe_name(&data.name, true),
                };
                self.names.names.insert(variable, name);
            }
            let namespace = graph.variable(module.namespace);
            if namespace.is_included() {
                let name = self.safe_name(&namespace.name, true);
                self.names.names.insert(module.namespace, name);
            }
        }
    }

    fn final_name(&self, variable: VariableId) -> String {
        self.names.name_of(self.graph, variable).to_string()
    }

    fn deshadow(&mut self, scope: ScopeId) {
        let graph = self.graph;
        let data = graph.scope(scope);
        let forbidden: FxHashSet<String> = data
            .accessed_outside
            .iter()
            .filter(|&&v| graph.variable(v).is_included())
            .map(|&v| self.final_name(v))
            .collect();
        let declared: Vec<VariableId> = data
            .variables
            .values()
            .copied()
            .filter(|&v| {
                let variable = graph.variable(v);
                variable.is_included() && !variable.is_synthetic() && !variable.is_default()
            })
            .collect();

        if !forbidden.is_empty() {
            let mut taken = forbidden.clone();
            taken.extend(declared.iter().map(|&v| graph.variable(v).name.to_string()));
            for variable in declared {
                let name = graph.variable(variable).name.clone();
                if !forbidden.contains(&*name) {
                    continue;
                }
                let mut counter = 1;
                let mut candidate = format!("{name}${}", to_base64(counter));
                while taken.contains(&candidate) {
                    counter += 1;
                    candidate = format!("{name}${}", to_base64(counter));
                }
                taken.insert(candidate.clone());
                trace!(from = %name, to = %candidate, "deshadow");
                self.names.names.insert(variable, candidate);
            }
        }

        for &child in &data.children {
            self.deshadow(child);
        }
    }
}

#[cfg(test)]
#[path = "../tests/names.rs"]
mod tests;
