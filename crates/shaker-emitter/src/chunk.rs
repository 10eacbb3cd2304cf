//! Chunks: the output files of a build and the bindings they exchange.
//!
//! The driver decides which modules share a chunk; [`ChunkSet::link`] then
//! works out what every chunk exports (its entry module's exports plus
//! whatever other chunks need from it), what it imports, and which chunks
//! and external modules it depends on. Variables always travel by
//! identity; export names are chosen per chunk and recorded next to them.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use shaker_ast::NodeKind;
use shaker_binder::{
    ExternalId, MemberResolution, ModuleGraph, ModuleId, ModuleRef, VariableId, VariableKind,
};
use shaker_common::Name;
use shaker_common::identifiers::{basename_without_extension, make_legal};
use tracing::{debug, trace};

use crate::names::ChunkNames;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u32);

/// Something a chunk loads before it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkDependency {
    Chunk(ChunkId),
    External(ExternalId),
}

/// A binding a chunk takes from one of its dependencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedVariable {
    pub variable: VariableId,
    /// Name the dependency exports it under; `*` for an external namespace.
    pub imported: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkImport {
    pub dependency: ChunkDependency,
    pub variables: Vec<ImportedVariable>,
}

/// How a chunk uses one dependency; decides the names its bindings get.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DependencyUsage {
    pub default: bool,
    /// Anything other than the default export, namespaces included.
    pub names: bool,
    /// The namespace is imported as a value.
    pub namespace: bool,
}

#[derive(Debug)]
pub struct Chunk {
    pub id: ChunkId,
    pub file_name: String,
    /// Member modules in execution order.
    pub modules: Vec<ModuleId>,
    pub entry_module: Option<ModuleId>,
    /// Exports exactly what its entry module exports.
    pub is_entry_facade: bool,
    /// Export name → variable, in declaration order.
    pub exports: IndexMap<Name, VariableId>,
    /// First export name of every variable this chunk owns and exports.
    pub exported_variables: FxHashMap<VariableId, Name>,
    /// External modules the entry module re-exports wholesale.
    pub star_reexports: Vec<ExternalId>,
    pub imports: Vec<ChunkImport>,
    /// Dependency and import name of every binding this chunk uses or
    /// re-exports without owning it.
    pub import_sources: FxHashMap<VariableId, (ChunkDependency, Name)>,
    pub dependencies: Vec<ChunkDependency>,
}

impl Chunk {
    fn new(id: ChunkId, modules: Vec<ModuleId>, entry_module: Option<ModuleId>) -> Self {
        Self {
            id,
            file_name: format!("chunk{}.js", id.0),
            modules,
            entry_module,
            is_entry_facade: entry_module.is_some(),
            exports: IndexMap::new(),
            exported_variables: FxHashMap::default(),
            star_reexports: Vec::new(),
            imports: Vec::new(),
            import_sources: FxHashMap::default(),
            dependencies: Vec::new(),
        }
    }

    /// Identifier other chunks bind this chunk's exports object to.
    #[must_use]
    pub fn variable_name(&self) -> String {
        make_legal(basename_without_extension(&self.file_name))
    }

    /// Path other chunks import this chunk from.
    #[must_use]
    pub fn import_path(&self) -> String {
        format!("./{}", self.file_name)
    }

    #[must_use]
    pub const fn is_facade_only(&self) -> bool {
        self.modules.is_empty()
    }

    #[must_use]
    pub fn usage(&self, dependency: ChunkDependency) -> DependencyUsage {
        let mut usage = DependencyUsage::default();
        let mut note = |imported: &str, as_value: bool| match imported {
            "default" => usage.default = true,
            "*" => {
                usage.names = true;
                usage.namespace |= as_value;
            }
            _ => usage.names = true,
        };
        for import in self.imports.iter().filter(|i| i.dependency == dependency) {
            for variable in &import.variables {
                note(&variable.imported, true);
            }
        }
        for variable in self.exports.values() {
            if let Some((source, imported)) = self.import_sources.get(variable)
                && *source == dependency
            {
                note(imported, false);
            }
        }
        if let ChunkDependency::External(external) = dependency
            && self.star_reexports.contains(&external)
        {
            usage.names = true;
        }
        usage
    }
}

/// How a chunk's exports are exposed by the non-ES formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportMode {
    None,
    /// The default export is the whole module value.
    Default,
    Named,
}

impl ExportMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Default => "default",
            Self::Named => "named",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub local: String,
    pub imported: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReexportSpecifier {
    pub imported: Name,
    pub reexported: Name,
}

/// One dependency as the finalisers write it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub id: String,
    pub name: String,
    pub is_chunk: bool,
    pub imports: Vec<ImportSpecifier>,
    pub reexports: Vec<ReexportSpecifier>,
    pub exports_default: bool,
    pub exports_names: bool,
}

/// A binding the chunk itself owns and exports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportDeclaration {
    pub local: String,
    pub exported: Name,
    /// A function declaration, usable before the chunk body runs.
    pub hoisted: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleDeclarations {
    pub dependencies: Vec<DependencyDeclaration>,
    pub exports: Vec<ExportDeclaration>,
}

pub struct ChunkSet<'g> {
    graph: &'g ModuleGraph,
    chunks: Vec<Chunk>,
    module_chunks: FxHashMap<ModuleId, ChunkId>,
    pure_externals: FxHashSet<String>,
}

impl<'g> ChunkSet<'g> {
    #[must_use]
    pub fn new(graph: &'g ModuleGraph, pure_external_modules: &[String]) -> Self {
        Self {
            graph,
            chunks: Vec::new(),
            module_chunks: FxHashMap::default(),
            pure_externals: pure_external_modules.iter().cloned().collect(),
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &'g ModuleGraph {
        self.graph
    }

    pub fn add_chunk(&mut self, modules: Vec<ModuleId>, entry_module: Option<ModuleId>) -> ChunkId {
        let id = ChunkId(self.chunks.len() as u32);
        for &module in &modules {
            self.module_chunks.insert(module, id);
        }
        trace!(chunk = id.0, modules = modules.len(), entry = ?entry_module, "add chunk");
        self.chunks.push(Chunk::new(id, modules, entry_module));
        id
    }

    #[must_use]
    pub fn chunk(&self, id: ChunkId) -> &Chunk {
        &self.chunks[id.0 as usize]
    }

    fn chunk_mut(&mut self, id: ChunkId) -> &mut Chunk {
        &mut self.chunks[id.0 as usize]
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_ids(&self) -> impl Iterator<Item = ChunkId> + '_ {
        (0..self.chunks.len()).map(|i| ChunkId(i as u32))
    }

    #[must_use]
    pub fn chunk_of(&self, module: ModuleId) -> Option<ChunkId> {
        self.module_chunks.get(&module).copied()
    }

    pub fn set_file_name(&mut self, id: ChunkId, file_name: impl Into<String>) {
        self.chunk_mut(id).file_name = file_name.into();
    }

    /// Where a variable lives; `None` for globals.
    #[must_use]
    pub fn owner_of(&self, variable: VariableId) -> Option<ChunkDependency> {
        let variable = self.graph.variable(variable);
        match variable.kind {
            VariableKind::External { module } => Some(ChunkDependency::External(module)),
            VariableKind::Namespace { module } => self.chunk_of(module).map(ChunkDependency::Chunk),
            VariableKind::Global => None,
            _ => variable
                .module
                .and_then(|module| self.chunk_of(module))
                .map(ChunkDependency::Chunk),
        }
    }

    #[must_use]
    pub fn is_pure_unused(&self, external: ExternalId) -> bool {
        let module = self.graph.external(external);
        self.pure_externals.contains(&module.id) && !module.is_used()
    }

    // =========================================================================
    // Wiring
    // =========================================================================

    /// Compute exports, imports, entry facades and dependencies of every
    /// chunk. Returns the facades that had to be added.
    #[tracing::instrument(level = "debug", skip_all, fields(chunks = self.chunks.len()))]
    pub fn link(&mut self) -> Vec<ChunkId> {
        let initial: Vec<ChunkId> = self.chunk_ids().collect();
        for &id in &initial {
            if let Some(entry) = self.chunk(id).entry_module {
                self.generate_entry_exports(id, entry);
            }
        }
        for &id in &initial {
            self.generate_imports(id);
        }

        let mut facades = Vec::new();
        for &id in &initial {
            let chunk = self.chunk(id);
            if let Some(entry) = chunk.entry_module
                && !chunk.is_entry_facade
            {
                let facade = self.add_chunk(Vec::new(), Some(entry));
                self.generate_entry_exports(facade, entry);
                debug!(entry = %self.graph.module(entry).id, chunk = id.0, facade = facade.0, "entry facade");
                facades.push(facade);
            }
        }

        for id in self.chunk_ids().collect::<Vec<_>>() {
            self.collect_dependencies(id);
        }
        facades
    }

    /// Export `variable` from the chunk that owns it and return the name.
    /// New names are the variable's own name, suffixed `$1`, `$2`, ... on
    /// collision. Any export beyond the entry module's own ones means the
    /// chunk no longer stands for its entry alone.
    pub fn ensure_export(&mut self, chunk: ChunkId, variable: VariableId) -> Name {
        if let Some(name) = self.chunk(chunk).exported_variables.get(&variable) {
            return name.clone();
        }
        let base = self.graph.variable(variable).name.clone();
        let target = self.chunk_mut(chunk);
        let mut name = base.clone();
        let mut i = 0;
        while target.exports.contains_key(&name) {
            i += 1;
            name = Name::from(format!("{base}${i}").as_str());
        }
        target.exports.insert(name.clone(), variable);
        target.exported_variables.insert(variable, name.clone());
        target.is_entry_facade = false;
        trace!(chunk = chunk.0, name = %name, "ensure export");
        name
    }

    /// Record where `variable` comes from when `chunk` does not own it.
    fn trace_import(&mut self, chunk: ChunkId, variable: VariableId) -> Option<(ChunkDependency, Name)> {
        if let Some(source) = self.chunk(chunk).import_sources.get(&variable) {
            return Some(source.clone());
        }
        let owner = self.owner_of(variable)?;
        let imported = match owner {
            ChunkDependency::Chunk(owner_chunk) if owner_chunk == chunk => return None,
            ChunkDependency::Chunk(owner_chunk) => self.ensure_export(owner_chunk, variable),
            ChunkDependency::External(external) => self
                .graph
                .external(external)
                .variables
                .iter()
                .find(|(_, v)| **v == variable)
                .map(|(imported, _)| imported.clone())?,
        };
        let source = (owner, imported);
        self.chunk_mut(chunk).import_sources.insert(variable, source.clone());
        Some(source)
    }

    fn generate_entry_exports(&mut self, chunk: ChunkId, entry: ModuleId) {
        let graph = self.graph;
        let undefined = graph.undefined_variable();
        for (name, &variable) in &graph.module(entry).export_bindings {
            let variable = graph.original_variable(variable);
            if variable == undefined {
                continue;
            }
            if self.trace_import(chunk, variable).is_none() {
                self.chunk_mut(chunk)
                    .exported_variables
                    .entry(variable)
                    .or_insert_with(|| name.clone());
            }
            self.chunk_mut(chunk).exports.insert(name.clone(), variable);
        }
        let stars = self.external_star_sources(entry);
        self.chunk_mut(chunk).star_reexports = stars;
    }

    /// External modules reached through `export *` chains from `module`.
    fn external_star_sources(&self, module: ModuleId) -> Vec<ExternalId> {
        let mut found = IndexSet::new();
        let mut visited = FxHashSet::default();
        let mut stack = vec![module];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let module = self.graph.module(current);
            for source in &module.export_all_sources {
                match module.dependency_for(source) {
                    Some(ModuleRef::External(external)) => {
                        found.insert(external);
                    }
                    Some(ModuleRef::Internal(target)) => stack.push(target),
                    None => {}
                }
            }
        }
        found.into_iter().collect()
    }

    /// Variables referenced by the included code of `chunk`, in document order.
    fn referenced_variables(&self, chunk: ChunkId) -> Vec<VariableId> {
        let graph = self.graph;
        let members: FxHashSet<u32> = self.chunk(chunk).modules.iter().map(|m| m.0).collect();
        let mut seen = FxHashSet::default();
        let mut referenced = Vec::new();
        for (idx, node) in graph.arena.iter() {
            if !members.contains(&node.file) || !node.is_included() {
                continue;
            }
            let variable = match &node.kind {
                NodeKind::Identifier { .. } => graph.reference(idx),
                NodeKind::MemberExpression { .. } => match graph.member_resolution(idx) {
                    Some(MemberResolution::Variable(variable)) => Some(variable),
                    _ => None,
                },
                _ => None,
            };
            if let Some(variable) = variable.map(|v| graph.original_variable(v))
                && seen.insert(variable)
            {
                referenced.push(variable);
            }
        }
        referenced
    }

    fn generate_imports(&mut self, chunk: ChunkId) {
        for variable in self.referenced_variables(chunk) {
            let Some((dependency, imported)) = self.trace_import(chunk, variable) else {
                continue;
            };
            let imports = &mut self.chunk_mut(chunk).imports;
            let entry = match imports.iter().position(|i| i.dependency == dependency) {
                Some(index) => &mut imports[index],
                None => {
                    imports.push(ChunkImport {
                        dependency,
                        variables: Vec::new(),
                    });
                    let last = imports.len() - 1;
                    &mut imports[last]
                }
            };
            entry.variables.push(ImportedVariable { variable, imported });
        }
    }

    fn collect_dependencies(&mut self, chunk: ChunkId) {
        let graph = self.graph;
        let mut dependencies: IndexSet<ChunkDependency> = IndexSet::new();
        let current = self.chunk(chunk);
        if current.is_facade_only()
            && let Some(entry) = current.entry_module.and_then(|m| self.chunk_of(m))
        {
            dependencies.insert(ChunkDependency::Chunk(entry));
        }
        for &module in &current.modules {
            for &dependency in &graph.module(module).dependencies {
                match dependency {
                    ModuleRef::External(external) => {
                        if !self.is_pure_unused(external) {
                            dependencies.insert(ChunkDependency::External(external));
                        }
                    }
                    ModuleRef::Internal(target) => {
                        if let Some(owner) = self.chunk_of(target)
                            && owner != chunk
                        {
                            dependencies.insert(ChunkDependency::Chunk(owner));
                        }
                    }
                }
            }
        }
        for import in &current.imports {
            dependencies.insert(import.dependency);
        }
        for (dependency, _) in current.import_sources.values() {
            dependencies.insert(*dependency);
        }
        for &external in &current.star_reexports {
            dependencies.insert(ChunkDependency::External(external));
        }
        self.chunk_mut(chunk).dependencies = dependencies.into_iter().collect();
    }

    // =========================================================================
    // Queries for rendering
    // =========================================================================

    #[must_use]
    pub fn export_mode(&self, chunk: ChunkId) -> ExportMode {
        let chunk = self.chunk(chunk);
        if !chunk.star_reexports.is_empty() {
            return ExportMode::Named;
        }
        match chunk.exports.len() {
            0 => ExportMode::None,
            1 if chunk.exports.contains_key("default") => ExportMode::Default,
            _ => ExportMode::Named,
        }
    }

    /// The import path of a dependency, honouring `paths` overrides for
    /// external modules.
    #[must_use]
    pub fn dependency_id(&self, dependency: ChunkDependency, paths: &FxHashMap<String, String>) -> String {
        match dependency {
            ChunkDependency::Chunk(chunk) => self.chunk(chunk).import_path(),
            ChunkDependency::External(external) => {
                let id = &self.graph.external(external).id;
                paths.get(id).cloned().unwrap_or_else(|| id.clone())
            }
        }
    }

    fn is_hoisted(&self, variable: VariableId) -> bool {
        let variable = self.graph.variable(variable);
        variable.is_id
            && matches!(
                self.graph.arena.kind(variable.init),
                Some(NodeKind::FunctionDeclaration(_))
            )
    }

    /// Dependencies and exports of `chunk` with their final local names.
    #[must_use]
    pub fn module_declarations(
        &self,
        chunk: ChunkId,
        names: &ChunkNames,
        paths: &FxHashMap<String, String>,
    ) -> ModuleDeclarations {
        let graph = self.graph;
        let current = self.chunk(chunk);
        let mut declarations = ModuleDeclarations::default();

        for &dependency in &current.dependencies {
            let imports: Vec<ImportSpecifier> = current
                .imports
                .iter()
                .filter(|i| i.dependency == dependency)
                .flat_map(|i| &i.variables)
                .map(|imported| ImportSpecifier {
                    local: names.name_of(graph, imported.variable).to_string(),
                    imported: imported.imported.clone(),
                })
                .collect();
            let mut reexports = Vec::new();
            if let ChunkDependency::External(external) = dependency
                && current.star_reexports.contains(&external)
            {
                reexports.push(ReexportSpecifier {
                    imported: Name::from("*"),
                    reexported: Name::from("*"),
                });
            }
            for (exported, variable) in &current.exports {
                if let Some((source, imported)) = current.import_sources.get(variable)
                    && *source == dependency
                {
                    reexports.push(ReexportSpecifier {
                        imported: imported.clone(),
                        reexported: exported.clone(),
                    });
                }
            }
            let usage = current.usage(dependency);
            declarations.dependencies.push(DependencyDeclaration {
                id: self.dependency_id(dependency, paths),
                name: names.dependency_name(dependency).to_string(),
                is_chunk: matches!(dependency, ChunkDependency::Chunk(_)),
                imports,
                reexports,
                exports_default: usage.default,
                exports_names: usage.names,
            });
        }

        for (exported, &variable) in &current.exports {
            if current.import_sources.contains_key(&variable) {
                continue;
            }
            declarations.exports.push(ExportDeclaration {
                local: names.name_of(graph, variable).to_string(),
                exported: exported.clone(),
                hoisted: self.is_hoisted(variable),
            });
        }
        declarations
    }
}

#[cfg(test)]
#[path = "../tests/chunk.rs"]
mod tests;
