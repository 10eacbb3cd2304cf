//! Modules of the build graph and their import/export tables.

use crate::scope::ScopeId;
use crate::variables::VariableId;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use shaker_ast::NodeIndex;
use shaker_common::{LineMap, Name};
use std::cell::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalId(pub u32);

/// A resolved module source: part of the build, or outside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleRef {
    Internal(ModuleId),
    External(ExternalId),
}

/// One module as handed over by the parse and resolve collaborators.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    pub id: String,
    pub code: String,
    /// ESTree `Program` (acorn format).
    pub ast: serde_json::Value,
    /// Specifier → resolved module id, for every static and dynamic import.
    #[serde(default)]
    pub resolved_ids: FxHashMap<String, String>,
    /// Error reported by an upstream transform's source map, if any.
    #[serde(default)]
    pub source_map_error: Option<String>,
}

impl ModuleInput {
    #[must_use]
    pub fn new(id: impl Into<String>, code: impl Into<String>, ast: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            ast,
            resolved_ids: FxHashMap::default(),
            source_map_error: None,
        }
    }

    #[must_use]
    pub fn resolve(mut self, specifier: &str, id: &str) -> Self {
        self.resolved_ids.insert(specifier.to_string(), id.to_string());
        self
    }
}

/// `import { imported as local } from 'source'`.
#[derive(Clone, Debug)]
pub struct ImportDescription {
    pub source: Name,
    /// Imported name; `default` and `*` for default and namespace imports.
    pub imported: Name,
    pub node: NodeIndex,
}

/// `export { local as exported }` of a binding declared in this module.
#[derive(Clone, Debug)]
pub struct ExportDescription {
    pub local_name: Name,
    pub node: NodeIndex,
}

/// `export { imported as exported } from 'source'`.
#[derive(Clone, Debug)]
pub struct ReexportDescription {
    pub source: Name,
    pub imported: Name,
    pub node: NodeIndex,
}

#[derive(Debug)]
pub struct Module {
    pub id: String,
    pub code: String,
    pub root: NodeIndex,
    pub scope: ScopeId,
    pub line_map: LineMap,
    pub resolved_ids: FxHashMap<String, String>,

    /// Local name → import.
    pub imports: IndexMap<Name, ImportDescription>,
    /// Exported name → local binding.
    pub exports: IndexMap<Name, ExportDescription>,
    /// Exported name → re-exported binding of another module.
    pub reexports: IndexMap<Name, ReexportDescription>,
    /// Specifiers of `export * from '...'`.
    pub export_all_sources: Vec<Name>,
    /// Every static import/re-export specifier, in source order, deduplicated.
    pub sources: Vec<Name>,
    /// `import(...)` expressions in source order.
    pub dynamic_imports: Vec<NodeIndex>,

    /// Resolved `sources`, same order.
    pub dependencies: Vec<ModuleRef>,
    /// Resolved `dynamic_imports`; `None` for non-literal specifiers.
    pub dynamic_dependencies: Vec<Option<ModuleRef>>,
    /// Every name this module exports (own, re-exported and star-exported),
    /// with the variable it traces to.
    pub export_bindings: IndexMap<Name, VariableId>,
    /// Names reached through `export *`, with the module that owns them.
    pub star_exports: IndexMap<Name, ModuleRef>,
    pub namespace: VariableId,
    pub default_variable: Option<VariableId>,
    /// Set once any of its code is included.
    pub is_executed: Cell<bool>,
}

impl Module {
    pub(crate) fn new(id: String, code: String, root: NodeIndex, scope: ScopeId, namespace: VariableId) -> Self {
        let line_map = LineMap::build(&code);
        Self {
            id,
            code,
            root,
            scope,
            line_map,
            resolved_ids: FxHashMap::default(),
            imports: IndexMap::new(),
            exports: IndexMap::new(),
            reexports: IndexMap::new(),
            export_all_sources: Vec::new(),
            sources: Vec::new(),
            dynamic_imports: Vec::new(),
            dependencies: Vec::new(),
            dynamic_dependencies: Vec::new(),
            export_bindings: IndexMap::new(),
            star_exports: IndexMap::new(),
            namespace,
            default_variable: None,
            is_executed: Cell::new(false),
        }
    }

    pub(crate) fn add_source(&mut self, source: &Name) {
        if !self.sources.contains(source) {
            self.sources.push(source.clone());
        }
    }

    /// Exported names in declaration order: own exports, re-exports, then
    /// names reached through `export *`.
    pub fn export_names(&self) -> impl Iterator<Item = &Name> {
        self.export_bindings.keys()
    }

    /// Resolved module of a source specifier.
    #[must_use]
    pub fn dependency_for(&self, source: &str) -> Option<ModuleRef> {
        self.sources
            .iter()
            .position(|s| &**s == source)
            .and_then(|i| self.dependencies.get(i).copied())
    }
}

/// A module outside the build; its bindings are `External` variables.
#[derive(Debug)]
pub struct ExternalModule {
    pub id: String,
    /// Legal identifier derived from the id (`lodash-es` → `lodashEs`).
    pub name: Name,
    /// Imported name (`default`, `*` or a named export) → variable.
    pub variables: IndexMap<Name, VariableId>,
    pub used: Cell<bool>,
    /// Set when some module re-exports all of its names.
    pub has_star_reexport: bool,
}

impl ExternalModule {
    pub(crate) fn new(id: String, name: Name) -> Self {
        Self {
            id,
            name,
            variables: IndexMap::new(),
            used: Cell::new(false),
            has_star_reexport: false,
        }
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used.get()
    }

    pub fn mark_used(&self) {
        self.used.set(true);
    }
}
