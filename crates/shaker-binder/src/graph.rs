//! The module graph: arena, scopes, variables and module tables of a build.

use crate::module::{ExternalId, ExternalModule, Module, ModuleId, ModuleInput, ModuleRef};
use crate::namespace::MemberResolution;
use crate::scope::{Scope, ScopeArena, ScopeId, ScopeKind};
use crate::variables::{Variable, VariableArena, VariableId, VariableKind};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use shaker_ast::{NodeArena, NodeIndex, build_program};
use shaker_common::identifiers::{basename_without_extension, make_legal};
use shaker_common::limits::MAX_REEXPORT_DEPTH;
use shaker_common::{BuildError, Diagnostic, DiagnosticCode, DiagnosticSink, Name};
use tracing::{debug, trace};

#[derive(Debug)]
pub struct ModuleGraph {
    pub arena: NodeArena,
    pub scopes: ScopeArena,
    pub variables: VariableArena,
    pub modules: Vec<Module>,
    pub externals: Vec<ExternalModule>,
    pub global_scope: ScopeId,
    pub diagnostics: DiagnosticSink,

    module_ids: FxHashMap<String, ModuleId>,
    external_ids: FxHashMap<String, ExternalId>,
    /// Scope-introducing node → its scope.
    pub(crate) node_scopes: FxHashMap<NodeIndex, ScopeId>,
    /// Identifier → the variable it binds to (declarations and references).
    pub(crate) references: FxHashMap<NodeIndex, VariableId>,
    /// `this` expression → the `this` variable of its function.
    pub(crate) this_bindings: FxHashMap<NodeIndex, VariableId>,
    /// `this` at module top level, rendered as `undefined`.
    pub(crate) top_level_this: FxHashSet<NodeIndex>,
    /// Member expressions resolved statically through a namespace.
    pub(crate) member_resolutions: FxHashMap<NodeIndex, MemberResolution>,
    /// Cached import bindings, keyed by importing module and local name.
    pub(crate) import_bindings: FxHashMap<(ModuleId, Name), VariableId>,
    undefined: VariableId,
    linked: bool,
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleGraph {
    #[must_use]
    pub fn new() -> Self {
        let mut scopes = ScopeArena::new();
        let global_scope = scopes.alloc(ScopeKind::Global, None, NodeIndex::NONE, None);
        let mut variables = VariableArena::new();
        let undefined = variables.alloc(Variable::new(
            Name::from("undefined"),
            VariableKind::Global,
            global_scope,
            None,
        ));
        if let Some(scope) = scopes.get_mut(global_scope) {
            scope.variables.insert(Name::from("undefined"), undefined);
        }
        Self {
            arena: NodeArena::new(),
            scopes,
            variables,
            modules: Vec::new(),
            externals: Vec::new(),
            global_scope,
            diagnostics: DiagnosticSink::new(),
            module_ids: FxHashMap::default(),
            external_ids: FxHashMap::default(),
            node_scopes: FxHashMap::default(),
            references: FxHashMap::default(),
            this_bindings: FxHashMap::default(),
            top_level_this: FxHashSet::default(),
            member_resolutions: FxHashMap::default(),
            import_bindings: FxHashMap::default(),
            undefined,
            linked: false,
        }
    }

    /// Build a module's tree and declare its bindings.
    #[tracing::instrument(level = "debug", skip(self, input), fields(id = %input.id))]
    pub fn add_module(&mut self, input: ModuleInput) -> Result<ModuleId, BuildError> {
        if let Some(reason) = &input.source_map_error {
            return Err(Diagnostic::new(DiagnosticCode::SourcemapBroken, &[input.id.as_str(), reason.as_str()])
                .in_module(&input.id)
                .into());
        }
        if self.module_ids.contains_key(&input.id) {
            return Err(Diagnostic::new(
                DiagnosticCode::InvalidOption,
                &[format!("Duplicate module id '{}'", input.id).as_str()],
            )
            .into());
        }

        let module_id = ModuleId(self.modules.len() as u32);
        let root = build_program(&mut self.arena, &input.ast, &input.code, module_id.0).map_err(
            |err| {
                BuildError::from(
                    Diagnostic::new(DiagnosticCode::ParseError, &[input.id.as_str(), err.to_string().as_str()])
                        .in_module(&input.id),
                )
            },
        )?;

        let scope = self
            .scopes
            .alloc(ScopeKind::Module, Some(self.global_scope), root, Some(module_id));
        let namespace_name = Name::from(make_legal(basename_without_extension(&input.id)).as_str());
        let namespace = self.variables.alloc(Variable::new(
            namespace_name,
            VariableKind::Namespace { module: module_id },
            scope,
            Some(module_id),
        ));

        let mut module = Module::new(input.id.clone(), input.code, root, scope, namespace);
        module.resolved_ids = input.resolved_ids;
        self.module_ids.insert(input.id, module_id);
        self.node_scopes.insert(root, scope);
        self.modules.push(module);

        self.declare_module(module_id);
        debug!(module = module_id.0, nodes = self.arena.len(), "declared module");
        Ok(module_id)
    }

    /// Resolve sources, trace exports and bind every identifier.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn link(&mut self) -> Result<(), BuildError> {
        if self.linked {
            return Ok(());
        }
        for index in 0..self.modules.len() {
            self.resolve_sources(ModuleId(index as u32));
        }
        let mut computed = FxHashSet::default();
        for index in 0..self.modules.len() {
            self.compute_star_exports(ModuleId(index as u32), &mut computed, &mut Vec::new());
        }
        for index in 0..self.modules.len() {
            self.compute_export_bindings(ModuleId(index as u32));
        }
        for index in 0..self.modules.len() {
            self.resolve_module(ModuleId(index as u32))?;
        }
        self.linked = true;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }

    #[must_use]
    pub fn external(&self, id: ExternalId) -> &ExternalModule {
        &self.externals[id.0 as usize]
    }

    #[must_use]
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        (0..self.modules.len()).map(|i| ModuleId(i as u32))
    }

    #[must_use]
    pub fn module_by_id(&self, id: &str) -> Option<ModuleId> {
        self.module_ids.get(id).copied()
    }

    #[must_use]
    pub fn external_by_id(&self, id: &str) -> Option<ExternalId> {
        self.external_ids.get(id).copied()
    }

    /// The module a node belongs to.
    #[must_use]
    pub fn module_of_node(&self, idx: NodeIndex) -> Option<ModuleId> {
        self.arena.get(idx).map(|node| ModuleId(node.file))
    }

    #[must_use]
    pub fn reference(&self, identifier: NodeIndex) -> Option<VariableId> {
        self.references.get(&identifier).copied()
    }

    #[must_use]
    pub fn this_binding(&self, this_expression: NodeIndex) -> Option<VariableId> {
        self.this_bindings.get(&this_expression).copied()
    }

    #[must_use]
    pub fn is_top_level_this(&self, this_expression: NodeIndex) -> bool {
        self.top_level_this.contains(&this_expression)
    }

    #[must_use]
    pub fn member_resolution(&self, member: NodeIndex) -> Option<MemberResolution> {
        self.member_resolutions.get(&member).copied()
    }

    /// The scope a scope-introducing node (program, function, block, ...) owns.
    #[must_use]
    pub fn node_scope(&self, idx: NodeIndex) -> Option<ScopeId> {
        self.node_scopes.get(&idx).copied()
    }

    /// The global `undefined`, substituted for unresolvable bindings.
    #[must_use]
    pub const fn undefined_variable(&self) -> VariableId {
        self.undefined
    }

    /// The variable an export name of `module` traces to.
    #[must_use]
    pub fn export_binding(&self, module: ModuleId, name: &str) -> Option<VariableId> {
        self.module(module).export_bindings.get(name).copied()
    }

    /// Follow default-export aliases to the binding that is actually rendered.
    #[must_use]
    pub fn original_variable(&self, mut id: VariableId) -> VariableId {
        for _ in 0..MAX_REEXPORT_DEPTH {
            match self.variable(id).kind {
                VariableKind::ExportDefault {
                    original: Some(original),
                    has_id,
                } if has_id || !self.variable(original).is_reassigned() => id = original,
                _ => break,
            }
        }
        id
    }

    /// Whether a default-export binding is only an alias of another binding.
    #[must_use]
    pub fn references_original(&self, id: VariableId) -> bool {
        self.original_variable(id) != id
    }

    pub fn warn(&self, diagnostic: Diagnostic) {
        trace!(code = %diagnostic.code, "warning");
        self.diagnostics.push(diagnostic);
    }

    // =========================================================================
    // Variable factories
    // =========================================================================

    /// The global variable for a free name, created on first use.
    pub(crate) fn global_variable(&mut self, name: &Name) -> VariableId {
        if let Some(&existing) = self.scopes[self.global_scope].variables.get(name) {
            return existing;
        }
        let id = self.variables.alloc(Variable::new(
            name.clone(),
            VariableKind::Global,
            self.global_scope,
            None,
        ));
        if let Some(scope) = self.scopes.get_mut(self.global_scope) {
            scope.variables.insert(name.clone(), id);
        }
        id
    }

    pub(crate) fn external_variable(&mut self, external: ExternalId, name: &Name) -> VariableId {
        if let Some(&existing) = self.externals[external.0 as usize].variables.get(name) {
            return existing;
        }
        let display = if &**name == "*" {
            self.externals[external.0 as usize].name.clone()
        } else {
            name.clone()
        };
        let id = self.variables.alloc(Variable::new(
            display,
            VariableKind::External { module: external },
            self.global_scope,
            None,
        ));
        self.externals[external.0 as usize]
            .variables
            .insert(name.clone(), id);
        id
    }

    fn external_module(&mut self, id: &str) -> ExternalId {
        if let Some(&existing) = self.external_ids.get(id) {
            return existing;
        }
        let external = ExternalId(self.externals.len() as u32);
        let name = Name::from(make_legal(basename_without_extension(id)).as_str());
        self.externals.push(ExternalModule::new(id.to_string(), name));
        self.external_ids.insert(id.to_string(), external);
        external
    }

    // =========================================================================
    // Linking
    // =========================================================================

    fn resolve_specifier(&mut self, module: ModuleId, specifier: &str, pos: u32) -> ModuleRef {
        let resolved = self.module(module).resolved_ids.get(specifier).cloned();
        let target = match resolved {
            Some(id) => id,
            None => {
                if specifier.starts_with("./") || specifier.starts_with("../") {
                    let importer = self.module(module).id.clone();
                    self.warn(
                        Diagnostic::new(DiagnosticCode::UnresolvedImport, &[specifier, importer.as_str()])
                            .at(&importer, pos),
                    );
                }
                specifier.to_string()
            }
        };
        match self.module_by_id(&target) {
            Some(internal) => ModuleRef::Internal(internal),
            None => ModuleRef::External(self.external_module(&target)),
        }
    }

    fn source_position(&self, module: ModuleId, source: &str) -> u32 {
        let module = self.module(module);
        module
            .imports
            .values()
            .map(|i| (&i.source, i.node))
            .chain(module.reexports.values().map(|r| (&r.source, r.node)))
            .find(|(s, _)| &***s == source)
            .map_or(0, |(_, node)| self.arena.span(node).start)
    }

    fn resolve_sources(&mut self, module: ModuleId) {
        let sources = self.module(module).sources.clone();
        let mut dependencies = Vec::with_capacity(sources.len());
        for source in &sources {
            let pos = self.source_position(module, source);
            dependencies.push(self.resolve_specifier(module, source, pos));
        }

        let dynamic_imports = self.module(module).dynamic_imports.clone();
        let mut dynamic_dependencies = Vec::with_capacity(dynamic_imports.len());
        for import in dynamic_imports {
            let source = match self.arena.kind(import) {
                Some(shaker_ast::NodeKind::ImportExpression { source }) => *source,
                _ => NodeIndex::NONE,
            };
            let resolved = self
                .arena
                .string_literal(source)
                .cloned()
                .map(|specifier| (specifier, self.arena.span(import).start));
            dynamic_dependencies.push(
                resolved.map(|(specifier, pos)| self.resolve_specifier(module, &specifier, pos)),
            );
        }

        let entry = &mut self.modules[module.0 as usize];
        entry.dependencies = dependencies;
        entry.dynamic_dependencies = dynamic_dependencies;
    }

    /// Own export names plus re-exported names of `module`, excluding stars.
    fn direct_export_names(&self, module: ModuleId) -> Vec<Name> {
        let module = self.module(module);
        module
            .exports
            .keys()
            .chain(module.reexports.keys())
            .cloned()
            .collect()
    }

    fn compute_star_exports(
        &mut self,
        module: ModuleId,
        computed: &mut FxHashSet<ModuleId>,
        stack: &mut Vec<ModuleId>,
    ) {
        if computed.contains(&module) || stack.contains(&module) {
            return;
        }
        stack.push(module);
        let sources = self.module(module).export_all_sources.clone();
        let own: FxHashSet<Name> = self.direct_export_names(module).into_iter().collect();
        let mut star_exports: IndexMap<Name, ModuleRef> = IndexMap::new();
        for source in &sources {
            let Some(dependency) = self.module(module).dependency_for(source) else {
                continue;
            };
            match dependency {
                ModuleRef::Internal(target) => {
                    self.compute_star_exports(target, computed, stack);
                    let mut names = self.direct_export_names(target);
                    names.extend(self.module(target).star_exports.keys().cloned());
                    for name in names {
                        if &*name == "default" || own.contains(&name) {
                            continue;
                        }
                        match star_exports.get(&name) {
                            Some(&existing) if existing != dependency => {
                                let existing_id = self.ref_id(existing);
                                let module_id = self.module(module).id.clone();
                                let target_id = self.module(target).id.clone();
                                self.warn(
                                    Diagnostic::new(
                                        DiagnosticCode::NamespaceConflict,
                                        &[module_id.as_str(), &*name, existing_id.as_str(), target_id.as_str()],
                                    )
                                    .in_module(&module_id),
                                );
                            }
                            Some(_) => {}
                            None => {
                                star_exports.insert(name, dependency);
                            }
                        }
                    }
                }
                ModuleRef::External(external) => {
                    self.externals[external.0 as usize].has_star_reexport = true;
                    self.externals[external.0 as usize].mark_used();
                }
            }
        }
        stack.pop();
        computed.insert(module);
        self.modules[module.0 as usize].star_exports = star_exports;
    }

    /// Display id of a resolved module reference.
    #[must_use]
    pub fn ref_id(&self, module: ModuleRef) -> String {
        match module {
            ModuleRef::Internal(id) => self.module(id).id.clone(),
            ModuleRef::External(id) => self.external(id).id.clone(),
        }
    }

    fn compute_export_bindings(&mut self, module: ModuleId) {
        let mut names = self.direct_export_names(module);
        names.extend(self.module(module).star_exports.keys().cloned());
        let mut bindings = IndexMap::new();
        for name in names {
            let mut visited = FxHashSet::default();
            if let Some(variable) = self.trace_export(module, &name, &mut visited) {
                bindings.insert(name, variable);
            }
        }
        trace!(module = module.0, exports = bindings.len(), "traced exports");
        self.modules[module.0 as usize].export_bindings = bindings;
    }

    /// Trace an export name of `module` to the variable that provides it,
    /// following re-exports and `export *`.
    pub(crate) fn trace_export(
        &mut self,
        module: ModuleId,
        name: &Name,
        visited: &mut FxHashSet<(ModuleId, Name)>,
    ) -> Option<VariableId> {
        if visited.len() > MAX_REEXPORT_DEPTH || !visited.insert((module, name.clone())) {
            return None;
        }
        if &**name == "*" {
            return Some(self.module(module).namespace);
        }

        if let Some(export) = self.module(module).exports.get(name) {
            let local = export.local_name.clone();
            return Some(self.trace_local(module, &local));
        }

        if let Some(reexport) = self.module(module).reexports.get(name).cloned() {
            let dependency = self.module(module).dependency_for(&reexport.source)?;
            return match dependency {
                ModuleRef::Internal(target) => {
                    match self.trace_export(target, &reexport.imported, visited) {
                        Some(variable) => Some(variable),
                        None => {
                            self.report_missing_export(module, target, &reexport.imported, reexport.node);
                            Some(self.undefined)
                        }
                    }
                }
                ModuleRef::External(external) => {
                    Some(self.external_variable(external, &reexport.imported))
                }
            };
        }

        if &**name == "default" {
            return None;
        }

        let sources = self.module(module).export_all_sources.clone();
        for source in sources {
            if let Some(ModuleRef::Internal(target)) = self.module(module).dependency_for(&source)
                && let Some(variable) = self.trace_export(target, name, visited)
            {
                return Some(variable);
            }
        }
        None
    }

    /// Resolve a name declared in or imported into the top scope of `module`.
    fn trace_local(&mut self, module: ModuleId, local: &Name) -> VariableId {
        let scope = self.module(module).scope;
        if let Some(&variable) = self.scopes[scope].variables.get(local) {
            return variable;
        }
        if self.module(module).imports.contains_key(local) {
            return self.trace_import(module, local);
        }
        self.global_variable(local)
    }

    /// Resolve an imported local name of `module` to the exporting variable.
    pub(crate) fn trace_import(&mut self, module: ModuleId, local: &Name) -> VariableId {
        let key = (module, local.clone());
        if let Some(&cached) = self.import_bindings.get(&key) {
            return cached;
        }
        let Some(import) = self.module(module).imports.get(local).cloned() else {
            return self.undefined;
        };
        let variable = match self.module(module).dependency_for(&import.source) {
            Some(ModuleRef::Internal(target)) => {
                let mut visited = FxHashSet::default();
                match self.trace_export(target, &import.imported, &mut visited) {
                    Some(variable) => variable,
                    None => {
                        self.report_missing_export(module, target, &import.imported, import.node);
                        self.undefined
                    }
                }
            }
            Some(ModuleRef::External(external)) => self.external_variable(external, &import.imported),
            None => self.undefined,
        };
        self.import_bindings.insert(key, variable);
        variable
    }

    fn report_missing_export(&self, importer: ModuleId, exporter: ModuleId, name: &str, node: NodeIndex) {
        let importer_id = &self.module(importer).id;
        let exporter_id = &self.module(exporter).id;
        self.warn(
            Diagnostic::new(DiagnosticCode::MissingExport, &[name, exporter_id.as_str()])
                .at(importer_id, self.arena.span(node).start),
        );
    }
}
