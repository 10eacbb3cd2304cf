//! Declaration pass.
//!
//! Walks a freshly built module tree once, creating its scopes and declaring
//! every binding, and fills the module's import/export tables. Nothing is
//! resolved here: identifier references are bound later by `link`.

use crate::graph::ModuleGraph;
use crate::module::{ExportDescription, ImportDescription, Module, ModuleId, ReexportDescription};
use crate::scope::{ScopeId, ScopeKind};
use crate::variables::{Variable, VariableId, VariableKind};
use shaker_ast::{ClassData, FunctionData, NodeArena, NodeIndex, NodeKind};
use shaker_common::identifiers::{basename_without_extension, make_legal};
use shaker_common::Name;

impl ModuleGraph {
    pub(crate) fn declare_module(&mut self, module: ModuleId) {
        let arena = std::mem::take(&mut self.arena);
        let root = self.module(module).root;
        let scope = self.module(module).scope;
        let mut declarer = Declarer {
            graph: self,
            arena: &arena,
            module,
        };
        if let Some(NodeKind::Program { body }) = arena.kind(root) {
            for &statement in body {
                declarer.visit(statement, scope);
            }
        }
        self.arena = arena;
    }
}

struct Declarer<'a> {
    graph: &'a mut ModuleGraph,
    arena: &'a NodeArena,
    module: ModuleId,
}

impl Declarer<'_> {
    fn module_mut(&mut self) -> &mut Module {
        &mut self.graph.modules[self.module.0 as usize]
    }

    fn new_scope(&mut self, kind: ScopeKind, parent: ScopeId, node: NodeIndex) -> ScopeId {
        let scope = self
            .graph
            .scopes
            .alloc(kind, Some(parent), node, Some(self.module));
        self.graph.node_scopes.insert(node, scope);
        scope
    }

    /// Declare `name` in `scope`. A second declaration of the same name adds
    /// to the existing variable and counts as a reassignment.
    fn declare(
        &mut self,
        scope: ScopeId,
        name: Name,
        identifier: NodeIndex,
        init: NodeIndex,
        kind: VariableKind,
    ) -> VariableId {
        if let Some(&existing) = self.graph.scopes[scope].variables.get(&name) {
            if let Some(variable) = self.graph.variables.get_mut(existing) {
                variable.declarations.push(identifier);
            }
            self.graph.variables[existing].mark_reassigned();
            return existing;
        }
        let is_id = kind == VariableKind::Local
            && matches!(
                self.arena.kind(init),
                Some(NodeKind::FunctionDeclaration(_) | NodeKind::ClassDeclaration(_))
            )
            && self.function_or_class_id(init) == identifier;
        let mut variable = Variable::new(name.clone(), kind, scope, Some(self.module));
        variable.declarations.push(identifier);
        variable.init = init;
        variable.is_id = is_id;
        let id = self.graph.variables.alloc(variable);
        if let Some(scope) = self.graph.scopes.get_mut(scope) {
            scope.variables.insert(name, id);
        }
        id
    }

    fn function_or_class_id(&self, idx: NodeIndex) -> NodeIndex {
        self.arena.kind(idx).map_or(NodeIndex::NONE, |kind| {
            kind.function_data()
                .map(|f| f.id)
                .or_else(|| kind.class_data().map(|c| c.id))
                .unwrap_or(NodeIndex::NONE)
        })
    }

    fn declare_pattern(&mut self, scope: ScopeId, pattern: NodeIndex, init: NodeIndex, kind: VariableKind) -> Vec<VariableId> {
        let mut identifiers = Vec::new();
        self.arena.collect_binding_identifiers(pattern, &mut identifiers);
        let simple = matches!(self.arena.kind(pattern), Some(NodeKind::Identifier { .. }));
        let mut declared = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            if let Some(name) = self.arena.identifier_name(identifier) {
                let init = if simple { init } else { NodeIndex::NONE };
                declared.push(self.declare(scope, name.clone(), identifier, init, kind.clone()));
            }
        }
        declared
    }

    fn visit(&mut self, idx: NodeIndex, scope: ScopeId) {
        let arena = self.arena;
        let Some(kind) = arena.kind(idx) else {
            return;
        };
        match kind {
            NodeKind::FunctionDeclaration(data) => {
                if let Some(name) = arena.identifier_name(data.id) {
                    self.declare(scope, name.clone(), data.id, idx, VariableKind::Local);
                }
                self.function(idx, data, scope, false);
            }
            NodeKind::FunctionExpression(data) => self.function(idx, data, scope, true),
            NodeKind::ArrowFunctionExpression(data) => self.function(idx, data, scope, false),
            NodeKind::ClassDeclaration(data) => {
                if let Some(name) = arena.identifier_name(data.id) {
                    self.declare(scope, name.clone(), data.id, idx, VariableKind::Local);
                }
                self.class(idx, data, scope, false);
            }
            NodeKind::ClassExpression(data) => self.class(idx, data, scope, true),
            NodeKind::BlockStatement { body } => {
                let block = self.new_scope(ScopeKind::Block, scope, idx);
                for &statement in body {
                    self.visit(statement, block);
                }
            }
            NodeKind::CatchClause { param, body } => {
                let catch = self.new_scope(ScopeKind::Catch, scope, idx);
                self.declare_pattern(catch, *param, NodeIndex::NONE, VariableKind::Local);
                self.visit(*param, catch);
                self.visit_body(*body, catch);
            }
            NodeKind::ForStatement { .. }
            | NodeKind::ForInStatement { .. }
            | NodeKind::ForOfStatement { .. } => {
                let block = self.new_scope(ScopeKind::Block, scope, idx);
                for child in arena.children(idx) {
                    self.visit(child, block);
                }
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.visit(*discriminant, scope);
                let block = self.new_scope(ScopeKind::Block, scope, idx);
                for &case in cases {
                    self.visit(case, block);
                }
            }
            NodeKind::VariableDeclaration { kind, declarations } => {
                let target = if kind.is_block_scoped() {
                    scope
                } else {
                    self.graph.scopes.hoisting_target(scope)
                };
                for &declarator in declarations {
                    if let Some(NodeKind::VariableDeclarator { id, init }) = arena.kind(declarator) {
                        self.declare_pattern(target, *id, *init, VariableKind::Local);
                        self.visit(*id, scope);
                        self.visit(*init, scope);
                    }
                }
            }
            NodeKind::ReturnStatement { argument } => {
                if let Some(function) = self.graph.scopes.enclosing_function(scope)
                    && let Some(data) = self
                        .graph
                        .scopes
                        .get_mut(function)
                        .and_then(|s| s.function.as_mut())
                {
                    data.return_expressions.push(*argument);
                }
                self.visit(*argument, scope);
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                self.import(specifiers, *source);
            }
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => self.export_named(idx, *declaration, specifiers, *source, scope),
            NodeKind::ExportDefaultDeclaration { declaration } => {
                self.export_default(idx, *declaration, scope);
            }
            NodeKind::ExportAllDeclaration { exported, source } => {
                let Some(source) = arena.string_literal(*source).cloned() else {
                    return;
                };
                self.module_mut().add_source(&source);
                match arena.name_or_string(*exported).cloned() {
                    Some(exported) => {
                        self.module_mut().reexports.insert(
                            exported,
                            ReexportDescription {
                                source,
                                imported: Name::from("*"),
                                node: idx,
                            },
                        );
                    }
                    None => self.module_mut().export_all_sources.push(source),
                }
            }
            NodeKind::ImportExpression { source } => {
                self.module_mut().dynamic_imports.push(idx);
                self.visit(*source, scope);
            }
            _ => {
                for child in arena.children(idx) {
                    self.visit(child, scope);
                }
            }
        }
    }

    /// Statements of a block that shares the scope of its owner.
    fn visit_body(&mut self, body: NodeIndex, scope: ScopeId) {
        match self.arena.kind(body) {
            Some(NodeKind::BlockStatement { body: statements }) => {
                self.graph.node_scopes.insert(body, scope);
                for &statement in statements {
                    self.visit(statement, scope);
                }
            }
            _ => self.visit(body, scope),
        }
    }

    fn function(&mut self, idx: NodeIndex, data: &FunctionData, parent: ScopeId, named_expression: bool) {
        let scope = self.new_scope(ScopeKind::Function, parent, idx);
        if !data.is_arrow {
            let this = self.graph.variables.alloc(Variable::new(
                Name::from("this"),
                VariableKind::This,
                scope,
                Some(self.module),
            ));
            let arguments = self.graph.variables.alloc(Variable::new(
                Name::from("arguments"),
                VariableKind::Arguments,
                scope,
                Some(self.module),
            ));
            if let Some(s) = self.graph.scopes.get_mut(scope) {
                s.variables.insert(Name::from("arguments"), arguments);
                if let Some(function) = s.function.as_mut() {
                    function.this_variable = Some(this);
                }
            }
        }
        if let Some(function) = self.graph.scopes.get_mut(scope).and_then(|s| s.function.as_mut()) {
            function.is_arrow = data.is_arrow;
            function.is_async = data.is_async;
            function.is_generator = data.is_generator;
        }
        if named_expression && let Some(name) = self.arena.identifier_name(data.id) {
            self.declare(scope, name.clone(), data.id, idx, VariableKind::Local);
        }
        for &param in &data.params {
            let declared = self.declare_pattern(scope, param, NodeIndex::NONE, VariableKind::Parameter);
            if let Some(function) = self.graph.scopes.get_mut(scope).and_then(|s| s.function.as_mut()) {
                function.parameters.extend(declared);
            }
            self.visit(param, scope);
        }
        self.visit_body(data.body, scope);
    }

    fn class(&mut self, idx: NodeIndex, data: &ClassData, parent: ScopeId, named_expression: bool) {
        self.visit(data.super_class, parent);
        let scope = self.new_scope(ScopeKind::Class, parent, idx);
        if named_expression && let Some(name) = self.arena.identifier_name(data.id) {
            self.declare(scope, name.clone(), data.id, idx, VariableKind::Local);
        }
        self.visit(data.body, scope);
    }

    fn import(&mut self, specifiers: &[NodeIndex], source: NodeIndex) {
        let Some(source) = self.arena.string_literal(source).cloned() else {
            return;
        };
        self.module_mut().add_source(&source);
        for &specifier in specifiers {
            let (imported, local) = match self.arena.kind(specifier) {
                Some(NodeKind::ImportSpecifier { imported, local }) => {
                    (self.arena.name_or_string(*imported).cloned(), *local)
                }
                Some(NodeKind::ImportDefaultSpecifier { local }) => (Some(Name::from("default")), *local),
                Some(NodeKind::ImportNamespaceSpecifier { local }) => (Some(Name::from("*")), *local),
                _ => continue,
            };
            let (Some(imported), Some(local)) = (imported, self.arena.identifier_name(local).cloned()) else {
                continue;
            };
            self.module_mut().imports.insert(
                local,
                ImportDescription {
                    source: source.clone(),
                    imported,
                    node: specifier,
                },
            );
        }
    }

    fn export_named(
        &mut self,
        idx: NodeIndex,
        declaration: NodeIndex,
        specifiers: &[NodeIndex],
        source: NodeIndex,
        scope: ScopeId,
    ) {
        let arena = self.arena;
        if declaration.is_some() {
            self.visit(declaration, scope);
            let mut identifiers = Vec::new();
            match arena.kind(declaration) {
                Some(NodeKind::VariableDeclaration { declarations, .. }) => {
                    for &declarator in declarations {
                        if let Some(NodeKind::VariableDeclarator { id, .. }) = arena.kind(declarator) {
                            arena.collect_binding_identifiers(*id, &mut identifiers);
                        }
                    }
                }
                Some(kind) => {
                    if let Some(id) = kind
                        .function_data()
                        .map(|f| f.id)
                        .or_else(|| kind.class_data().map(|c| c.id))
                    {
                        identifiers.push(id);
                    }
                }
                None => {}
            }
            for identifier in identifiers {
                if let Some(name) = arena.identifier_name(identifier).cloned() {
                    self.module_mut().exports.insert(
                        name.clone(),
                        ExportDescription {
                            local_name: name,
                            node: idx,
                        },
                    );
                }
            }
            return;
        }

        let source = arena.string_literal(source).cloned();
        if let Some(source) = &source {
            self.module_mut().add_source(source);
        }
        for &specifier in specifiers {
            let Some(NodeKind::ExportSpecifier { local, exported }) = arena.kind(specifier) else {
                continue;
            };
            let (Some(local), Some(exported)) = (
                arena.name_or_string(*local).cloned(),
                arena.name_or_string(*exported).cloned(),
            ) else {
                continue;
            };
            match &source {
                Some(source) => {
                    self.module_mut().reexports.insert(
                        exported,
                        ReexportDescription {
                            source: source.clone(),
                            imported: local,
                            node: specifier,
                        },
                    );
                }
                None => {
                    self.module_mut().exports.insert(
                        exported,
                        ExportDescription {
                            local_name: local,
                            node: specifier,
                        },
                    );
                }
            }
        }
    }

    fn export_default(&mut self, idx: NodeIndex, declaration: NodeIndex, scope: ScopeId) {
        self.visit(declaration, scope);
        let named_id = match self.arena.kind(declaration) {
            Some(NodeKind::FunctionDeclaration(data)) => data.id,
            Some(NodeKind::ClassDeclaration(data)) => data.id,
            _ => NodeIndex::NONE,
        };
        let original = self
            .arena
            .identifier_name(named_id)
            .and_then(|name| self.graph.scopes[scope].variables.get(name).copied());

        let name = make_legal(basename_without_extension(&self.graph.module(self.module).id));
        let mut variable = Variable::new(
            Name::from(name.as_str()),
            VariableKind::ExportDefault {
                original,
                has_id: original.is_some(),
            },
            scope,
            Some(self.module),
        );
        variable.declarations.push(idx);
        variable.init = declaration;
        let id = self.graph.variables.alloc(variable);
        if let Some(s) = self.graph.scopes.get_mut(scope) {
            s.variables.insert(Name::from("default"), id);
        }
        let module = self.module_mut();
        module.default_variable = Some(id);
        module.exports.insert(
            Name::from("default"),
            ExportDescription {
                local_name: Name::from("default"),
                node: idx,
            },
        );
    }
}
