//! Reference binding pass.
//!
//! Binds every identifier occurrence (declarations included) to its
//! variable, `this` to the nearest non-arrow function, and namespace members
//! to the exported binding they name. Misuse of imports is rejected here.

use crate::graph::ModuleGraph;
use crate::module::ModuleId;
use crate::scope::ScopeId;
use crate::variables::{VariableId, VariableKind};
use rustc_hash::FxHashSet;
use shaker_ast::{ClassData, FunctionData, NodeArena, NodeIndex, NodeKind};
use shaker_common::{BuildError, Diagnostic, DiagnosticCode, Name};
use tracing::trace;

impl ModuleGraph {
    pub(crate) fn resolve_module(&mut self, module: ModuleId) -> Result<(), BuildError> {
        let locals: Vec<Name> = self.module(module).imports.keys().cloned().collect();
        for local in &locals {
            self.trace_import(module, local);
        }

        let arena = std::mem::take(&mut self.arena);
        let root = self.module(module).root;
        let scope = self.module(module).scope;
        let mut resolver = Resolver {
            graph: self,
            arena: &arena,
            module,
            imported: FxHashSet::default(),
        };
        let result = resolver.visit(root, scope);
        self.arena = arena;
        trace!(module = module.0, references = self.references.len(), "resolved references");
        result
    }
}

struct Resolver<'a> {
    graph: &'a mut ModuleGraph,
    arena: &'a NodeArena,
    module: ModuleId,
    /// Identifiers bound through the module's import table.
    imported: FxHashSet<NodeIndex>,
}

impl Resolver<'_> {
    fn error(&self, code: DiagnosticCode, args: &[&str], node: NodeIndex) -> BuildError {
        let module = self.graph.module(self.module);
        let mut diagnostic = Diagnostic::new(code, args).at(&module.id, self.arena.span(node).start);
        diagnostic.locate(&module.line_map);
        diagnostic.into()
    }

    fn warn(&self, code: DiagnosticCode, args: &[&str], node: NodeIndex) {
        let module = &self.graph.module(self.module).id;
        self.graph
            .warn(Diagnostic::new(code, args).at(module, self.arena.span(node).start));
    }

    fn scope_of(&self, idx: NodeIndex, fallback: ScopeId) -> ScopeId {
        self.graph.node_scope(idx).unwrap_or(fallback)
    }

    fn bind(&mut self, identifier: NodeIndex, name: &Name, scope: ScopeId) -> VariableId {
        if let Some((variable, owner)) = self.graph.scopes.lookup_local(scope, name) {
            self.graph.references.insert(identifier, variable);
            self.graph
                .scopes
                .mark_accessed_outside(scope, Some(owner), variable);
            return variable;
        }
        let variable = if self.graph.module(self.module).imports.contains_key(name) {
            self.imported.insert(identifier);
            self.graph.trace_import(self.module, name)
        } else {
            self.graph.global_variable(name)
        };
        self.graph.references.insert(identifier, variable);
        self.graph.scopes.mark_accessed_outside(scope, None, variable);
        variable
    }

    fn bind_this(&mut self, idx: NodeIndex, scope: ScopeId) {
        let this = self
            .graph
            .scopes
            .this_scope(scope)
            .and_then(|s| self.graph.scopes[s].function.as_ref())
            .and_then(|f| f.this_variable);
        match this {
            Some(variable) => {
                self.graph.this_bindings.insert(idx, variable);
            }
            None => {
                self.graph.top_level_this.insert(idx);
                self.warn(DiagnosticCode::ThisIsUndefined, &[], idx);
            }
        }
    }

    fn visit(&mut self, idx: NodeIndex, scope: ScopeId) -> Result<(), BuildError> {
        let arena = self.arena;
        let Some(kind) = arena.kind(idx) else {
            return Ok(());
        };
        match kind {
            NodeKind::Identifier { name } => {
                self.bind(idx, name, scope);
            }
            NodeKind::ThisExpression => self.bind_this(idx, scope),
            NodeKind::FunctionDeclaration(data) => {
                if let Some(name) = arena.identifier_name(data.id) {
                    self.bind(data.id, name, scope);
                }
                self.function(idx, data, scope, false)?;
            }
            NodeKind::FunctionExpression(data) | NodeKind::ArrowFunctionExpression(data) => {
                self.function(idx, data, scope, true)?;
            }
            NodeKind::ClassDeclaration(data) => {
                if let Some(name) = arena.identifier_name(data.id) {
                    self.bind(data.id, name, scope);
                }
                self.class(idx, data, scope, false)?;
            }
            NodeKind::ClassExpression(data) => self.class(idx, data, scope, true)?,
            NodeKind::BlockStatement { body } => {
                let block = self.scope_of(idx, scope);
                for &statement in body {
                    self.visit(statement, block)?;
                }
            }
            NodeKind::CatchClause { param, body } => {
                let catch = self.scope_of(idx, scope);
                self.visit(*param, catch)?;
                self.visit_body(*body, catch)?;
            }
            NodeKind::ForStatement { .. } => {
                let block = self.scope_of(idx, scope);
                for child in arena.children(idx) {
                    self.visit(child, block)?;
                }
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement {
                left, right, body, ..
            } => {
                let block = self.scope_of(idx, scope);
                self.visit(*left, block)?;
                self.visit(*right, block)?;
                self.visit(*body, block)?;
                self.check_assignment_target(*left)?;
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.visit(*discriminant, scope)?;
                let block = self.scope_of(idx, scope);
                for &case in cases {
                    self.visit(case, block)?;
                }
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
                ..
            } => {
                self.visit(*object, scope)?;
                if *computed {
                    self.visit(*property, scope)?;
                }
                if let Some(variable) = self.graph.resolve_namespace_member(arena, idx, self.module) {
                    self.graph.scopes.mark_accessed_outside(scope, None, variable);
                }
            }
            NodeKind::Property {
                key,
                value,
                computed,
                ..
            }
            | NodeKind::MethodDefinition {
                key,
                value,
                computed,
                ..
            } => {
                if *computed {
                    self.visit(*key, scope)?;
                }
                self.visit(*value, scope)?;
            }
            NodeKind::LabeledStatement { body, .. } => self.visit(*body, scope)?,
            NodeKind::BreakStatement { .. }
            | NodeKind::ContinueStatement { .. }
            | NodeKind::ImportDeclaration { .. }
            | NodeKind::ExportAllDeclaration { .. }
            | NodeKind::MetaProperty { .. } => {}
            NodeKind::ExportNamedDeclaration { declaration, .. } => {
                self.visit(*declaration, scope)?;
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                self.visit(*declaration, scope)?;
                self.link_default_original(*declaration);
            }
            NodeKind::CallExpression { callee, .. } => {
                for child in arena.children(idx) {
                    self.visit(child, scope)?;
                }
                self.check_call(idx, *callee)?;
            }
            NodeKind::AssignmentExpression { left, right, .. } => {
                self.visit(*left, scope)?;
                self.visit(*right, scope)?;
                self.check_assignment_target(*left)?;
            }
            NodeKind::UpdateExpression { argument, .. } => {
                self.visit(*argument, scope)?;
                self.check_assignment_target(*argument)?;
            }
            _ => {
                for child in arena.children(idx) {
                    self.visit(child, scope)?;
                }
            }
        }
        Ok(())
    }

    fn visit_body(&mut self, body: NodeIndex, scope: ScopeId) -> Result<(), BuildError> {
        match self.arena.kind(body) {
            Some(NodeKind::BlockStatement { body: statements }) => {
                for &statement in statements {
                    self.visit(statement, scope)?;
                }
                Ok(())
            }
            _ => self.visit(body, scope),
        }
    }

    fn function(
        &mut self,
        idx: NodeIndex,
        data: &FunctionData,
        outer: ScopeId,
        bind_own_id: bool,
    ) -> Result<(), BuildError> {
        let scope = self.scope_of(idx, outer);
        if bind_own_id && let Some(name) = self.arena.identifier_name(data.id) {
            self.bind(data.id, name, scope);
        }
        for &param in &data.params {
            self.visit(param, scope)?;
        }
        self.visit_body(data.body, scope)
    }

    fn class(
        &mut self,
        idx: NodeIndex,
        data: &ClassData,
        outer: ScopeId,
        bind_own_id: bool,
    ) -> Result<(), BuildError> {
        self.visit(data.super_class, outer)?;
        let scope = self.scope_of(idx, outer);
        if bind_own_id && let Some(name) = self.arena.identifier_name(data.id) {
            self.bind(data.id, name, scope);
        }
        self.visit(data.body, scope)
    }

    /// `export default name;` aliases the default export to `name`.
    fn link_default_original(&mut self, declaration: NodeIndex) {
        if !matches!(self.arena.kind(declaration), Some(NodeKind::Identifier { .. })) {
            return;
        }
        let Some(original) = self.graph.reference(declaration) else {
            return;
        };
        let Some(default) = self.graph.module(self.module).default_variable else {
            return;
        };
        if let Some(variable) = self.graph.variables.get_mut(default) {
            variable.kind = VariableKind::ExportDefault {
                original: Some(original),
                has_id: false,
            };
        }
    }

    fn check_call(&self, call: NodeIndex, callee: NodeIndex) -> Result<(), BuildError> {
        let Some(name) = self.arena.identifier_name(callee) else {
            return Ok(());
        };
        let Some(variable) = self.graph.reference(callee) else {
            return Ok(());
        };
        let variable = self.graph.variable(variable);
        if variable.is_namespace() {
            return Err(self.error(DiagnosticCode::CannotCallNamespace, &[&**name], call));
        }
        if variable.is_global() && &**name == "eval" {
            self.warn(DiagnosticCode::Eval, &[], call);
        }
        Ok(())
    }

    fn check_assignment_target(&self, target: NodeIndex) -> Result<(), BuildError> {
        match self.arena.kind(target) {
            Some(NodeKind::Identifier { name }) => {
                if self.imported.contains(&target) {
                    return Err(self.error(DiagnosticCode::IllegalReassignment, &[&**name], target));
                }
            }
            Some(NodeKind::MemberExpression { object, .. }) => {
                if self.graph.namespace_module(self.arena, *object).is_some() {
                    let name = self
                        .arena
                        .identifier_name(*object)
                        .map_or_else(|| String::from("namespace"), ToString::to_string);
                    return Err(self.error(
                        DiagnosticCode::IllegalNamespaceReassignment,
                        &[&name],
                        target,
                    ));
                }
            }
            Some(
                NodeKind::ObjectPattern { .. }
                | NodeKind::ArrayPattern { .. }
                | NodeKind::AssignmentPattern { .. }
                | NodeKind::RestElement { .. },
            ) => {
                let mut identifiers = Vec::new();
                self.arena.collect_binding_identifiers(target, &mut identifiers);
                for identifier in identifiers {
                    self.check_assignment_target(identifier)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
