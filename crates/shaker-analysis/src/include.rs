//! Inclusion: marking the nodes that must appear in the output.
//!
//! A statement is included when it has an effect, or when something
//! included needs a binding it declares. Including a binding marks its
//! declaring identifiers and their ancestors; the next pass over the
//! statement lists then includes the rest of those declarations. Passes
//! repeat until one adds nothing.

use crate::analyzer::Analyzer;
use crate::context::AnalysisContext;
use crate::entity::Entity;
use rustc_hash::FxHashMap;
use shaker_ast::{NodeIndex, NodeKind};
use shaker_binder::{ModuleId, VariableId, VariableKind};
use shaker_common::UNKNOWN_PATH;
use shaker_common::limits::MAX_INCLUSION_PASSES;
use tracing::{debug, trace, warn};

/// Outcome of [`Analyzer::run_inclusion`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InclusionStats {
    pub passes: usize,
    pub included_nodes: usize,
    pub included_variables: usize,
}

impl Analyzer<'_> {
    /// Disable tree-shaking: every statement is kept.
    pub fn include_everything(&self) {
        self.include_everything.set(true);
    }

    fn mark(&self, idx: NodeIndex) -> bool {
        let added = self.arena().get(idx).is_some_and(|node| node.include());
        if added {
            self.added.set(true);
        }
        added
    }

    /// Mark a declaring node and every ancestor up to the first one that is
    /// already included.
    fn include_declaration(&self, mut idx: NodeIndex) {
        while idx.is_some() && self.mark(idx) {
            idx = self.arena().parent(idx);
        }
    }

    /// Include a binding: its declarations, the module behind a namespace,
    /// or the original behind a default-export alias.
    pub fn include_variable(&self, id: VariableId) {
        let variable = self.variable(id);
        if !variable.include() {
            return;
        }
        self.added.set(true);
        trace!(name = %variable.name, "include variable");
        match &variable.kind {
            VariableKind::External { module } => self.graph.external(*module).mark_used(),
            VariableKind::Namespace { module } => {
                let bindings: Vec<VariableId> = self.graph.module(*module).export_bindings.values().copied().collect();
                for binding in bindings {
                    self.include_variable(binding);
                }
            }
            VariableKind::ExportDefault { .. } => {
                let original = self.graph.original_variable(id);
                if original == id {
                    for &declaration in &variable.declarations {
                        self.include_declaration(declaration);
                    }
                } else {
                    self.include_variable(original);
                }
            }
            VariableKind::Global | VariableKind::This | VariableKind::Arguments => {}
            VariableKind::Local | VariableKind::Parameter => {
                for &declaration in &variable.declarations {
                    self.include_declaration(declaration);
                }
            }
        }
    }

    /// Include every export of an entry module. Consumers may mutate what
    /// they import, so exported values are reassigned at an unknown path.
    pub fn include_entry_exports(&self, module: ModuleId) {
        let bindings: Vec<VariableId> = self.graph.module(module).export_bindings.values().copied().collect();
        debug!(module = %self.graph.module(module).id, exports = bindings.len(), "entry exports");
        for binding in bindings {
            self.include_variable(binding);
            self.reassign_path(Entity::Variable(binding), UNKNOWN_PATH);
        }
    }

    /// Include the namespace object of a module (a dynamic import target
    /// inlined into the importing chunk).
    pub fn include_namespace(&self, module: ModuleId) {
        self.include_variable(self.graph.module(module).namespace);
    }

    /// Whether a statement or list element must be kept.
    pub fn should_be_included(&self, idx: NodeIndex) -> bool {
        let Some(node) = self.arena().get(idx) else {
            return false;
        };
        if node.is_included() {
            return true;
        }
        match &node.kind {
            NodeKind::ImportDeclaration { .. } | NodeKind::ExportAllDeclaration { .. } => false,
            NodeKind::ExportNamedDeclaration { declaration, .. } => {
                declaration.is_some() && self.should_be_included(*declaration)
            }
            _ => self.include_everything.get() || self.has_effects(idx, &AnalysisContext::new()),
        }
    }

    fn include_statements(&self, statements: &[NodeIndex]) {
        for &statement in statements {
            if self.should_be_included(statement) {
                self.include_node(statement);
            }
        }
    }

    /// Fold a test for inclusion purposes; never folds with tree-shaking
    /// disabled.
    fn inclusion_test(&self, test: NodeIndex) -> Option<bool> {
        if self.include_everything.get() {
            return None;
        }
        self.known_truthiness(test, &AnalysisContext::new())
    }

    fn include_if_effectful(&self, idx: NodeIndex) {
        if self.has_effects(idx, &AnalysisContext::new()) {
            self.include_node(idx);
        }
    }

    /// `if` statements decided at bundle time, with the value their test
    /// folded to.
    #[must_use]
    pub fn folded_tests(&self) -> FxHashMap<NodeIndex, bool> {
        self.folded_tests.borrow().clone()
    }

    /// Include a node and, by default, everything below it.
    pub fn include_node(&self, idx: NodeIndex) {
        let Some(node) = self.arena().get(idx) else {
            return;
        };
        match &node.kind {
            NodeKind::ImportDeclaration { .. }
            | NodeKind::ExportSpecifier { .. }
            | NodeKind::ExportAllDeclaration { .. } => return,
            _ => {}
        }
        self.mark(idx);
        match &node.kind {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => self.include_statements(body),
            NodeKind::SwitchCase { test, consequent } => {
                self.include_node(*test);
                self.include_statements(consequent);
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                let in_for_head = matches!(
                    self.kind(node.parent),
                    Some(
                        NodeKind::ForStatement { .. }
                            | NodeKind::ForInStatement { .. }
                            | NodeKind::ForOfStatement { .. }
                    )
                );
                for &declarator in declarations {
                    if in_for_head || self.should_be_included(declarator) {
                        self.include_node(declarator);
                    }
                }
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => match self.inclusion_test(*test) {
                Some(truthy) => {
                    self.folded_tests.borrow_mut().insert(idx, truthy);
                    self.include_if_effectful(*test);
                    let branch = if truthy { *consequent } else { *alternate };
                    if self.should_be_included(branch) {
                        self.include_node(branch);
                    }
                }
                None => {
                    self.include_node(*test);
                    self.include_node(*consequent);
                    self.include_node(*alternate);
                }
            },
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => match self.inclusion_test(*test) {
                Some(truthy) => {
                    self.include_if_effectful(*test);
                    self.include_node(if truthy { *consequent } else { *alternate });
                }
                None => {
                    self.include_node(*test);
                    self.include_node(*consequent);
                    self.include_node(*alternate);
                }
            },
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let short_circuit = if self.include_everything.get() {
                    None
                } else {
                    self.logical_short_circuit(*operator, *left, &AnalysisContext::new())
                };
                match short_circuit {
                    Some(true) => self.include_node(*left),
                    Some(false) => {
                        self.include_if_effectful(*left);
                        self.include_node(*right);
                    }
                    None => {
                        self.include_node(*left);
                        self.include_node(*right);
                    }
                }
            }
            NodeKind::SequenceExpression { expressions } => {
                let last = expressions.len().saturating_sub(1);
                for (i, &expression) in expressions.iter().enumerate() {
                    if i == last || self.should_be_included(expression) {
                        self.include_node(expression);
                    }
                }
            }
            NodeKind::MemberExpression { .. } if self.namespace_member(idx).is_some() => {
                if let Some(Entity::Variable(variable)) = self.namespace_member(idx) {
                    self.include_variable(variable);
                }
            }
            NodeKind::Identifier { .. } => {
                if let Some(variable) = self.graph.reference(idx) {
                    self.include_variable(variable);
                }
            }
            _ => {
                for child in self.arena().children(idx) {
                    self.include_node(child);
                }
            }
        }
    }

    /// Repeat inclusion passes over `modules` until a pass adds nothing.
    #[tracing::instrument(level = "debug", skip_all, fields(modules = modules.len()))]
    pub fn run_inclusion(&self, modules: &[ModuleId]) -> InclusionStats {
        let mut passes = 0;
        loop {
            passes += 1;
            self.added.set(false);
            self.state_changed.set(false);
            for &module in modules {
                let root = self.graph.module(module).root;
                if let Some(NodeKind::Program { body }) = self.kind(root) {
                    self.include_statements(body);
                }
            }
            let again = self.added.get() || self.state_changed.get();
            trace!(pass = passes, again, "inclusion pass");
            if !again {
                break;
            }
            if passes >= MAX_INCLUSION_PASSES {
                warn!(passes, "inclusion did not settle");
                break;
            }
        }
        let stats = InclusionStats {
            passes,
            included_nodes: self.arena().iter().filter(|(_, node)| node.is_included()).count(),
            included_variables: self
                .graph
                .variables
                .iter()
                .filter(|(_, variable)| variable.module.is_some() && variable.is_included())
                .count(),
        };
        debug!(
            passes = stats.passes,
            nodes = stats.included_nodes,
            variables = stats.included_variables,
            "inclusion settled"
        );
        stats
    }
}
