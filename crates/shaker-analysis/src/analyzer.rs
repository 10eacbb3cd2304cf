//! The analyzer: shared state behind every query family.
//!
//! The query methods themselves are split across the sibling modules
//! (`effects`, `paths`, `literals`, `returns`, `reassign`, `include`), each
//! adding an `impl Analyzer` block.

use crate::context::AnalysisContext;
use crate::entity::Entity;
use crate::returns::ReturnSummary;
use rustc_hash::{FxHashMap, FxHashSet};
use shaker_ast::{NodeArena, NodeIndex, NodeKind};
use shaker_binder::{MemberResolution, ModuleGraph, ScopeId, Variable, VariableId, VariableKind};
use shaker_common::{Name, PathKey, TreeshakeOptions, UNKNOWN_PATH};
use std::cell::{Cell, RefCell};
use tracing::debug;

/// Object literal keys known to have been overwritten somewhere.
#[derive(Debug, Default)]
pub(crate) struct ObjectDeopt {
    pub(crate) all: bool,
    pub(crate) keys: FxHashSet<Name>,
}

pub struct Analyzer<'g> {
    pub(crate) graph: &'g ModuleGraph,
    pub(crate) options: TreeshakeOptions,
    /// Return summary of every function scope.
    pub(crate) returns: FxHashMap<ScopeId, ReturnSummary>,
    pub(crate) objects: RefCell<FxHashMap<NodeIndex, ObjectDeopt>>,
    /// Functions whose `prototype` has been replaced.
    pub(crate) prototypes: RefCell<FxHashSet<NodeIndex>>,
    /// Set whenever a reassignment changes what earlier queries answered.
    pub(crate) state_changed: Cell<bool>,
    /// Set whenever a node or variable is newly included.
    pub(crate) added: Cell<bool>,
    /// Tree-shaking disabled: every statement is kept.
    pub(crate) include_everything: Cell<bool>,
    /// Truthiness of the test of every `if` statement whose dead branch
    /// was dropped.
    pub(crate) folded_tests: RefCell<FxHashMap<NodeIndex, bool>>,
}

impl<'g> Analyzer<'g> {
    /// Build the analyzer for a linked graph and record every reassignment
    /// visible from the syntax alone.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(graph: &'g ModuleGraph, options: TreeshakeOptions) -> Self {
        let mut analyzer = Self {
            graph,
            options,
            returns: FxHashMap::default(),
            objects: RefCell::new(FxHashMap::default()),
            prototypes: RefCell::new(FxHashSet::default()),
            state_changed: Cell::new(false),
            added: Cell::new(false),
            include_everything: Cell::new(false),
            folded_tests: RefCell::new(FxHashMap::default()),
        };
        analyzer.returns = analyzer.summarize_returns();
        analyzer.apply_binding_reassignments();
        analyzer.state_changed.set(false);
        debug!(
            functions = analyzer.returns.len(),
            deopted_objects = analyzer.objects.borrow().len(),
            "analyzer ready"
        );
        analyzer
    }

    #[must_use]
    pub const fn graph(&self) -> &'g ModuleGraph {
        self.graph
    }

    #[must_use]
    pub const fn options(&self) -> &TreeshakeOptions {
        &self.options
    }

    #[inline]
    pub(crate) fn arena(&self) -> &'g NodeArena {
        &self.graph.arena
    }

    #[inline]
    pub(crate) fn kind(&self, idx: NodeIndex) -> Option<&'g NodeKind> {
        self.graph.arena.kind(idx)
    }

    #[inline]
    pub(crate) fn variable(&self, id: VariableId) -> &'g Variable {
        self.graph.variable(id)
    }

    // =========================================================================
    // Binding-time reassignments
    // =========================================================================

    /// Every write the syntax shows: assignment and update targets, `delete`
    /// operands, `for-in`/`for-of` heads, and values that escape into calls.
    fn apply_binding_reassignments(&self) {
        for (_, node) in self.arena().iter() {
            match &node.kind {
                NodeKind::AssignmentExpression { left, right, .. } => {
                    self.reassign_target(*left);
                    self.reassign_path(Entity::Node(*right), UNKNOWN_PATH);
                }
                NodeKind::UpdateExpression { argument, .. } => self.reassign_target(*argument),
                NodeKind::UnaryExpression {
                    operator: shaker_ast::UnaryOperator::Delete,
                    argument,
                } => self.reassign_target(*argument),
                NodeKind::ForInStatement { left, .. } | NodeKind::ForOfStatement { left, .. } => {
                    if !matches!(self.kind(*left), Some(NodeKind::VariableDeclaration { .. })) {
                        self.reassign_target(*left);
                    }
                }
                NodeKind::CallExpression {
                    callee, arguments, ..
                }
                | NodeKind::NewExpression { callee, arguments } => {
                    for &argument in arguments {
                        let value = match self.kind(argument) {
                            Some(NodeKind::SpreadElement { argument }) => *argument,
                            _ => argument,
                        };
                        self.reassign_path(Entity::Node(value), UNKNOWN_PATH);
                    }
                    if let Some(NodeKind::MemberExpression { object, .. }) = self.kind(*callee)
                        && self.graph.member_resolution(*callee).is_none()
                    {
                        self.reassign_path(Entity::Node(*object), UNKNOWN_PATH);
                    }
                }
                NodeKind::TaggedTemplateExpression { quasi, .. } => {
                    if let Some(NodeKind::TemplateLiteral { expressions, .. }) = self.kind(*quasi) {
                        for &expression in expressions {
                            self.reassign_path(Entity::Node(expression), UNKNOWN_PATH);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Reassign the binding or member written by an assignment target, which
    /// may be a destructuring pattern.
    fn reassign_target(&self, target: NodeIndex) {
        match self.kind(target) {
            Some(
                NodeKind::ObjectPattern { .. }
                | NodeKind::ArrayPattern { .. }
                | NodeKind::AssignmentPattern { .. }
                | NodeKind::RestElement { .. },
            ) => {
                let mut identifiers = Vec::new();
                self.arena().collect_binding_identifiers(target, &mut identifiers);
                for identifier in identifiers {
                    self.reassign_path(Entity::Node(identifier), &[]);
                }
                self.reassign_pattern_members(target);
            }
            _ => self.reassign_path(Entity::Node(target), &[]),
        }
    }

    /// Member expressions nested in a pattern (`[a.b] = list`).
    fn reassign_pattern_members(&self, pattern: NodeIndex) {
        for child in self.arena().children(pattern) {
            match self.kind(child) {
                Some(NodeKind::MemberExpression { .. }) => self.reassign_path(Entity::Node(child), &[]),
                Some(
                    NodeKind::ObjectPattern { .. }
                    | NodeKind::ArrayPattern { .. }
                    | NodeKind::AssignmentPattern { .. }
                    | NodeKind::RestElement { .. }
                    | NodeKind::Property { .. },
                ) => self.reassign_pattern_members(child),
                _ => {}
            }
        }
    }

    // =========================================================================
    // Value resolution
    // =========================================================================

    /// The variable an identifier or `this` expression refers to.
    pub(crate) fn binding_of(&self, idx: NodeIndex) -> Option<VariableId> {
        match self.kind(idx)? {
            NodeKind::Identifier { .. } => self.graph.reference(idx),
            NodeKind::ThisExpression => self.graph.this_binding(idx),
            _ => None,
        }
    }

    /// What a variable holds, as far as the analysis can tell without
    /// following it into a specific query.
    pub(crate) fn variable_value(&self, id: VariableId, ctx: &AnalysisContext) -> Entity {
        if let Some(init) = ctx.replaced_init(id) {
            return init;
        }
        let variable = self.variable(id);
        match &variable.kind {
            VariableKind::ExportDefault { .. } => {
                let original = self.graph.original_variable(id);
                if original != id {
                    return self.variable_value(original, ctx);
                }
                if variable.is_reassigned() || variable.init.is_none() {
                    Entity::Unknown
                } else {
                    Entity::Node(variable.init)
                }
            }
            VariableKind::Local => {
                if variable.is_reassigned() || variable.init.is_none() {
                    Entity::Unknown
                } else {
                    Entity::Node(variable.init)
                }
            }
            _ => Entity::Unknown,
        }
    }

    /// What a statically resolved namespace member (`ns.name`) denotes.
    pub(crate) fn namespace_member(&self, member: NodeIndex) -> Option<Entity> {
        match self.graph.member_resolution(member)? {
            MemberResolution::Variable(variable) => Some(Entity::Variable(variable)),
            MemberResolution::Missing => Some(Entity::Undefined),
        }
    }

    /// The static key a member expression reads, folding computed keys.
    pub(crate) fn member_key(&self, member: NodeIndex, ctx: &AnalysisContext) -> PathKey {
        if let Some(name) = self.arena().member_key(member) {
            return PathKey::Name(name);
        }
        match self.kind(member) {
            Some(NodeKind::MemberExpression {
                property,
                computed: true,
                ..
            }) => self
                .literal_at(Entity::Node(*property), &[], ctx)
                .map_or(PathKey::Unknown, |value| PathKey::Name(value.to_js_string())),
            _ => PathKey::Unknown,
        }
    }

    /// The static key of an object property or class member.
    pub(crate) fn property_key(&self, key: NodeIndex, computed: bool) -> Option<Name> {
        self.arena().static_key(key, computed)
    }

    /// Truthiness of a test expression if it folds.
    pub(crate) fn known_truthiness(&self, test: NodeIndex, ctx: &AnalysisContext) -> Option<bool> {
        self.literal_at(Entity::Node(test), &[], ctx)
            .map(|value| value.is_truthy())
    }

    /// For a logical expression with a foldable left side: `Some(true)` when
    /// the left operand is the result, `Some(false)` when the right is.
    pub(crate) fn logical_short_circuit(
        &self,
        operator: shaker_ast::LogicalOperator,
        left: NodeIndex,
        ctx: &AnalysisContext,
    ) -> Option<bool> {
        let value = self.literal_at(Entity::Node(left), &[], ctx)?;
        Some(match operator {
            shaker_ast::LogicalOperator::Or => value.is_truthy(),
            shaker_ast::LogicalOperator::And => !value.is_truthy(),
            shaker_ast::LogicalOperator::Nullish => !value.is_nullish(),
        })
    }

    /// The scope owned by a function node.
    pub(crate) fn function_scope(&self, function: NodeIndex) -> Option<ScopeId> {
        self.graph.node_scope(function)
    }

    /// Record that analysis state changed; an inclusion pass in progress
    /// must be followed by another.
    pub(crate) fn mark_changed(&self) {
        self.state_changed.set(true);
    }
}
