//! Effects of touching a member reached by a property path: reading it,
//! writing it, or calling it.

use crate::analyzer::Analyzer;
use crate::context::{AnalysisContext, CallOptions, VisitKind};
use crate::entity::{Entity, PrimitiveType};
use crate::globals;
use crate::members::{self, MemberTable};
use shaker_ast::{AssignmentOperator, LiteralValue, MethodKind, NodeIndex, NodeKind, PropertyKind};
use shaker_binder::VariableKind;
use shaker_common::PathKey;
use shaker_common::paths::{exceeds_depth, prepend};

/// What reading one key of an object literal yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropertyRead {
    Value(NodeIndex),
    /// A getter; the node is the getter function.
    Accessor(NodeIndex),
    /// Not an own property.
    Missing,
    /// Unknown key, spread, or a property overwritten elsewhere.
    Unknown,
}

/// What writing one key of an object literal runs into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropertyWrite {
    Value,
    Setter(NodeIndex),
    Missing,
    Unknown,
}

fn primitive_table(primitive: PrimitiveType) -> &'static MemberTable {
    match primitive {
        PrimitiveType::String => &members::STRING_MEMBERS,
        PrimitiveType::Number => &members::NUMBER_MEMBERS,
        PrimitiveType::Boolean => &members::BOOLEAN_MEMBERS,
    }
}

fn literal_table(value: &LiteralValue) -> Option<&'static MemberTable> {
    match value {
        LiteralValue::String(_) => Some(&members::STRING_MEMBERS),
        LiteralValue::Number(_) => Some(&members::NUMBER_MEMBERS),
        LiteralValue::Boolean(_) => Some(&members::BOOLEAN_MEMBERS),
        _ => None,
    }
}

impl Analyzer<'_> {
    // =========================================================================
    // Object literals
    // =========================================================================

    fn is_deopted(&self, object: NodeIndex, key: &str) -> bool {
        self.objects
            .borrow()
            .get(&object)
            .is_some_and(|deopt| deopt.all || deopt.keys.contains(key))
    }

    /// Properties of an object literal, last first (later keys win).
    fn properties_rev(&self, object: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let properties: &[NodeIndex] = match self.kind(object) {
            Some(NodeKind::ObjectExpression { properties }) => properties.as_slice(),
            _ => &[],
        };
        properties.iter().rev().copied()
    }

    pub(crate) fn has_accessors(&self, object: NodeIndex) -> bool {
        self.properties_rev(object).any(|property| {
            matches!(
                self.kind(property),
                Some(NodeKind::Property {
                    kind: PropertyKind::Get | PropertyKind::Set,
                    ..
                })
            )
        })
    }

    pub(crate) fn object_read(&self, object: NodeIndex, key: &PathKey) -> PropertyRead {
        let PathKey::Name(name) = key else {
            return PropertyRead::Unknown;
        };
        if !matches!(self.kind(object), Some(NodeKind::ObjectExpression { .. })) || self.is_deopted(object, name) {
            return PropertyRead::Unknown;
        }
        let mut setter_seen = false;
        for property in self.properties_rev(object) {
            match self.kind(property) {
                Some(NodeKind::Property {
                    key,
                    value,
                    kind,
                    computed,
                    ..
                }) => match self.property_key(*key, *computed) {
                    Some(candidate) if candidate == *name => match kind {
                        PropertyKind::Get => return PropertyRead::Accessor(*value),
                        PropertyKind::Set => setter_seen = true,
                        PropertyKind::Init if setter_seen => return PropertyRead::Missing,
                        PropertyKind::Init => return PropertyRead::Value(*value),
                    },
                    Some(_) => {}
                    None => return PropertyRead::Unknown,
                },
                _ => return PropertyRead::Unknown,
            }
        }
        PropertyRead::Missing
    }

    pub(crate) fn object_write(&self, object: NodeIndex, key: &PathKey) -> PropertyWrite {
        let PathKey::Name(name) = key else {
            return PropertyWrite::Unknown;
        };
        if !matches!(self.kind(object), Some(NodeKind::ObjectExpression { .. })) || self.is_deopted(object, name) {
            return PropertyWrite::Unknown;
        }
        let mut getter_seen = false;
        for property in self.properties_rev(object) {
            match self.kind(property) {
                Some(NodeKind::Property {
                    key,
                    value,
                    kind,
                    computed,
                    ..
                }) => match self.property_key(*key, *computed) {
                    Some(candidate) if candidate == *name => match kind {
                        PropertyKind::Set => return PropertyWrite::Setter(*value),
                        PropertyKind::Get => getter_seen = true,
                        PropertyKind::Init if getter_seen => return PropertyWrite::Unknown,
                        PropertyKind::Init => return PropertyWrite::Value,
                    },
                    Some(_) => {}
                    None => return PropertyWrite::Unknown,
                },
                _ => return PropertyWrite::Unknown,
            }
        }
        if getter_seen {
            // A getter without a setter throws on write in strict code.
            PropertyWrite::Unknown
        } else {
            PropertyWrite::Missing
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Whether reading the member at `path` of `entity` may have an effect.
    pub fn accessed_at(&self, entity: Entity, path: &[PathKey], ctx: &AnalysisContext) -> bool {
        if path.is_empty() {
            return false;
        }
        if exceeds_depth(path) {
            return true;
        }
        match entity {
            Entity::Unknown | Entity::Undefined => true,
            Entity::UnknownObject | Entity::Primitive(_) => path.len() > 1,
            Entity::Variable(id) => {
                let variable = self.variable(id);
                match variable.kind {
                    VariableKind::Global => {
                        variable.is_reassigned() || !globals::is_known_access(&variable.name, path)
                    }
                    VariableKind::External { .. } => true,
                    VariableKind::Namespace { .. } | VariableKind::Arguments => path.len() > 1,
                    _ => {
                        if ctx.has_visited(VisitKind::Access, entity, path, NodeIndex::NONE) {
                            return true;
                        }
                        let ctx = &ctx.with_visited(VisitKind::Access, entity, path, NodeIndex::NONE);
                        self.accessed_at(self.variable_value(id, ctx), path, ctx)
                    }
                }
            }
            Entity::Node(idx) => self.node_accessed_at(idx, path, ctx),
        }
    }

    fn node_accessed_at(&self, idx: NodeIndex, path: &[PathKey], ctx: &AnalysisContext) -> bool {
        let Some(kind) = self.kind(idx) else {
            return true;
        };
        match kind {
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => {
                self.accessed_at(self.reference_entity(idx), path, ctx)
            }
            NodeKind::Literal {
                value: LiteralValue::Null,
            } => true,
            NodeKind::Literal { .. }
            | NodeKind::TemplateLiteral { .. }
            | NodeKind::ArrayExpression { .. }
            | NodeKind::ClassDeclaration(_)
            | NodeKind::ClassExpression(_)
            | NodeKind::NewExpression { .. }
            | NodeKind::UnaryExpression { .. }
            | NodeKind::BinaryExpression { .. }
            | NodeKind::UpdateExpression { .. } => path.len() > 1,
            NodeKind::ObjectExpression { .. } => {
                let Some((key, rest)) = path.split_first() else {
                    return false;
                };
                match self.object_read(idx, key) {
                    PropertyRead::Value(value) => self.accessed_at(Entity::Node(value), rest, ctx),
                    PropertyRead::Accessor(getter) => {
                        !rest.is_empty()
                            || self.called_at(Entity::Node(getter), &[], &CallOptions::synthetic(), ctx)
                    }
                    PropertyRead::Missing => !rest.is_empty(),
                    PropertyRead::Unknown => !rest.is_empty() || self.has_accessors(idx),
                }
            }
            NodeKind::FunctionDeclaration(_)
            | NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_) => {
                if path.len() <= 1 {
                    return false;
                }
                path[0].as_name() != Some("prototype")
                    || self.prototypes.borrow().contains(&idx)
                    || path.len() > 2
            }
            NodeKind::AssignmentExpression {
                operator: AssignmentOperator::Assign,
                right,
                ..
            } => self.accessed_at(Entity::Node(*right), path, ctx),
            NodeKind::AssignmentExpression { .. } => path.len() > 1,
            NodeKind::MemberExpression { object, .. } => match self.namespace_member(idx) {
                Some(member) => self.accessed_at(member, path, ctx),
                None => {
                    let path = prepend(self.member_key(idx, ctx), path);
                    self.accessed_at(Entity::Node(*object), &path, ctx)
                }
            },
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                let call = CallOptions::new(false, arguments, idx);
                self.some_return_expression(Entity::Node(*callee), &[], &call, ctx, &mut |value, ctx| {
                    self.accessed_at(value, path, ctx)
                })
            }
            _ => self.any_branch(idx, ctx, &mut |branch, ctx| self.accessed_at(branch, path, ctx)),
        }
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// Whether writing the member at `path` of `entity` (the binding itself
    /// for an empty path) may have an effect.
    pub fn assigned_at(&self, entity: Entity, path: &[PathKey], ctx: &AnalysisContext) -> bool {
        if exceeds_depth(path) {
            return true;
        }
        match entity {
            Entity::Unknown | Entity::Undefined | Entity::Primitive(_) => true,
            Entity::UnknownObject => path.len() > 1,
            Entity::Variable(id) => {
                let variable = self.variable(id);
                match variable.kind {
                    VariableKind::Global
                    | VariableKind::External { .. }
                    | VariableKind::Namespace { .. }
                    | VariableKind::Arguments => true,
                    _ => {
                        if variable.is_included() {
                            return true;
                        }
                        if path.is_empty() {
                            return false;
                        }
                        if ctx.has_visited(VisitKind::Assign, entity, path, NodeIndex::NONE) {
                            return true;
                        }
                        let ctx = &ctx.with_visited(VisitKind::Assign, entity, path, NodeIndex::NONE);
                        self.assigned_at(self.variable_value(id, ctx), path, ctx)
                    }
                }
            }
            Entity::Node(idx) => self.node_assigned_at(idx, path, ctx),
        }
    }

    fn node_assigned_at(&self, idx: NodeIndex, path: &[PathKey], ctx: &AnalysisContext) -> bool {
        let Some(kind) = self.kind(idx) else {
            return true;
        };
        match kind {
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => {
                self.assigned_at(self.reference_entity(idx), path, ctx)
            }
            NodeKind::MemberExpression { object, .. } => match self.namespace_member(idx) {
                Some(member) => self.assigned_at(member, path, ctx),
                None => {
                    let path = prepend(self.member_key(idx, ctx), path);
                    self.assigned_at(Entity::Node(*object), &path, ctx)
                }
            },
            NodeKind::ObjectExpression { .. } => {
                let Some((key, rest)) = path.split_first() else {
                    return false;
                };
                if rest.is_empty() {
                    return match self.object_write(idx, key) {
                        PropertyWrite::Setter(setter) => {
                            self.called_at(Entity::Node(setter), &[], &CallOptions::synthetic(), ctx)
                        }
                        PropertyWrite::Value | PropertyWrite::Missing => false,
                        PropertyWrite::Unknown => self.has_accessors(idx),
                    };
                }
                match self.object_read(idx, key) {
                    PropertyRead::Value(value) => self.assigned_at(Entity::Node(value), rest, ctx),
                    _ => true,
                }
            }
            NodeKind::ArrayExpression { .. }
            | NodeKind::ClassDeclaration(_)
            | NodeKind::ClassExpression(_)
            | NodeKind::NewExpression { .. } => path.len() > 1,
            NodeKind::FunctionDeclaration(_)
            | NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_) => {
                if path.len() <= 1 {
                    return false;
                }
                path[0].as_name() != Some("prototype")
                    || self.prototypes.borrow().contains(&idx)
                    || path.len() > 2
            }
            NodeKind::AssignmentExpression {
                operator: AssignmentOperator::Assign,
                right,
                ..
            } => self.assigned_at(Entity::Node(*right), path, ctx),
            NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::AssignmentPattern { .. }
            | NodeKind::RestElement { .. } => self.pattern_assigned(idx, ctx),
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                let call = CallOptions::new(false, arguments, idx);
                self.some_return_expression(Entity::Node(*callee), &[], &call, ctx, &mut |value, ctx| {
                    self.assigned_at(value, path, ctx)
                })
            }
            NodeKind::ConditionalExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::SequenceExpression { .. }
            | NodeKind::ChainExpression { .. } => {
                self.any_branch(idx, ctx, &mut |branch, ctx| self.assigned_at(branch, path, ctx))
            }
            _ => true,
        }
    }

    /// Whether destructuring into `pattern` writes an effectful target.
    fn pattern_assigned(&self, pattern: NodeIndex, ctx: &AnalysisContext) -> bool {
        let targets: Vec<NodeIndex> = match self.kind(pattern) {
            Some(NodeKind::ObjectPattern { properties }) => properties
                .iter()
                .map(|&property| match self.kind(property) {
                    Some(NodeKind::Property { value, .. }) => *value,
                    _ => property,
                })
                .collect(),
            Some(NodeKind::ArrayPattern { elements }) => {
                elements.iter().copied().filter(|e| e.is_some()).collect()
            }
            Some(NodeKind::AssignmentPattern { left, .. }) => vec![*left],
            Some(NodeKind::RestElement { argument }) => vec![*argument],
            _ => return self.assigned_at(Entity::Node(pattern), &[], ctx),
        };
        targets.into_iter().any(|target| match self.kind(target) {
            Some(
                NodeKind::ObjectPattern { .. }
                | NodeKind::ArrayPattern { .. }
                | NodeKind::AssignmentPattern { .. }
                | NodeKind::RestElement { .. },
            ) => self.pattern_assigned(target, ctx),
            _ => self.assigned_at(Entity::Node(target), &[], ctx),
        })
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Whether calling the member at `path` of `entity` (the value itself
    /// for an empty path) may have an effect.
    pub fn called_at(&self, entity: Entity, path: &[PathKey], call: &CallOptions, ctx: &AnalysisContext) -> bool {
        if exceeds_depth(path) {
            return true;
        }
        match entity {
            Entity::Unknown | Entity::Undefined => true,
            Entity::UnknownObject => {
                path.is_empty() || self.member_call_effects(&members::OBJECT_MEMBERS, path, call, ctx)
            }
            Entity::Primitive(primitive) => {
                self.member_call_effects(primitive_table(primitive), path, call, ctx)
            }
            Entity::Variable(id) => {
                let variable = self.variable(id);
                match variable.kind {
                    VariableKind::Global => {
                        variable.is_reassigned() || !globals::is_pure_call(&variable.name, path)
                    }
                    VariableKind::External { .. }
                    | VariableKind::Namespace { .. }
                    | VariableKind::Arguments => true,
                    _ => {
                        if ctx.has_visited(VisitKind::Call, entity, path, call.caller) {
                            return true;
                        }
                        let ctx = &ctx.with_visited(VisitKind::Call, entity, path, call.caller);
                        self.called_at(self.variable_value(id, ctx), path, call, ctx)
                    }
                }
            }
            Entity::Node(idx) => self.node_called_at(idx, path, call, ctx),
        }
    }

    fn node_called_at(&self, idx: NodeIndex, path: &[PathKey], call: &CallOptions, ctx: &AnalysisContext) -> bool {
        let Some(kind) = self.kind(idx) else {
            return true;
        };
        match kind {
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => {
                self.called_at(self.reference_entity(idx), path, call, ctx)
            }
            NodeKind::FunctionDeclaration(data)
            | NodeKind::FunctionExpression(data)
            | NodeKind::ArrowFunctionExpression(data) => {
                if !path.is_empty() {
                    return true;
                }
                let entity = Entity::Node(idx);
                if ctx.has_visited(VisitKind::Call, entity, path, call.caller) {
                    return true;
                }
                let this_variable = self
                    .function_scope(idx)
                    .and_then(|scope| self.graph.scope(scope).function.as_ref())
                    .and_then(|function| function.this_variable);
                let inner = ctx
                    .with_visited(VisitKind::Call, entity, path, call.caller)
                    .for_called_function(this_variable, call);
                data.params.iter().any(|&param| self.has_effects(param, &inner))
                    || self.has_effects(data.body, &inner)
            }
            NodeKind::ClassDeclaration(data) | NodeKind::ClassExpression(data) => {
                if !path.is_empty() || !call.is_new {
                    return true;
                }
                match self.class_constructor(data.body) {
                    Some(constructor) => self.node_called_at(constructor, &[], call, ctx),
                    None if data.super_class.is_some() => {
                        self.called_at(Entity::Node(data.super_class), &[], call, ctx)
                    }
                    None => false,
                }
            }
            NodeKind::ObjectExpression { .. } => {
                let Some((key, rest)) = path.split_first() else {
                    return true;
                };
                match self.object_read(idx, key) {
                    PropertyRead::Value(value) => self.called_at(Entity::Node(value), rest, call, ctx),
                    PropertyRead::Missing if rest.is_empty() => {
                        self.member_call_effects(&members::OBJECT_MEMBERS, path, call, ctx)
                    }
                    _ => true,
                }
            }
            NodeKind::ArrayExpression { .. } => {
                self.member_call_effects(&members::ARRAY_MEMBERS, path, call, ctx)
            }
            NodeKind::Literal { value } => match literal_table(value) {
                Some(table) => self.member_call_effects(table, path, call, ctx),
                None => true,
            },
            NodeKind::TemplateLiteral { .. } => {
                self.member_call_effects(&members::STRING_MEMBERS, path, call, ctx)
            }
            NodeKind::NewExpression { .. } => {
                path.is_empty() || self.member_call_effects(&members::OBJECT_MEMBERS, path, call, ctx)
            }
            NodeKind::MemberExpression { object, .. } => match self.namespace_member(idx) {
                Some(member) => self.called_at(member, path, call, ctx),
                None => {
                    let path = prepend(self.member_key(idx, ctx), path);
                    self.called_at(Entity::Node(*object), &path, call, ctx)
                }
            },
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                let inner = CallOptions::new(false, arguments, idx);
                self.some_return_expression(Entity::Node(*callee), &[], &inner, ctx, &mut |value, ctx| {
                    self.called_at(value, path, call, ctx)
                })
            }
            NodeKind::AssignmentExpression {
                operator: AssignmentOperator::Assign,
                right,
                ..
            } => self.called_at(Entity::Node(*right), path, call, ctx),
            NodeKind::ConditionalExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::SequenceExpression { .. }
            | NodeKind::ChainExpression { .. } => {
                self.any_branch(idx, ctx, &mut |branch, ctx| self.called_at(branch, path, call, ctx))
            }
            _ => true,
        }
    }

    /// The constructor function of a class body, if it declares one.
    fn class_constructor(&self, body: NodeIndex) -> Option<NodeIndex> {
        let Some(NodeKind::ClassBody { body }) = self.kind(body) else {
            return None;
        };
        body.iter().find_map(|&member| match self.kind(member) {
            Some(NodeKind::MethodDefinition {
                kind: MethodKind::Constructor,
                value,
                ..
            }) => Some(*value),
            _ => None,
        })
    }

    /// Effects of calling a built-in member: unknown members and members
    /// that mutate their receiver are effects, and so are callbacks with
    /// effects.
    fn member_call_effects(
        &self,
        table: &MemberTable,
        path: &[PathKey],
        call: &CallOptions,
        ctx: &AnalysisContext,
    ) -> bool {
        let Some(member) = members::lookup(table, path) else {
            return true;
        };
        if member.mutates_self {
            return true;
        }
        let callback = CallOptions::synthetic();
        member.calls_args.iter().any(|&index| {
            call.arguments.get(index).is_some_and(|&argument| {
                self.called_at(Entity::Node(argument), &[], &callback, &ctx.for_nested_call())
            })
        })
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    /// The entity an identifier or `this` denotes.
    pub(crate) fn reference_entity(&self, idx: NodeIndex) -> Entity {
        match self.binding_of(idx) {
            Some(variable) => Entity::Variable(variable),
            None if self.graph.is_top_level_this(idx) => Entity::Undefined,
            None => Entity::Unknown,
        }
    }

    /// Apply `query` to every branch value a forwarding expression may
    /// produce (conditional, logical, sequence, optional chain); any other
    /// node answers `true`.
    pub(crate) fn any_branch(
        &self,
        idx: NodeIndex,
        ctx: &AnalysisContext,
        query: &mut dyn FnMut(Entity, &AnalysisContext) -> bool,
    ) -> bool {
        match self.kind(idx) {
            Some(NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            }) => match self.known_truthiness(*test, ctx) {
                Some(true) => query(Entity::Node(*consequent), ctx),
                Some(false) => query(Entity::Node(*alternate), ctx),
                None => query(Entity::Node(*consequent), ctx) || query(Entity::Node(*alternate), ctx),
            },
            Some(NodeKind::LogicalExpression {
                operator,
                left,
                right,
            }) => match self.logical_short_circuit(*operator, *left, ctx) {
                Some(true) => query(Entity::Node(*left), ctx),
                Some(false) => query(Entity::Node(*right), ctx),
                None => query(Entity::Node(*left), ctx) || query(Entity::Node(*right), ctx),
            },
            Some(NodeKind::SequenceExpression { expressions }) => match expressions.last() {
                Some(&last) => query(Entity::Node(last), ctx),
                None => true,
            },
            Some(NodeKind::ChainExpression { expression }) => query(Entity::Node(*expression), ctx),
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "../tests/paths.rs"]
mod tests;
