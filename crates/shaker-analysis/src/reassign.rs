//! Reassignment tracking.
//!
//! `reassign_path(entity, [])` marks a binding as written; a longer path
//! records a write into the value the entity holds, forwarded to whatever
//! expression owns that value. Reassignment only ever adds information, so
//! every answer that depended on the old state can only get more
//! conservative.

use crate::analyzer::{Analyzer, ObjectDeopt};
use crate::context::{AnalysisContext, CallOptions};
use crate::entity::Entity;
use rustc_hash::FxHashSet;
use shaker_ast::{NodeIndex, NodeKind, PropertyKind};
use shaker_binder::{VariableId, VariableKind};
use shaker_common::paths::{display_path, exceeds_depth, prepend};
use shaker_common::{ObjectPath, PathKey, UNKNOWN_PATH};
use tracing::trace;

type Seen = FxHashSet<(Entity, ObjectPath)>;

impl Analyzer<'_> {
    /// Record a write to `entity` at `path`.
    pub fn reassign_path(&self, entity: Entity, path: &[PathKey]) {
        self.reassign(entity, path, &mut Seen::default());
    }

    fn reassign(&self, entity: Entity, path: &[PathKey], seen: &mut Seen) {
        if exceeds_depth(path) || !seen.insert((entity, path.iter().cloned().collect())) {
            return;
        }
        match entity {
            Entity::Variable(id) => self.reassign_variable(id, path, seen),
            Entity::Node(idx) => self.reassign_node(idx, path, seen),
            _ => {}
        }
    }

    fn reassign_variable(&self, id: VariableId, path: &[PathKey], seen: &mut Seen) {
        let variable = self.variable(id);
        if path.is_empty() {
            if variable.mark_reassigned() {
                trace!(name = %variable.name, "reassigned");
                self.mark_changed();
            }
            return;
        }
        match variable.kind {
            VariableKind::ExportDefault { .. } => {
                let original = self.graph.original_variable(id);
                if original != id {
                    self.reassign(Entity::Variable(original), path, seen);
                } else if variable.init.is_some() {
                    self.reassign(Entity::Node(variable.init), path, seen);
                }
            }
            VariableKind::Local if variable.init.is_some() => {
                self.reassign(Entity::Node(variable.init), path, seen);
            }
            _ => {}
        }
    }

    fn reassign_node(&self, idx: NodeIndex, path: &[PathKey], seen: &mut Seen) {
        let Some(kind) = self.kind(idx) else {
            return;
        };
        match kind {
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => {
                if let Some(variable) = self.binding_of(idx) {
                    self.reassign(Entity::Variable(variable), path, seen);
                }
            }
            NodeKind::MemberExpression { object, .. } => match self.namespace_member(idx) {
                Some(member) => self.reassign(member, path, seen),
                None => {
                    let key = self.member_key(idx, &AnalysisContext::new());
                    self.reassign(Entity::Node(*object), &prepend(key, path), seen);
                }
            },
            NodeKind::ObjectExpression { properties } => {
                let Some((key, rest)) = path.split_first() else {
                    return;
                };
                if rest.is_empty() {
                    self.deopt_object(idx, key);
                    return;
                }
                for &property in properties {
                    match self.kind(property) {
                        Some(NodeKind::Property {
                            key: property_key,
                            value,
                            kind: PropertyKind::Init,
                            computed,
                            ..
                        }) => {
                            let matches = match (key, self.property_key(*property_key, *computed)) {
                                (PathKey::Name(name), Some(candidate)) => *name == candidate,
                                _ => true,
                            };
                            if matches {
                                self.reassign(Entity::Node(*value), rest, seen);
                            }
                        }
                        Some(NodeKind::SpreadElement { argument }) => {
                            self.reassign(Entity::Node(*argument), UNKNOWN_PATH, seen);
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ArrayExpression { elements } => {
                if path.len() > 1 {
                    for &element in elements.iter().filter(|e| e.is_some()) {
                        let value = match self.kind(element) {
                            Some(NodeKind::SpreadElement { argument }) => *argument,
                            _ => element,
                        };
                        self.reassign(Entity::Node(value), UNKNOWN_PATH, seen);
                    }
                }
            }
            NodeKind::FunctionDeclaration(_) | NodeKind::FunctionExpression(_) => {
                if matches!(path, [key] if key.as_name() == Some("prototype") || key.is_unknown())
                    && self.prototypes.borrow_mut().insert(idx)
                {
                    self.mark_changed();
                }
            }
            NodeKind::ConditionalExpression {
                consequent, alternate, ..
            } => {
                self.reassign(Entity::Node(*consequent), path, seen);
                self.reassign(Entity::Node(*alternate), path, seen);
            }
            NodeKind::LogicalExpression { left, right, .. } => {
                self.reassign(Entity::Node(*left), path, seen);
                self.reassign(Entity::Node(*right), path, seen);
            }
            NodeKind::SequenceExpression { expressions } => {
                if let Some(&last) = expressions.last() {
                    self.reassign(Entity::Node(last), path, seen);
                }
            }
            NodeKind::ChainExpression { expression } => self.reassign(Entity::Node(*expression), path, seen),
            NodeKind::AssignmentExpression { right, .. } => self.reassign(Entity::Node(*right), path, seen),
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                let call = CallOptions::new(false, arguments, idx);
                let mut returned = Vec::new();
                self.some_return_expression(
                    Entity::Node(*callee),
                    &[],
                    &call,
                    &AnalysisContext::new(),
                    &mut |value, _| {
                        returned.push(value);
                        false
                    },
                );
                for value in returned {
                    self.reassign(value, path, seen);
                }
            }
            _ => {}
        }
    }

    fn deopt_object(&self, object: NodeIndex, key: &PathKey) {
        let mut objects = self.objects.borrow_mut();
        let deopt: &mut ObjectDeopt = objects.entry(object).or_default();
        let changed = match key {
            PathKey::Name(name) => !deopt.all && deopt.keys.insert(name.clone()),
            PathKey::Unknown => !std::mem::replace(&mut deopt.all, true),
        };
        if changed {
            trace!(object = object.0, key = %display_path(std::slice::from_ref(key)), "object member reassigned");
            self.mark_changed();
        }
    }
}

#[cfg(test)]
#[path = "../tests/reassign.rs"]
mod tests;
