//! What calling a value returns.
//!
//! A function with exactly one `return` returns that expression; anything
//! else collapses to unknown, and when there are several returns each of
//! them escapes (callers anywhere may hold on to any of them).

use crate::analyzer::Analyzer;
use crate::context::{AnalysisContext, CallOptions, VisitKind};
use crate::entity::{Entity, PrimitiveType};
use crate::members::{self, MemberTable, ReturnType};
use crate::paths::PropertyRead;
use rustc_hash::FxHashMap;
use shaker_ast::{LiteralValue, NodeIndex, NodeKind};
use shaker_binder::{ScopeId, VariableKind};
use shaker_common::paths::{exceeds_depth, prepend};
use shaker_common::{PathKey, UNKNOWN_PATH};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnSummary {
    Unknown,
    /// The single value every call returns.
    Single(Entity),
}

impl Analyzer<'_> {
    pub(crate) fn summarize_returns(&self) -> FxHashMap<ScopeId, ReturnSummary> {
        let mut summaries = FxHashMap::default();
        let mut escaping = Vec::new();
        for index in 0..self.graph.scopes.len() {
            let id = ScopeId(index as u32);
            let scope = self.graph.scope(id);
            let Some(function) = &scope.function else {
                continue;
            };
            let expression_body = self
                .kind(scope.node)
                .and_then(NodeKind::function_data)
                .filter(|data| data.expression_body)
                .map(|data| data.body);
            let summary = if function.is_async || function.is_generator {
                ReturnSummary::Unknown
            } else if let Some(body) = expression_body {
                ReturnSummary::Single(Entity::Node(body))
            } else {
                match function.return_expressions.as_slice() {
                    [single] => ReturnSummary::Single(Entity::node_or_undefined(*single)),
                    [] => ReturnSummary::Unknown,
                    many => {
                        escaping.extend(many.iter().copied().filter(|e| e.is_some()));
                        ReturnSummary::Unknown
                    }
                }
            };
            summaries.insert(id, summary);
        }
        trace!(escaping = escaping.len(), "return expressions escaping");
        for expression in escaping {
            self.reassign_path(Entity::Node(expression), UNKNOWN_PATH);
        }
        summaries
    }

    /// The summary of a function node.
    pub(crate) fn return_summary(&self, function: NodeIndex) -> ReturnSummary {
        self.function_scope(function)
            .and_then(|scope| self.returns.get(&scope).copied())
            .unwrap_or(ReturnSummary::Unknown)
    }

    /// Whether `predicate` holds for some value calling `entity` at `path`
    /// may return. Revisits answer `true`.
    pub fn some_return_expression(
        &self,
        entity: Entity,
        path: &[PathKey],
        call: &CallOptions,
        ctx: &AnalysisContext,
        predicate: &mut dyn FnMut(Entity, &AnalysisContext) -> bool,
    ) -> bool {
        if exceeds_depth(path) {
            return predicate(Entity::Unknown, ctx);
        }
        if ctx.has_visited(VisitKind::Return, entity, path, call.caller) {
            return true;
        }
        let ctx = &ctx.with_visited(VisitKind::Return, entity, path, call.caller);
        match entity {
            Entity::Variable(id) => {
                let variable = self.variable(id);
                match &variable.kind {
                    VariableKind::Global | VariableKind::External { .. } | VariableKind::Namespace { .. } => {
                        predicate(Entity::Unknown, ctx)
                    }
                    _ => {
                        let value = self.variable_value(id, ctx);
                        self.some_return_expression(value, path, call, ctx, predicate)
                    }
                }
            }
            Entity::Node(idx) => self.node_some_return(idx, path, call, ctx, predicate),
            Entity::Primitive(primitive) => {
                let table: &MemberTable = match primitive {
                    PrimitiveType::String => &members::STRING_MEMBERS,
                    PrimitiveType::Number => &members::NUMBER_MEMBERS,
                    PrimitiveType::Boolean => &members::BOOLEAN_MEMBERS,
                };
                predicate(member_return(table, path), ctx)
            }
            Entity::UnknownObject if !path.is_empty() => {
                predicate(member_return(&members::OBJECT_MEMBERS, path), ctx)
            }
            Entity::Unknown | Entity::UnknownObject | Entity::Undefined => {
                predicate(Entity::Unknown, ctx)
            }
        }
    }

    fn node_some_return(
        &self,
        idx: NodeIndex,
        path: &[PathKey],
        call: &CallOptions,
        ctx: &AnalysisContext,
        predicate: &mut dyn FnMut(Entity, &AnalysisContext) -> bool,
    ) -> bool {
        let Some(kind) = self.kind(idx) else {
            return predicate(Entity::Unknown, ctx);
        };
        match kind {
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => match self.binding_of(idx) {
                Some(variable) => {
                    self.some_return_expression(Entity::Variable(variable), path, call, ctx, predicate)
                }
                None => predicate(Entity::Unknown, ctx),
            },
            NodeKind::FunctionDeclaration(_)
            | NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_) => {
                if !path.is_empty() {
                    return predicate(Entity::Unknown, ctx);
                }
                match self.return_summary(idx) {
                    ReturnSummary::Single(value) => predicate(value, ctx),
                    ReturnSummary::Unknown => predicate(Entity::Unknown, ctx),
                }
            }
            NodeKind::ClassDeclaration(_) | NodeKind::ClassExpression(_) => {
                if path.is_empty() && call.is_new {
                    predicate(Entity::UnknownObject, ctx)
                } else {
                    predicate(Entity::Unknown, ctx)
                }
            }
            NodeKind::ObjectExpression { .. } => match path.split_first() {
                Some((key, rest)) => match self.object_read(idx, key) {
                    PropertyRead::Value(value) => {
                        self.some_return_expression(Entity::Node(value), rest, call, ctx, predicate)
                    }
                    PropertyRead::Missing if rest.is_empty() => {
                        predicate(member_return(&members::OBJECT_MEMBERS, path), ctx)
                    }
                    _ => predicate(Entity::Unknown, ctx),
                },
                None => predicate(Entity::Unknown, ctx),
            },
            NodeKind::ArrayExpression { .. } => {
                predicate(member_return(&members::ARRAY_MEMBERS, path), ctx)
            }
            NodeKind::Literal { value } => {
                let table: &MemberTable = match value {
                    LiteralValue::String(_) => &members::STRING_MEMBERS,
                    LiteralValue::Number(_) => &members::NUMBER_MEMBERS,
                    LiteralValue::Boolean(_) => &members::BOOLEAN_MEMBERS,
                    _ => return predicate(Entity::Unknown, ctx),
                };
                predicate(member_return(table, path), ctx)
            }
            NodeKind::TemplateLiteral { .. } => {
                predicate(member_return(&members::STRING_MEMBERS, path), ctx)
            }
            NodeKind::NewExpression { .. } => {
                predicate(member_return(&members::OBJECT_MEMBERS, path), ctx)
            }
            NodeKind::MemberExpression { object, .. } => {
                if let Some(member) = self.namespace_member(idx) {
                    return self.some_return_expression(member, path, call, ctx, predicate);
                }
                let path = prepend(self.member_key(idx, ctx), path);
                self.some_return_expression(Entity::Node(*object), &path, call, ctx, predicate)
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => match self.known_truthiness(*test, ctx) {
                Some(true) => self.some_return_expression(Entity::Node(*consequent), path, call, ctx, predicate),
                Some(false) => self.some_return_expression(Entity::Node(*alternate), path, call, ctx, predicate),
                None => {
                    self.some_return_expression(Entity::Node(*consequent), path, call, ctx, predicate)
                        || self.some_return_expression(Entity::Node(*alternate), path, call, ctx, predicate)
                }
            },
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => match self.logical_short_circuit(*operator, *left, ctx) {
                Some(true) => self.some_return_expression(Entity::Node(*left), path, call, ctx, predicate),
                Some(false) => self.some_return_expression(Entity::Node(*right), path, call, ctx, predicate),
                None => {
                    self.some_return_expression(Entity::Node(*left), path, call, ctx, predicate)
                        || self.some_return_expression(Entity::Node(*right), path, call, ctx, predicate)
                }
            },
            NodeKind::SequenceExpression { expressions } => match expressions.last() {
                Some(&last) => self.some_return_expression(Entity::Node(last), path, call, ctx, predicate),
                None => predicate(Entity::Unknown, ctx),
            },
            NodeKind::ChainExpression { expression } => {
                self.some_return_expression(Entity::Node(*expression), path, call, ctx, predicate)
            }
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                let inner = CallOptions::new(false, arguments, idx);
                self.some_return_expression(Entity::Node(*callee), &[], &inner, ctx, &mut |value, ctx| {
                    self.some_return_expression(value, path, call, ctx, predicate)
                })
            }
            _ => predicate(Entity::Unknown, ctx),
        }
    }

    /// Every value calling `entity` at `path` may return.
    pub fn return_expressions(&self, entity: Entity, path: &[PathKey], call: &CallOptions) -> Vec<Entity> {
        let mut values = Vec::new();
        self.some_return_expression(entity, path, call, &AnalysisContext::new(), &mut |value, _| {
            values.push(value);
            false
        });
        values
    }
}

/// The value a known built-in member call produces.
fn member_return(table: &MemberTable, path: &[PathKey]) -> Entity {
    match members::lookup(table, path).map(|member| member.returns) {
        Some(ReturnType::String) => Entity::Primitive(PrimitiveType::String),
        Some(ReturnType::Number) => Entity::Primitive(PrimitiveType::Number),
        Some(ReturnType::Boolean) => Entity::Primitive(PrimitiveType::Boolean),
        Some(ReturnType::Unknown) | None => Entity::Unknown,
    }
}

#[cfg(test)]
#[path = "../tests/returns.rs"]
mod tests;
