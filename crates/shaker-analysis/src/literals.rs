//! Constant folding over expressions and bindings.

use crate::analyzer::Analyzer;
use crate::context::{AnalysisContext, CallOptions, VisitKind};
use crate::entity::Entity;
use crate::paths::PropertyRead;
use crate::values::{JsValue, fold_binary, fold_unary};
use shaker_ast::{LiteralValue, LogicalOperator, NodeIndex, NodeKind, UnaryOperator};
use shaker_binder::VariableKind;
use shaker_common::PathKey;
use shaker_common::paths::{exceeds_depth, prepend};

impl Analyzer<'_> {
    /// The constant `entity` holds at `path`, or `None` when unknown.
    ///
    /// Reassigned bindings, paths deeper than the depth cap and revisited
    /// queries are all unknown.
    pub fn literal_at(&self, entity: Entity, path: &[PathKey], ctx: &AnalysisContext) -> Option<JsValue> {
        if exceeds_depth(path) {
            return None;
        }
        match entity {
            Entity::Undefined if path.is_empty() => Some(JsValue::Undefined),
            Entity::Variable(id) => {
                let variable = self.variable(id);
                if variable.is_reassigned() && ctx.replaced_init(id).is_none() {
                    return None;
                }
                match variable.kind {
                    VariableKind::Global => global_literal(&variable.name, path),
                    VariableKind::Local | VariableKind::ExportDefault { .. } => {
                        if ctx.has_visited(VisitKind::Literal, entity, path, NodeIndex::NONE) {
                            return None;
                        }
                        let ctx = &ctx.with_visited(VisitKind::Literal, entity, path, NodeIndex::NONE);
                        self.literal_at(self.variable_value(id, ctx), path, ctx)
                    }
                    _ => None,
                }
            }
            Entity::Node(idx) => self.node_literal_at(idx, path, ctx),
            _ => None,
        }
    }

    fn node_literal_at(&self, idx: NodeIndex, path: &[PathKey], ctx: &AnalysisContext) -> Option<JsValue> {
        let kind = self.kind(idx)?;
        if !path.is_empty() {
            return self.path_literal_at(idx, kind, path, ctx);
        }
        match kind {
            NodeKind::Literal { value } => JsValue::from_literal(value),
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => {
                self.literal_at(self.reference_entity(idx), path, ctx)
            }
            NodeKind::UnaryExpression {
                operator: UnaryOperator::Void,
                ..
            } => Some(JsValue::Undefined),
            NodeKind::UnaryExpression { operator, argument } => {
                let value = self.literal_at(Entity::Node(*argument), &[], ctx)?;
                fold_unary(*operator, &value)
            }
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let left = self.literal_at(Entity::Node(*left), &[], ctx)?;
                let right = self.literal_at(Entity::Node(*right), &[], ctx)?;
                fold_binary(*operator, &left, &right)
            }
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let value = self.literal_at(Entity::Node(*left), &[], ctx)?;
                let left_wins = match operator {
                    LogicalOperator::Or => value.is_truthy(),
                    LogicalOperator::And => !value.is_truthy(),
                    LogicalOperator::Nullish => !value.is_nullish(),
                };
                if left_wins {
                    Some(value)
                } else {
                    self.literal_at(Entity::Node(*right), &[], ctx)
                }
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                let branch = if self.known_truthiness(*test, ctx)? {
                    *consequent
                } else {
                    *alternate
                };
                self.literal_at(Entity::Node(branch), &[], ctx)
            }
            NodeKind::SequenceExpression { expressions } => {
                self.literal_at(Entity::Node(*expressions.last()?), &[], ctx)
            }
            NodeKind::ChainExpression { expression } => self.literal_at(Entity::Node(*expression), &[], ctx),
            NodeKind::TemplateLiteral { quasis, expressions } => {
                let mut text = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    match self.kind(*quasi)? {
                        NodeKind::TemplateElement { cooked, .. } => text.push_str(cooked.as_deref()?),
                        _ => return None,
                    }
                    if let Some(&expression) = expressions.get(i) {
                        let value = self.literal_at(Entity::Node(expression), &[], ctx)?;
                        text.push_str(&value.to_js_string());
                    }
                }
                Some(JsValue::string(&text))
            }
            NodeKind::MemberExpression { .. } | NodeKind::CallExpression { .. } => {
                self.path_literal_at(idx, kind, path, ctx)
            }
            _ => None,
        }
    }

    /// Fold the value reached through `path`, and reads whose value comes
    /// from elsewhere (member expressions and calls).
    fn path_literal_at(
        &self,
        idx: NodeIndex,
        kind: &NodeKind,
        path: &[PathKey],
        ctx: &AnalysisContext,
    ) -> Option<JsValue> {
        match kind {
            NodeKind::MemberExpression { object, .. } => match self.namespace_member(idx) {
                Some(member) => self.literal_at(member, path, ctx),
                None => {
                    let path = prepend(self.member_key(idx, ctx), path);
                    self.literal_at(Entity::Node(*object), &path, ctx)
                }
            },
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                let call = CallOptions::new(false, arguments, idx);
                let mut single = None;
                let mut count = 0usize;
                let revisited = self.some_return_expression(Entity::Node(*callee), &[], &call, ctx, &mut |value, _| {
                    count += 1;
                    single = Some(value);
                    false
                });
                match (revisited, count, single) {
                    (false, 1, Some(value)) => self.literal_at(value, path, ctx),
                    _ => None,
                }
            }
            NodeKind::ObjectExpression { .. } => {
                let (key, rest) = path.split_first()?;
                match self.object_read(idx, key) {
                    PropertyRead::Value(value) => self.literal_at(Entity::Node(value), rest, ctx),
                    _ => None,
                }
            }
            NodeKind::Identifier { .. } | NodeKind::ThisExpression => {
                self.literal_at(self.reference_entity(idx), path, ctx)
            }
            NodeKind::Literal {
                value: LiteralValue::String(text),
            } if matches!(path, [key] if key.as_name() == Some("length")) => {
                Some(JsValue::Number(text.encode_utf16().count() as f64))
            }
            NodeKind::SequenceExpression { .. }
            | NodeKind::ConditionalExpression { .. }
            | NodeKind::ChainExpression { .. } => {
                let mut single = None;
                let mut count = 0usize;
                self.any_branch(idx, ctx, &mut |branch, _| {
                    count += 1;
                    single = Some(branch);
                    false
                });
                match (count, single) {
                    (1, Some(branch)) => self.literal_at(branch, path, ctx),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Globals with a fixed primitive value.
fn global_literal(name: &str, path: &[PathKey]) -> Option<JsValue> {
    if !path.is_empty() {
        return None;
    }
    match name {
        "undefined" => Some(JsValue::Undefined),
        "NaN" => Some(JsValue::Number(f64::NAN)),
        "Infinity" => Some(JsValue::Number(f64::INFINITY)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/literals.rs"]
mod tests;
